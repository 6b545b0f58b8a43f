//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a real-world account, e.g. `iban:NL08INGB0000000555`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    /// Identifier scheme, e.g. `iban`
    pub protocol: String,
    /// Identifier within the scheme, e.g. an IBAN
    pub id: String,
}

impl AccountId {
    /// Create a new account identifier
    pub fn new(protocol: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            id: id.into(),
        }
    }

    /// Shorthand for an IBAN-addressed account
    pub fn iban(iban: impl Into<String>) -> Self {
        Self::new("iban", iban)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.protocol, self.id)
    }
}

impl FromStr for AccountId {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((protocol, id)) if !protocol.trim().is_empty() && !id.trim().is_empty() => {
                Ok(Self::new(protocol.trim(), id.trim()))
            }
            _ => Err(ReconcileError::InvalidAccountId(s.to_string())),
        }
    }
}

/// A signed amount tagged with its currency or unit
///
/// Units are opaque and only ever compared for equality; nothing in this
/// crate converts between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount in the direction of what the account holder is owed
    pub amount: BigDecimal,
    /// Unit tag, e.g. `EUR`
    pub unit: String,
}

impl Balance {
    /// Create a new balance
    pub fn new(amount: BigDecimal, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }

    /// Fail unless `other` carries the same unit
    pub fn ensure_same_unit(&self, other: &Balance) -> ReconcileResult<()> {
        if self.unit != other.unit {
            return Err(ReconcileError::UnitMismatch {
                expected: self.unit.clone(),
                found: other.unit.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Provenance of a contiguous slice of a mutation sequence
///
/// `first_affected` and `last_affected` are inclusive indices into the
/// mutation sequence of the view that owns this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDetails {
    /// Identifier of the source file
    pub file_id: String,
    /// Name of the parser that read the file
    pub parser_name: String,
    /// Version of that parser
    pub parser_version: String,
    /// Index of the first mutation produced by this import
    pub first_affected: usize,
    /// Index of the last mutation produced by this import
    pub last_affected: usize,
}

impl ImportDetails {
    /// Create a new provenance record
    pub fn new(
        file_id: impl Into<String>,
        parser_name: impl Into<String>,
        parser_version: impl Into<String>,
        first_affected: usize,
        last_affected: usize,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            parser_name: parser_name.into(),
            parser_version: parser_version.into(),
            first_affected,
            last_affected,
        }
    }

    /// Same provenance, with both indices moved forward by `offset`
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            first_affected: self.first_affected + offset,
            last_affected: self.last_affected + offset,
            ..self.clone()
        }
    }

    /// Number of mutations covered
    pub fn affected_count(&self) -> usize {
        (self.last_affected + 1).saturating_sub(self.first_affected)
    }

    /// Clip this record to the half-open index range `[start, end)`,
    /// re-based so that `start` becomes index 0
    ///
    /// Returns `None` when the record covers nothing inside the range.
    pub fn clipped(&self, start: usize, end: usize) -> Option<Self> {
        let first = self.first_affected.max(start);
        let last = self.last_affected.min(end.checked_sub(1)?);
        if first > last {
            return None;
        }
        Some(Self {
            first_affected: first - start,
            last_affected: last - start,
            ..self.clone()
        })
    }
}

/// Assertion that an account's mutation list is complete over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhaustiveChunk {
    /// The account this chunk describes
    pub account: AccountId,
    /// First day covered (inclusive)
    pub start_date: NaiveDate,
    /// First day no longer covered (exclusive)
    pub end_date: NaiveDate,
    /// Balance at the very start of `start_date`, if known
    pub start_balance: Option<Balance>,
}

impl ExhaustiveChunk {
    /// Create a new chunk descriptor
    pub fn new(
        account: AccountId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_balance: Option<Balance>,
    ) -> Self {
        Self {
            account,
            start_date,
            end_date,
            start_balance,
        }
    }

    /// Whether `date` lies within `[start_date, end_date)`
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }
}

/// Errors that can occur while reconciling ledger views
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Conflict: {field} doesn't match")]
    Conflict { field: String },

    #[error("Unit mismatch: expected {expected}, found {found}")]
    UnitMismatch { expected: String, found: String },

    #[error("Balance continuity broken at {date}: computed {computed}, expected {expected}")]
    BalanceContinuity {
        computed: BigDecimal,
        expected: BigDecimal,
        date: NaiveDate,
    },

    #[error("Ranges not adjacent: {0}")]
    Adjacency(String),

    #[error("Mutations missing in window starting {window_start}: expected {expected}, supplied {supplied}")]
    RangeUnderflow {
        window_start: NaiveDate,
        expected: usize,
        supplied: usize,
    },

    #[error("Surplus mutations in window starting {window_start}: expected {expected}, supplied {supplied}")]
    RangeOverflow {
        window_start: NaiveDate,
        expected: usize,
        supplied: usize,
    },

    #[error("Disjoint ranges: [{other_start}, {other_end}) does not touch [{start}, {end})")]
    DisjointRange {
        start: NaiveDate,
        end: NaiveDate,
        other_start: NaiveDate,
        other_end: NaiveDate,
    },

    #[error("No start balance known for {0}")]
    MissingStartBalance(AccountId),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_parse_and_display() {
        let account: AccountId = "iban:NL08INGB0000000555".parse().unwrap();
        assert_eq!(account, AccountId::iban("NL08INGB0000000555"));
        assert_eq!(account.to_string(), "iban:NL08INGB0000000555");

        assert!("NL08INGB0000000555".parse::<AccountId>().is_err());
        assert!(":NL08".parse::<AccountId>().is_err());
        assert!("iban:".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_balance_unit_check() {
        let eur = Balance::new(BigDecimal::from(10), "EUR");
        let usd = Balance::new(BigDecimal::from(10), "USD");
        assert!(eur.ensure_same_unit(&eur.clone()).is_ok());
        assert_eq!(
            eur.ensure_same_unit(&usd),
            Err(ReconcileError::UnitMismatch {
                expected: "EUR".to_string(),
                found: "USD".to_string(),
            })
        );
    }

    #[test]
    fn test_import_details_shift_and_clip() {
        let details = ImportDetails::new("file-a", "asn-csv", "1.0", 2, 5);
        assert_eq!(details.affected_count(), 4);

        let shifted = details.shifted(3);
        assert_eq!((shifted.first_affected, shifted.last_affected), (5, 8));
        assert_eq!(shifted.file_id, "file-a");

        let head = details.clipped(0, 4).unwrap();
        assert_eq!((head.first_affected, head.last_affected), (2, 3));

        let tail = details.clipped(4, 10).unwrap();
        assert_eq!((tail.first_affected, tail.last_affected), (0, 1));

        assert!(details.clipped(6, 10).is_none());
        assert!(details.clipped(0, 2).is_none());
        assert!(details.clipped(0, 0).is_none());
    }

    #[test]
    fn test_chunk_contains_is_half_open() {
        let chunk = ExhaustiveChunk::new(
            AccountId::iban("NL01"),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            None,
        );
        assert!(chunk.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(chunk.contains(NaiveDate::from_ymd_opt(2024, 1, 30).unwrap()));
        assert!(!chunk.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
    }
}
