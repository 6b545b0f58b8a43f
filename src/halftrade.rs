//! Flat read form of merged mutations for linked-data persistence

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Vocabulary, HALF_TRADE_FIELDS};
use crate::ledger::LedgerMutation;

/// One side of a trade as seen from a single account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfTrade {
    /// Freshly minted subject identifier
    pub subject: String,
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    pub amount: BigDecimal,
    /// Unit as a full identifier in the money namespace
    pub unit: String,
    pub implied_by: Option<String>,
    pub description: Option<String>,
    pub full_info: Option<String>,
}

impl HalfTrade {
    /// Build the read form of a mutation
    ///
    /// `impliedBy`, `description` and `fullInfo` are taken from the
    /// mutation's data map when a parser supplied them.
    pub fn from_mutation(mutation: &LedgerMutation, vocabulary: &Vocabulary) -> Self {
        Self {
            subject: format!("urn:uuid:{}", Uuid::new_v4()),
            date: mutation.date,
            from: mutation.from.clone(),
            to: mutation.to.clone(),
            amount: mutation.amount.clone(),
            unit: vocabulary.money(&mutation.unit),
            implied_by: mutation.data.get("impliedBy").cloned(),
            description: mutation.data.get("description").cloned(),
            full_info: mutation.data.get("fullInfo").cloned(),
        }
    }

    /// `(predicate, value)` pairs in `HALF_TRADE_FIELDS` order; absent
    /// optional fields are skipped
    pub fn fields(&self, vocabulary: &Vocabulary) -> Vec<(String, String)> {
        HALF_TRADE_FIELDS
            .iter()
            .filter_map(|field| {
                let value = match *field {
                    "date" => Some(self.date.to_string()),
                    "from" => Some(self.from.clone()),
                    "to" => Some(self.to.clone()),
                    "amount" => Some(self.amount.to_string()),
                    "unit" => Some(self.unit.clone()),
                    "impliedBy" => self.implied_by.clone(),
                    "description" => self.description.clone(),
                    "fullInfo" => self.full_info.clone(),
                    _ => None,
                }?;
                Some((vocabulary.halftrade(field), value))
            })
            .collect()
    }
}
