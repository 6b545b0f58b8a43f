//! Dated balance changes and their merge rules

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// One dated change to an account balance
///
/// `from`, `to`, `date`, `amount` and `unit` identify the economic event.
/// `data` carries whatever descriptive fields the parser that saw the event
/// could extract, and grows as more sources observe the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerMutation {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub unit: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl LedgerMutation {
    /// Create a new mutation with no descriptive data
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        date: NaiveDate,
        amount: BigDecimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            date,
            amount,
            unit: unit.into(),
            data: HashMap::new(),
        }
    }

    /// Attach a descriptive field
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Check that `other` describes the same event and that its data can be
    /// merged into this record without overwriting anything
    pub fn check_merge(&self, other: &LedgerMutation) -> ReconcileResult<()> {
        let identity = [
            ("from", self.from == other.from),
            ("to", self.to == other.to),
            ("date", self.date == other.date),
            ("amount", self.amount == other.amount),
            ("unit", self.unit == other.unit),
        ];
        if let Some((field, _)) = identity.iter().find(|(_, equal)| !equal) {
            return Err(ReconcileError::Conflict {
                field: field.to_string(),
            });
        }

        for (key, value) in &other.data {
            match self.data.get(key) {
                Some(existing) if existing != value => {
                    return Err(ReconcileError::Conflict {
                        field: format!("data.{}", key),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Merge another observation of the same event into this one
    ///
    /// Only `data` is touched. On error nothing has been modified.
    pub fn merge(&mut self, other: &LedgerMutation) -> ReconcileResult<()> {
        self.check_merge(other)?;
        for (key, value) in &other.data {
            self.data.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
