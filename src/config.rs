//! Configuration for the reconciliation engine

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{ReconcileError, ReconcileResult};

/// Namespace for half-trade predicates
pub const DEFAULT_HALFTRADE_NS: &str = "https://ledgerloops.com/vocab/halftrade#";

/// Namespace for currency and unit tags
pub const DEFAULT_MONEY_NS: &str = "https://example.com/#";

/// Fields of the half-trade read form, in output order
pub const HALF_TRADE_FIELDS: [&str; 8] = [
    "date",
    "from",
    "to",
    "amount",
    "unit",
    "impliedBy",
    "description",
    "fullInfo",
];

/// Identifier prefixes used when exporting merged mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Prefix for half-trade predicates
    pub halftrade_ns: String,
    /// Prefix for unit tags
    pub money_ns: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            halftrade_ns: DEFAULT_HALFTRADE_NS.to_string(),
            money_ns: DEFAULT_MONEY_NS.to_string(),
        }
    }
}

impl Vocabulary {
    /// Full identifier of a half-trade predicate
    pub fn halftrade(&self, label: &str) -> String {
        format!("{}{}", self.halftrade_ns, label)
    }

    /// Full identifier of a unit tag
    pub fn money(&self, tag: &str) -> String {
        format!("{}{}", self.money_ns, tag)
    }
}

/// Validation applied to views before they reach an accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Check ordering, units and provenance bounds of every import
    pub strict: bool,
}

/// Reconciliation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vocabulary: Vocabulary,
    pub validation: ValidationConfig,
}

impl Config {
    /// Parse from a TOML document
    pub fn from_toml_str(content: &str) -> ReconcileResult<Self> {
        toml::from_str(content)
            .map_err(|e| ReconcileError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReconcileError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> ReconcileResult<Self> {
        let mut config = Config::default();

        if let Ok(ns) = std::env::var("LEDGER_RECONCILE_HALFTRADE_NS") {
            config.vocabulary.halftrade_ns = ns;
        }

        if let Ok(ns) = std::env::var("LEDGER_RECONCILE_MONEY_NS") {
            config.vocabulary.money_ns = ns;
        }

        if let Ok(strict) = std::env::var("LEDGER_RECONCILE_STRICT") {
            config.validation.strict = parse_flag(&strict).ok_or_else(|| {
                ReconcileError::Config(format!(
                    "LEDGER_RECONCILE_STRICT: not a boolean: {}",
                    strict
                ))
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.validation.strict);
        assert_eq!(
            config.vocabulary.halftrade("amount"),
            "https://ledgerloops.com/vocab/halftrade#amount"
        );
        assert_eq!(config.vocabulary.money("EUR"), "https://example.com/#EUR");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [validation]
            strict = true

            [vocabulary]
            money_ns = "https://money.example/units#"
            "#,
        )
        .unwrap();

        assert!(config.validation.strict);
        assert_eq!(config.vocabulary.money("EUR"), "https://money.example/units#EUR");
        assert_eq!(config.vocabulary.halftrade_ns, DEFAULT_HALFTRADE_NS);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("validation = 3"),
            Err(ReconcileError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/ledger-reconcile.toml"),
            Err(ReconcileError::Config(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
