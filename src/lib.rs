//! # Ledger Reconcile
//!
//! A reconciliation engine that stitches overlapping, partial exports of an
//! account's transaction history (e.g. repeated bank statement downloads)
//! into one consistent timeline.
//!
//! ## Features
//!
//! - **Exhaustive chunks**: each import asserts completeness over a half-open date range
//! - **Merging**: overlapping imports are split, prepended, appended or mixed in
//! - **Balance continuity**: adjoining segments must agree on the balance at their seam
//! - **Conflict detection**: two observations of one event may enrich, never overwrite
//! - **Provenance**: every slice of the timeline records the file and parser it came from
//! - **Storage abstraction**: per-account accumulators behind an async storage trait
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_reconcile::{AccountId, Balance, ExhaustiveChunk, LedgerMutation, LedgerView};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
//! let chunk = ExhaustiveChunk::new(
//!     AccountId::iban("NL01ASNB0123456789"),
//!     day(1, 1),
//!     day(1, 31),
//!     Some(Balance::new(BigDecimal::from(100), "EUR")),
//! );
//! let groceries = LedgerMutation::new(
//!     "iban:NL01ASNB0123456789",
//!     "iban:NL02BANK0123456789",
//!     day(1, 5),
//!     BigDecimal::from(-20),
//!     "EUR",
//! );
//! let view = LedgerView::from_chunk(chunk, vec![groceries], vec![]);
//! assert_eq!(view.end_balance().unwrap(), BigDecimal::from(80));
//! ```

pub mod config;
pub mod halftrade;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Vocabulary};
pub use halftrade::HalfTrade;
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
