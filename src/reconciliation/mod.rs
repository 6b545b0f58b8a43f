//! Reconciliation of imported statements into per-account accumulators

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::ledger::LedgerView;
use crate::traits::*;
use crate::types::*;
use crate::utils::StrictViewValidator;

/// Outcome of folding one import into its account's accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub account: AccountId,
    /// True when the import became the account's first accumulator
    pub created: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mutation_count: usize,
    pub end_balance: Option<BigDecimal>,
}

/// Keeps one reconciled view per account and folds new imports into it
pub struct Reconciler<S: LedgerViewStorage> {
    storage: S,
    validator: Box<dyn ViewValidator>,
}

impl<S: LedgerViewStorage> Reconciler<S> {
    /// Create a new reconciler with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultViewValidator),
        }
    }

    /// Create a new reconciler with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn ViewValidator>) -> Self {
        Self { storage, validator }
    }

    /// Create a new reconciler whose validation follows `config`
    pub fn with_config(storage: S, config: &Config) -> Self {
        if config.validation.strict {
            Self::with_validator(storage, Box::new(StrictViewValidator))
        } else {
            Self::new(storage)
        }
    }

    /// Fold a parsed import into the accumulator for its account
    ///
    /// The stored accumulator only changes when the whole merge succeeds.
    pub async fn import(&mut self, view: LedgerView) -> ReconcileResult<ImportReport> {
        self.validator.validate_view(&view)?;

        let account = view.account().clone();
        let (accumulator, created) = match self.storage.get_view(&account).await? {
            Some(mut accumulator) => {
                if let Err(e) = accumulator.add_data(view) {
                    warn!(%account, error = %e, "rejected import");
                    return Err(e);
                }
                (accumulator, false)
            }
            None => (view, true),
        };

        self.storage.save_view(&accumulator).await?;

        let report = ImportReport {
            account,
            created,
            start_date: accumulator.start_date(),
            end_date: accumulator.end_date(),
            mutation_count: accumulator.mutations().len(),
            end_balance: accumulator.end_balance().ok(),
        };
        info!(
            account = %report.account,
            created = report.created,
            mutations = report.mutation_count,
            "import reconciled"
        );
        Ok(report)
    }

    /// Get the accumulated view for an account
    pub async fn view(&self, account: &AccountId) -> ReconcileResult<Option<LedgerView>> {
        self.storage.get_view(account).await
    }

    /// Get the accumulated view for an account, returning an error if absent
    pub async fn view_required(&self, account: &AccountId) -> ReconcileResult<LedgerView> {
        self.storage
            .get_view(account)
            .await?
            .ok_or_else(|| ReconcileError::Storage(format!("No view stored for {}", account)))
    }

    /// List all accounts with an accumulated view
    pub async fn accounts(&self) -> ReconcileResult<Vec<AccountId>> {
        self.storage.list_accounts().await
    }

    /// Balance at the end of the accumulated range for an account
    pub async fn end_balance(&self, account: &AccountId) -> ReconcileResult<BigDecimal> {
        self.view_required(account).await?.end_balance()
    }

    /// Drop the accumulated view for an account
    pub async fn forget(&mut self, account: &AccountId) -> ReconcileResult<()> {
        self.storage.delete_view(account).await
    }
}
