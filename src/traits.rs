//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::ledger::LedgerView;
use crate::types::*;

/// Storage abstraction for reconciled ledger views
///
/// One view is kept per account. Implementations decide how views are
/// persisted (a triple store, a database, or memory); the merge logic
/// never touches storage directly.
#[async_trait]
pub trait LedgerViewStorage: Send + Sync {
    /// Save the accumulated view for its account, replacing any previous one
    async fn save_view(&mut self, view: &LedgerView) -> ReconcileResult<()>;

    /// Get the accumulated view for an account
    async fn get_view(&self, account: &AccountId) -> ReconcileResult<Option<LedgerView>>;

    /// List all accounts that have a view
    async fn list_accounts(&self) -> ReconcileResult<Vec<AccountId>>;

    /// Delete the view for an account
    async fn delete_view(&mut self, account: &AccountId) -> ReconcileResult<()>;
}

/// Trait for implementing custom checks on imported views
pub trait ViewValidator: Send + Sync {
    /// Validate a view before it is folded into an accumulator
    fn validate_view(&self, view: &LedgerView) -> ReconcileResult<()>;
}

/// Default validator: only the date range itself is checked
pub struct DefaultViewValidator;

impl ViewValidator for DefaultViewValidator {
    fn validate_view(&self, view: &LedgerView) -> ReconcileResult<()> {
        if view.start_date() >= view.end_date() {
            return Err(ReconcileError::Validation(format!(
                "Chunk for {} is empty: [{}, {})",
                view.account(),
                view.start_date(),
                view.end_date()
            )));
        }
        Ok(())
    }
}
