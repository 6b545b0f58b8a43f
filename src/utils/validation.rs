//! Validation utilities

use crate::ledger::{LedgerMutation, LedgerView};
use crate::traits::*;
use crate::types::*;

/// Validate the text form of an account identifier
pub fn validate_account_id(account_id: &str) -> ReconcileResult<AccountId> {
    let account: AccountId = account_id.parse()?;

    if account.id.len() > 64 {
        return Err(ReconcileError::Validation(
            "Account identifier cannot exceed 64 characters".to_string(),
        ));
    }

    if !account
        .protocol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ReconcileError::Validation(format!(
            "Account protocol '{}' can only contain alphanumeric characters, dashes, and underscores",
            account.protocol
        )));
    }

    Ok(account)
}

/// Validate that mutations are sorted ascending by date
pub fn validate_mutation_order(mutations: &[LedgerMutation]) -> ReconcileResult<()> {
    if let Some(pos) = mutations.windows(2).position(|w| w[0].date > w[1].date) {
        return Err(ReconcileError::Validation(format!(
            "Mutation {} ({}) is dated after mutation {} ({})",
            pos,
            mutations[pos].date,
            pos + 1,
            mutations[pos + 1].date
        )));
    }
    Ok(())
}

/// Validate that every provenance record points inside a sequence of `len`
pub fn validate_provenance(imported_from: &[ImportDetails], len: usize) -> ReconcileResult<()> {
    for details in imported_from {
        if details.first_affected > details.last_affected || details.last_affected >= len {
            return Err(ReconcileError::Validation(format!(
                "Import of '{}' covers [{}, {}] but the view holds {} mutations",
                details.file_id, details.first_affected, details.last_affected, len
            )));
        }
    }
    Ok(())
}

/// Strict validator for parser output
pub struct StrictViewValidator;

impl ViewValidator for StrictViewValidator {
    fn validate_view(&self, view: &LedgerView) -> ReconcileResult<()> {
        // Basic validation
        DefaultViewValidator.validate_view(view)?;

        validate_mutation_order(view.mutations())?;

        for mutation in view.mutations() {
            if !view.chunk().contains(mutation.date) {
                return Err(ReconcileError::Validation(format!(
                    "Mutation dated {} lies outside [{}, {})",
                    mutation.date,
                    view.start_date(),
                    view.end_date()
                )));
            }
            if let Some(balance) = view.start_balance() {
                if mutation.unit != balance.unit {
                    return Err(ReconcileError::UnitMismatch {
                        expected: balance.unit.clone(),
                        found: mutation.unit.clone(),
                    });
                }
            }
        }

        validate_provenance(view.imported_from(), view.mutations().len())
    }
}
