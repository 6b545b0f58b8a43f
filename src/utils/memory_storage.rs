//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ledger::LedgerView;
use crate::traits::*;
use crate::types::*;

fn poisoned<T>(_: T) -> ReconcileError {
    ReconcileError::Storage("view store lock poisoned".to_string())
}

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    views: Arc<RwLock<HashMap<AccountId, LedgerView>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ReconcileResult<()> {
        self.views.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerViewStorage for MemoryStorage {
    async fn save_view(&mut self, view: &LedgerView) -> ReconcileResult<()> {
        self.views
            .write()
            .map_err(poisoned)?
            .insert(view.account().clone(), view.clone());
        Ok(())
    }

    async fn get_view(&self, account: &AccountId) -> ReconcileResult<Option<LedgerView>> {
        Ok(self.views.read().map_err(poisoned)?.get(account).cloned())
    }

    async fn list_accounts(&self) -> ReconcileResult<Vec<AccountId>> {
        let mut accounts: Vec<AccountId> =
            self.views.read().map_err(poisoned)?.keys().cloned().collect();
        accounts.sort();
        Ok(accounts)
    }

    async fn delete_view(&mut self, account: &AccountId) -> ReconcileResult<()> {
        if self.views.write().map_err(poisoned)?.remove(account).is_some() {
            Ok(())
        } else {
            Err(ReconcileError::Storage(format!("No view stored for {}", account)))
        }
    }
}
