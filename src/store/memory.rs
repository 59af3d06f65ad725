//! In-memory account store for tests and service-level experiments.

use super::{AccountStore, SaveOutcome, StoreError};
use crate::domain::{Account, AccountId, CurrencyId};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Account store backed by a process-local map. Versioning behaves exactly
/// like the SQLite store, so conflict handling is testable without a
/// database.
#[derive(Debug)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
    starting_balances: BTreeMap<CurrencyId, u64>,
}

impl MemoryAccountStore {
    /// Create a store granting `starting_balances` to new accounts.
    pub fn new(starting_balances: BTreeMap<CurrencyId, u64>) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            starting_balances,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<AccountId, Account>>, StoreError> {
        self.accounts
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn load_or_create(&self, id: &AccountId) -> Result<Account, StoreError> {
        let mut accounts = self.lock()?;
        let account = accounts
            .entry(id.clone())
            .or_insert_with(|| Account::new(id.clone(), &self.starting_balances));
        Ok(account.clone())
    }

    async fn save(&self, account: &Account) -> Result<SaveOutcome, StoreError> {
        let mut accounts = self.lock()?;
        match accounts.get_mut(&account.id) {
            Some(stored) if stored.version == account.version => {
                let mut next = account.clone();
                next.version += 1;
                *stored = next;
                Ok(SaveOutcome::Committed)
            }
            Some(_) => Ok(SaveOutcome::Conflict),
            // Saving an account that was never loaded counts as a conflict:
            // the caller's view has no stored counterpart.
            None => Ok(SaveOutcome::Conflict),
        }
    }
}
