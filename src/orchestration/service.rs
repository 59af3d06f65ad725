//! Request orchestration: load account, run the ledger, persist.
//!
//! The service owns the load->compute->save window. Persistence uses
//! optimistic concurrency: every save is conditional on the version the
//! account was loaded at, and a conflict reruns the whole window, so two
//! concurrent requests for one account can never interleave a
//! read-modify-write. The service itself never touches rates or randomness
//! beyond handing the ledger a fresh thread-local RNG per attempt.

use crate::catalog::Catalog;
use crate::domain::{Account, AccountId, BannerId, CurrencyId, ExchangeId, PityCounters};
use crate::engine::{AccountLedger, BatchResult, ExchangeResult, LedgerError, PullType};
use crate::store::{AccountStore, SaveOutcome, StoreError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Retries of the load->compute->save window before giving up.
const MAX_SAVE_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("account save conflicted {MAX_SAVE_ATTEMPTS} times, giving up")]
    Contention,
}

/// The query operation's view of an account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub balances: BTreeMap<CurrencyId, u64>,
    pub pity: BTreeMap<BannerId, PityCounters>,
    pub inventory_size: usize,
}

#[derive(Clone)]
pub struct GachaService {
    store: Arc<dyn AccountStore>,
    catalog: Arc<Catalog>,
    ledger: AccountLedger,
}

impl GachaService {
    pub fn new(store: Arc<dyn AccountStore>, catalog: Arc<Catalog>) -> Self {
        let ledger = AccountLedger::new(catalog.clone());
        Self {
            store,
            catalog,
            ledger,
        }
    }

    /// Execute a pull batch for the account, retrying on save conflicts.
    pub async fn pull(
        &self,
        account_id: &AccountId,
        banner_id: &BannerId,
        pull_type: PullType,
    ) -> Result<BatchResult, ServiceError> {
        for attempt in 0..MAX_SAVE_ATTEMPTS {
            let account = self.store.load_or_create(account_id).await?;
            // ThreadRng is not Send; keep it scoped so the future stays Send.
            let (next, result) = {
                let mut rng = rand::thread_rng();
                self.ledger
                    .execute_pull_batch(&account, banner_id, pull_type, &mut rng)?
            };
            match self.store.save(&next).await? {
                SaveOutcome::Committed => return Ok(result),
                SaveOutcome::Conflict => {
                    warn!(account = %account_id, attempt, "pull save conflicted, retrying");
                }
            }
        }
        Err(ServiceError::Contention)
    }

    /// Execute a currency exchange for the account, retrying on save
    /// conflicts.
    pub async fn exchange(
        &self,
        account_id: &AccountId,
        exchange_id: &ExchangeId,
    ) -> Result<ExchangeResult, ServiceError> {
        for attempt in 0..MAX_SAVE_ATTEMPTS {
            let account = self.store.load_or_create(account_id).await?;
            let (next, result) = self.ledger.execute_exchange(&account, exchange_id)?;
            match self.store.save(&next).await? {
                SaveOutcome::Committed => return Ok(result),
                SaveOutcome::Conflict => {
                    warn!(account = %account_id, attempt, "exchange save conflicted, retrying");
                }
            }
        }
        Err(ServiceError::Contention)
    }

    /// Balances, per-banner pity and inventory size for the account.
    ///
    /// Banners the account has never pulled on report zeroed counters for
    /// each of their tracked rarities.
    pub async fn account_summary(
        &self,
        account_id: &AccountId,
    ) -> Result<AccountSummary, ServiceError> {
        let account = self.store.load_or_create(account_id).await?;
        Ok(self.summarize(&account))
    }

    fn summarize(&self, account: &Account) -> AccountSummary {
        let pity = self
            .catalog
            .banners()
            .map(|banner| {
                let counters = account
                    .pity
                    .get(&banner.id)
                    .cloned()
                    .unwrap_or_else(|| banner.zeroed_pity());
                (banner.id.clone(), counters)
            })
            .collect();

        AccountSummary {
            balances: account.balances.clone(),
            pity,
            inventory_size: account.inventory.len(),
        }
    }
}
