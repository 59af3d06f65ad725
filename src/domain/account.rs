//! Account aggregate: balances, pity state, inventory, exchange counters.

use crate::domain::{AccountId, BannerId, CurrencyId, ExchangeId, ItemId, PityCounters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A debit that would overdraw a balance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient {currency}: need {required}, have {available}")]
pub struct BalanceError {
    pub currency: CurrencyId,
    pub required: u64,
    pub available: u64,
}

/// The player aggregate. Balances are unsigned, so a negative balance is
/// unrepresentable; `debit` refuses rather than wraps. The inventory is
/// append-only, in pull order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque identifier from the identity layer.
    pub id: AccountId,
    /// Currency name -> balance.
    pub balances: BTreeMap<CurrencyId, u64>,
    /// Banner id -> pity counters.
    pub pity: BTreeMap<BannerId, PityCounters>,
    /// Resolved items, oldest first.
    pub inventory: Vec<ItemId>,
    /// Exchange id -> uses this month. Reset happens outside this service.
    pub monthly_exchanges: BTreeMap<ExchangeId, u32>,
    /// Storage concurrency token; owned by the store, not part of the state.
    #[serde(skip)]
    pub version: i64,
}

impl Account {
    /// Fresh account with the configured starting balances and no pity.
    pub fn new(id: AccountId, starting_balances: &BTreeMap<CurrencyId, u64>) -> Self {
        Account {
            id,
            balances: starting_balances.clone(),
            pity: BTreeMap::new(),
            inventory: Vec::new(),
            monthly_exchanges: BTreeMap::new(),
            version: 0,
        }
    }

    /// Current balance for a currency. Unknown currencies read as 0.
    pub fn balance(&self, currency: &CurrencyId) -> u64 {
        self.balances.get(currency).copied().unwrap_or(0)
    }

    /// Add to a balance.
    pub fn credit(&mut self, currency: &CurrencyId, amount: u64) {
        let entry = self.balances.entry(currency.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Subtract from a balance, refusing to overdraw.
    pub fn debit(&mut self, currency: &CurrencyId, amount: u64) -> Result<(), BalanceError> {
        let available = self.balance(currency);
        let remaining = available.checked_sub(amount).ok_or_else(|| BalanceError {
            currency: currency.clone(),
            required: amount,
            available,
        })?;
        self.balances.insert(currency.clone(), remaining);
        Ok(())
    }

    /// Pity counters for a banner. Absent entries read as zeroed.
    pub fn pity_for(&self, banner: &BannerId) -> PityCounters {
        self.pity.get(banner).cloned().unwrap_or_default()
    }

    /// Replace the pity counters for a banner.
    pub fn set_pity(&mut self, banner: BannerId, counters: PityCounters) {
        self.pity.insert(banner, counters);
    }

    /// Append a resolved item to the inventory.
    pub fn push_item(&mut self, item: ItemId) {
        self.inventory.push(item);
    }

    /// Uses of an exchange in the current month.
    pub fn exchange_uses(&self, exchange: &ExchangeId) -> u32 {
        self.monthly_exchanges.get(exchange).copied().unwrap_or(0)
    }

    /// Count one more use of an exchange.
    pub fn record_exchange_use(&mut self, exchange: &ExchangeId) {
        let entry = self.monthly_exchanges.entry(exchange.clone()).or_insert(0);
        *entry = entry.saturating_add(1);
    }
}
