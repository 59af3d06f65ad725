//! Account ledger: atomic pull batches and currency exchanges.
//!
//! Operations are pure state transitions over [`Account`] values: they take
//! the current account and return a fresh one alongside the result. The
//! caller persists the new value in one save, so a batch is all-or-nothing
//! by construction.

use crate::catalog::Catalog;
use crate::domain::{Account, BalanceError, BannerId, CurrencyId, ExchangeId, Item, PityCounters};
use crate::engine::resolver::{self, ResolveError};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Multi-pulls are a fixed batch of ten at the banner's discounted price.
pub const MULTI_PULL_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullType {
    Single,
    Multi,
}

impl PullType {
    /// Number of resolutions in the batch.
    pub fn batch_size(&self) -> u32 {
        match self {
            PullType::Single => 1,
            PullType::Multi => MULTI_PULL_SIZE,
        }
    }
}

/// The single currency that funded a batch or exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub currency: CurrencyId,
    pub amount: u64,
}

/// Outcome of a successful pull batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Resolved items in pull order.
    pub items: Vec<Item>,
    /// The currency debit that funded the batch.
    pub payment: Payment,
    /// Secondary-currency rewards credited, summed per currency.
    pub rewards: BTreeMap<CurrencyId, u64>,
    /// Balances after the batch.
    pub balances: BTreeMap<CurrencyId, u64>,
    /// Pity counters for the pulled banner after the batch.
    pub pity: PityCounters,
}

/// Outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResult {
    pub exchange: ExchangeId,
    pub payment: Payment,
    pub reward: Payment,
    /// Balances after the exchange.
    pub balances: BTreeMap<CurrencyId, u64>,
    /// Uses this month, for limited exchanges.
    pub monthly_uses: Option<u32>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unknown banner: {0}")]
    UnknownBanner(BannerId),
    #[error("unknown exchange: {0}")]
    UnknownExchange(ExchangeId),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(BalanceError),
    #[error("monthly limit of {limit} reached for exchange {exchange}")]
    LimitReached { exchange: ExchangeId, limit: u32 },
    #[error(transparent)]
    Configuration(#[from] ResolveError),
}

/// Executes pulls and exchanges against account state, driven entirely by
/// catalog data.
#[derive(Clone)]
pub struct AccountLedger {
    catalog: Arc<Catalog>,
}

impl AccountLedger {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Spend currency, resolve a batch of pulls, and apply rewards.
    ///
    /// Payment precedence: the banner's orb currency pays for the whole
    /// batch if it can; otherwise the primary currency pays the (possibly
    /// discounted) batch price. Exactly one currency funds the batch.
    pub fn execute_pull_batch<R: Rng + ?Sized>(
        &self,
        account: &Account,
        banner_id: &BannerId,
        pull_type: PullType,
        rng: &mut R,
    ) -> Result<(Account, BatchResult), LedgerError> {
        let banner = self
            .catalog
            .banner(banner_id)
            .ok_or_else(|| LedgerError::UnknownBanner(banner_id.clone()))?;

        let batch_size = pull_type.batch_size();
        let orb_cost = banner.pull_cost_orbs * u64::from(batch_size);
        let primary_cost = match pull_type {
            PullType::Single => banner.pull_cost_primary,
            PullType::Multi => banner.multi_pull_cost_primary,
        };
        let primary = self.catalog.primary_currency();

        let payment = if account.balance(&banner.orb_currency) >= orb_cost {
            Payment {
                currency: banner.orb_currency.clone(),
                amount: orb_cost,
            }
        } else if account.balance(primary) >= primary_cost {
            Payment {
                currency: primary.clone(),
                amount: primary_cost,
            }
        } else {
            return Err(LedgerError::InsufficientFunds(BalanceError {
                currency: banner.orb_currency.clone(),
                required: orb_cost,
                available: account.balance(&banner.orb_currency),
            }));
        };

        let mut next = account.clone();
        next.debit(&payment.currency, payment.amount)
            .map_err(LedgerError::InsufficientFunds)?;

        let mut pity = account.pity_for(banner_id);
        let mut items = Vec::with_capacity(batch_size as usize);
        let mut rewards: BTreeMap<CurrencyId, u64> = BTreeMap::new();
        for _ in 0..batch_size {
            let resolution = resolver::resolve_one(banner, &pity, rng)?;
            pity = resolution.pity;
            next.push_item(resolution.item.id.clone());
            if let Some(reward) = banner.rarity_rewards.get(&resolution.item.rarity) {
                next.credit(&reward.currency, reward.amount);
                *rewards.entry(reward.currency.clone()).or_insert(0) += reward.amount;
            }
            items.push(resolution.item);
        }
        next.set_pity(banner_id.clone(), pity.clone());

        let result = BatchResult {
            items,
            payment,
            rewards,
            balances: next.balances.clone(),
            pity,
        };
        Ok((next, result))
    }

    /// Trade one currency for another per the exchange definition.
    ///
    /// The monthly limit is checked before funds, so a capped exchange fails
    /// with `LimitReached` no matter the balance.
    pub fn execute_exchange(
        &self,
        account: &Account,
        exchange_id: &ExchangeId,
    ) -> Result<(Account, ExchangeResult), LedgerError> {
        let def = self
            .catalog
            .exchange(exchange_id)
            .ok_or_else(|| LedgerError::UnknownExchange(exchange_id.clone()))?;

        if let Some(limit) = def.monthly_limit {
            if account.exchange_uses(exchange_id) >= limit {
                return Err(LedgerError::LimitReached {
                    exchange: exchange_id.clone(),
                    limit,
                });
            }
        }

        let mut next = account.clone();
        next.debit(&def.cost_currency, def.cost_amount)
            .map_err(LedgerError::InsufficientFunds)?;
        next.credit(&def.reward_currency, def.reward_amount);

        let monthly_uses = def.monthly_limit.map(|_| {
            next.record_exchange_use(exchange_id);
            next.exchange_uses(exchange_id)
        });

        let result = ExchangeResult {
            exchange: exchange_id.clone(),
            payment: Payment {
                currency: def.cost_currency.clone(),
                amount: def.cost_amount,
            },
            reward: Payment {
                currency: def.reward_currency.clone(),
                amount: def.reward_amount,
            },
            balances: next.balances.clone(),
            monthly_uses,
        };
        Ok((next, result))
    }
}
