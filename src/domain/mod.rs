//! Domain types for the gacha resolution core.
//!
//! This module provides:
//! - String newtypes for the identifiers flowing through the system
//! - The ordered Rarity scalar
//! - Item and Category (static catalog content)
//! - PityCounters (per account, per banner guarantee state)
//! - The Account aggregate (balances, pity, inventory, exchange counters)

pub mod account;
pub mod item;
pub mod pity;
pub mod primitives;

pub use account::{Account, BalanceError};
pub use item::{Category, Item, ItemId};
pub use pity::PityCounters;
pub use primitives::{AccountId, BannerId, CurrencyId, ExchangeId, Rarity};
