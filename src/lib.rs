pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use catalog::{Banner, Catalog, ExchangeDef};
pub use config::Config;
pub use db::{init_db, SqliteAccountStore};
pub use domain::{
    Account, AccountId, BannerId, Category, CurrencyId, ExchangeId, Item, ItemId, PityCounters,
    Rarity,
};
pub use engine::{AccountLedger, BatchResult, ExchangeResult, PullType};
pub use error::AppError;
pub use store::{AccountStore, MemoryAccountStore};
