//! Storage collaborator for account state.
//!
//! The engine never talks to a database directly; it goes through
//! [`AccountStore`], which loads whole account aggregates and persists them
//! with compare-and-swap semantics. Concurrent writers to the same account
//! are detected as a [`SaveOutcome::Conflict`] and retried by the service.

use crate::domain::{Account, AccountId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryAccountStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A persisted account failed to decode.
    #[error("corrupt account state for {account}: {detail}")]
    Corrupt { account: AccountId, detail: String },
}

/// Result of a conditional save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The account was persisted; its stored version advanced.
    Committed,
    /// Another writer updated the account first; reload and retry.
    Conflict,
}

/// Load/save contract for account aggregates.
///
/// Implementations create missing accounts with their configured starting
/// balances, and must make `save` conditional on the version the account
/// was loaded at.
#[async_trait]
pub trait AccountStore: Send + Sync + fmt::Debug {
    /// Load the account, creating it with default state on first access.
    async fn load_or_create(&self, id: &AccountId) -> Result<Account, StoreError>;

    /// Persist the account if its stored version still matches
    /// `account.version`.
    async fn save(&self, account: &Account) -> Result<SaveOutcome, StoreError>;
}
