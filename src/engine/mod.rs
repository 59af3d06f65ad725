//! Pure computation engine: pull resolution and account state transitions.
//!
//! Nothing in this module performs I/O or awaits. The resolver maps one draw
//! onto one item; the ledger turns a whole batch (or exchange) into a new
//! account value, so persistence is a single save and a failed operation
//! leaves the caller's account untouched.

pub mod ledger;
pub mod resolver;

pub use ledger::{
    AccountLedger, BatchResult, ExchangeResult, LedgerError, Payment, PullType,
};
pub use resolver::{resolve_one, resolve_with_draw, Resolution, ResolveError};
