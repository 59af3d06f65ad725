pub mod service;

pub use service::{AccountSummary, GachaService, ServiceError};
