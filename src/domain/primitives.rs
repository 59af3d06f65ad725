//! Domain primitives: AccountId, CurrencyId, BannerId, ExchangeId, Rarity.

use serde::{Deserialize, Serialize};

/// Opaque account identifier supplied by the identity layer.
///
/// The service trusts it completely; verification happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an AccountId from a string.
    pub fn new(id: String) -> Self {
        AccountId(id)
    }

    /// Get the identifier as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency name (e.g., "star_night_crystals", "lumen_orbs").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(pub String);

impl CurrencyId {
    /// Create a CurrencyId from a string.
    pub fn new(id: String) -> Self {
        CurrencyId(id)
    }

    /// Get the currency name as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Banner identifier (e.g., "standard", "limited").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BannerId(pub String);

impl BannerId {
    /// Create a BannerId from a string.
    pub fn new(id: String) -> Self {
        BannerId(id)
    }

    /// Get the banner id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BannerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange definition identifier (e.g., "buy_lumen_10").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExchangeId(pub String);

impl ExchangeId {
    /// Create an ExchangeId from a string.
    pub fn new(id: String) -> Self {
        ExchangeId(id)
    }

    /// Get the exchange id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered rarity tier. The default catalog uses 3/4/5 stars, but any
/// ordered set of tiers is legal; comparisons follow the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rarity(pub u8);

impl Rarity {
    /// Create a Rarity from its star count.
    pub fn new(stars: u8) -> Self {
        Rarity(stars)
    }

    /// Get the star count.
    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*", self.0)
    }
}
