//! Item type representing a single pullable catalog entry.

use crate::domain::Rarity;
use serde::{Deserialize, Serialize};

/// Stable item identifier within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create an ItemId from a string.
    pub fn new(id: String) -> Self {
        ItemId(id)
    }

    /// Get the item id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A playable character.
    Character,
    /// A weapon.
    Weapon,
    /// An armor piece.
    Armor,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Character => write!(f, "character"),
            Category::Weapon => write!(f, "weapon"),
            Category::Armor => write!(f, "armor"),
        }
    }
}

/// A single pullable item. Immutable catalog content; an item may appear in
/// the pools of more than one banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// Human-readable name.
    pub display_name: String,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Category (character, weapon, armor).
    pub category: Category,
    /// Whether the item is exclusive to limited banners.
    #[serde(default)]
    pub limited: bool,
}
