//! Pity counters: pulls since the last hit of each tracked rarity.

use crate::domain::Rarity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-banner pity state for one account.
///
/// Tracks, for each rarity with a hard-pity threshold, how many pulls have
/// resolved since that rarity (or a higher one, when the banner cascades)
/// last hit. Every counter stays within `[0, hard_pity]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PityCounters {
    since: BTreeMap<Rarity, u32>,
}

impl PityCounters {
    /// Empty counter set (no tracked rarities yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed counters for the given tracked rarities.
    pub fn zeroed<I: IntoIterator<Item = Rarity>>(tracked: I) -> Self {
        PityCounters {
            since: tracked.into_iter().map(|r| (r, 0)).collect(),
        }
    }

    /// Counters built from explicit values, for tests and storage decoding.
    pub fn from_counts<I: IntoIterator<Item = (Rarity, u32)>>(counts: I) -> Self {
        PityCounters {
            since: counts.into_iter().collect(),
        }
    }

    /// Pulls since the given rarity last hit. Untracked rarities read as 0.
    pub fn since(&self, rarity: Rarity) -> u32 {
        self.since.get(&rarity).copied().unwrap_or(0)
    }

    /// Borrow the underlying counter map.
    pub fn counters(&self) -> &BTreeMap<Rarity, u32> {
        &self.since
    }

    /// Counters after resolving an item of `resolved` rarity.
    ///
    /// `caps` defines the tracked rarities and their hard-pity thresholds.
    /// With `cascade`, a hit resets every tracked counter at or below the
    /// resolved rarity; without it, only the exact rarity resets. All other
    /// counters increment by one, clamped at their threshold.
    pub fn advanced(
        &self,
        resolved: Rarity,
        caps: &BTreeMap<Rarity, u32>,
        cascade: bool,
    ) -> PityCounters {
        let since = caps
            .iter()
            .map(|(&rarity, &cap)| {
                let reset = if cascade {
                    resolved >= rarity
                } else {
                    resolved == rarity
                };
                let next = if reset {
                    0
                } else {
                    self.since(rarity).saturating_add(1).min(cap)
                };
                (rarity, next)
            })
            .collect();
        PityCounters { since }
    }
}
