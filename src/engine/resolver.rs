//! Weighted pull resolution with hard- and soft-pity adjustment.

use crate::catalog::Banner;
use crate::domain::{BannerId, Item, PityCounters, Rarity};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The selected rarity has no items in the banner's pool. Load-time
    /// validation rejects such banners, so hitting this at resolve time is a
    /// configuration fault, never a fallback to another pool.
    #[error("banner {banner} has no items at rarity {rarity}")]
    EmptyPool { banner: BannerId, rarity: Rarity },
}

/// One resolved pull: the item and the pity counters that now apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub item: Item,
    pub pity: PityCounters,
}

/// Resolve a single pull, drawing the rarity band position from `rng`.
pub fn resolve_one<R: Rng + ?Sized>(
    banner: &Banner,
    pity: &PityCounters,
    rng: &mut R,
) -> Result<Resolution, ResolveError> {
    let draw = rng.gen::<f64>();
    resolve_with_draw(banner, pity, draw, rng)
}

/// Resolve a single pull with an injected band draw `u` in `[0, 1)`.
///
/// `rng` is only consulted for the uniform pick within the chosen rarity's
/// pool, which makes the rarity outcome reproducible in tests. A hard-pity
/// guarantee pre-empts the draw entirely.
pub fn resolve_with_draw<R: Rng + ?Sized>(
    banner: &Banner,
    pity: &PityCounters,
    draw: f64,
    rng: &mut R,
) -> Result<Resolution, ResolveError> {
    let rarity = match guaranteed_rarity(banner, pity) {
        Some(guaranteed) => guaranteed,
        None => rarity_for_draw(banner, pity, draw),
    };

    let item = banner
        .pool(rarity)
        .choose(rng)
        .cloned()
        .ok_or_else(|| ResolveError::EmptyPool {
            banner: banner.id.clone(),
            rarity,
        })?;

    let pity = pity.advanced(rarity, &banner.hard_pity, banner.pity_cascade);
    Ok(Resolution { item, pity })
}

/// The highest tracked rarity whose guarantee fires on this pull, if any.
///
/// A counter at `hard_pity - 1` means this pull is the threshold-th since
/// the last hit, so the guarantee applies now. Only the highest qualifying
/// rarity fires; a satisfied lower guarantee is pre-empted.
pub fn guaranteed_rarity(banner: &Banner, pity: &PityCounters) -> Option<Rarity> {
    banner.tracked_desc().find(|&rarity| {
        let threshold = banner
            .hard_pity_for(rarity)
            .expect("tracked rarities carry a threshold");
        pity.since(rarity) + 1 >= threshold
    })
}

/// Effective top-rarity rate after soft-pity inflation.
///
/// Below the soft-pity start this is the base rate; from the start onward it
/// grows by one step per pull. Non-decreasing in the pity counter.
pub fn effective_top_rate(banner: &Banner, pity: &PityCounters) -> f64 {
    let top = banner.top_rarity();
    let base = banner.base_rate(top);
    let since = pity.since(top);
    if since >= banner.soft_pity_start {
        base + banner.soft_pity_step * f64::from(since - banner.soft_pity_start + 1)
    } else {
        base
    }
}

/// Map a draw in `[0, 1)` onto the banner's rarity bands.
///
/// Bands run highest rarity first: the top band is the soft-pity-adjusted
/// rate, lower bands keep their base rates, and the lowest rarity absorbs
/// whatever mass remains. When inflation pushes the accumulated bands past
/// 1.0 the lowest band collapses to zero width on its own, since no draw
/// can fall past it.
fn rarity_for_draw(banner: &Banner, pity: &PityCounters, draw: f64) -> Rarity {
    let rarities: Vec<Rarity> = banner.rate_rarities_desc().collect();
    let lowest = *rarities
        .last()
        .expect("validated banner has at least one rate band");

    let top = rarities[0];
    let mut acc = 0.0;
    for &rarity in &rarities[..rarities.len() - 1] {
        acc += if rarity == top {
            effective_top_rate(banner, pity)
        } else {
            banner.base_rate(rarity)
        };
        if draw < acc {
            return rarity;
        }
    }
    lowest
}
