//! Banner catalog: typed, validated gacha configuration.
//!
//! The catalog is loaded once at startup (an embedded default, overridable
//! via `CATALOG_PATH`) and read-only afterwards. Every rate, pool, cost and
//! exchange the engine consumes comes from here; nothing is hardcoded in the
//! resolution path.

use crate::domain::{BannerId, CurrencyId, ExchangeId, Item, PityCounters, Rarity};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

/// Probability rates must sum to 1 within this tolerance.
const RATE_SUM_EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate banner id: {0}")]
    DuplicateBanner(BannerId),
    #[error("duplicate exchange id: {0}")]
    DuplicateExchange(ExchangeId),
    #[error("banner {0} defines no base rates")]
    NoRates(BannerId),
    #[error("banner {banner} rates sum to {sum}, expected 1.0")]
    RateSum { banner: BannerId, sum: f64 },
    #[error("banner {banner} has a negative rate for rarity {rarity}")]
    NegativeRate { banner: BannerId, rarity: Rarity },
    #[error("banner {banner} has an empty pool for rarity {rarity}")]
    EmptyPool { banner: BannerId, rarity: Rarity },
    #[error("banner {banner} has a zero hard-pity threshold for rarity {rarity}")]
    ZeroHardPity { banner: BannerId, rarity: Rarity },
    #[error("banner {0} has a negative soft-pity step")]
    NegativeSoftPityStep(BannerId),
    #[error("banner {banner} soft pity starts at {start}, at or past hard pity {hard}")]
    SoftPityPastHardPity {
        banner: BannerId,
        start: u32,
        hard: u32,
    },
    #[error("{context} references unknown currency {currency}")]
    UnknownCurrency {
        context: String,
        currency: CurrencyId,
    },
}

/// Fixed secondary-currency reward granted per resolved item of a rarity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RarityReward {
    pub currency: CurrencyId,
    pub amount: u64,
}

/// A currency exchange offered by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeDef {
    pub id: ExchangeId,
    pub cost_currency: CurrencyId,
    pub cost_amount: u64,
    pub reward_currency: CurrencyId,
    pub reward_amount: u64,
    /// Maximum successful uses per month; None means unlimited.
    #[serde(default)]
    pub monthly_limit: Option<u32>,
}

/// One banner's immutable configuration: pools partitioned by rarity, rates,
/// pity thresholds and costs.
#[derive(Debug, Clone)]
pub struct Banner {
    pub id: BannerId,
    pub orb_currency: CurrencyId,
    pub pull_cost_orbs: u64,
    pub pull_cost_primary: u64,
    pub multi_pull_cost_primary: u64,
    /// Whether a high-rarity hit also resets lower tracked counters.
    pub pity_cascade: bool,
    /// Pull count at which the top rarity's rate starts ramping.
    pub soft_pity_start: u32,
    /// Rate increase per pull past the soft-pity start.
    pub soft_pity_step: f64,
    /// Tracked rarities and their guarantee thresholds.
    pub hard_pity: BTreeMap<Rarity, u32>,
    /// Base probability per offered rarity.
    pub base_rates: BTreeMap<Rarity, f64>,
    /// Per-rarity secondary-currency rewards.
    pub rarity_rewards: BTreeMap<Rarity, RarityReward>,
    pools: BTreeMap<Rarity, Vec<Item>>,
}

impl Banner {
    /// Items offered at the given rarity.
    pub fn pool(&self, rarity: Rarity) -> &[Item] {
        self.pools.get(&rarity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Base rate for a rarity; rarities the banner does not offer read as 0.
    pub fn base_rate(&self, rarity: Rarity) -> f64 {
        self.base_rates.get(&rarity).copied().unwrap_or(0.0)
    }

    /// Offered rarities, highest first.
    pub fn rate_rarities_desc(&self) -> impl Iterator<Item = Rarity> + '_ {
        self.base_rates.keys().rev().copied()
    }

    /// The banner's highest offered rarity.
    ///
    /// Validation guarantees at least one rate band exists.
    pub fn top_rarity(&self) -> Rarity {
        self.rate_rarities_desc()
            .next()
            .expect("validated banner has at least one rate band")
    }

    /// Tracked (hard-pity) rarities, highest first.
    pub fn tracked_desc(&self) -> impl Iterator<Item = Rarity> + '_ {
        self.hard_pity.keys().rev().copied()
    }

    /// Guarantee threshold for a tracked rarity.
    pub fn hard_pity_for(&self, rarity: Rarity) -> Option<u32> {
        self.hard_pity.get(&rarity).copied()
    }

    /// Zeroed pity counters covering every tracked rarity.
    pub fn zeroed_pity(&self) -> PityCounters {
        PityCounters::zeroed(self.tracked_desc())
    }
}

/// The full static configuration: banners, exchanges, currencies.
#[derive(Debug, Clone)]
pub struct Catalog {
    primary_currency: CurrencyId,
    starting_balances: BTreeMap<CurrencyId, u64>,
    banners: BTreeMap<BannerId, Banner>,
    exchanges: BTreeMap<ExchangeId, ExchangeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    primary_currency: CurrencyId,
    starting_balances: BTreeMap<CurrencyId, u64>,
    banners: Vec<RawBanner>,
    exchanges: Vec<ExchangeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBanner {
    id: BannerId,
    orb_currency: CurrencyId,
    pull_cost_orbs: u64,
    pull_cost_primary: u64,
    multi_pull_cost_primary: u64,
    #[serde(default = "default_cascade")]
    pity_cascade: bool,
    soft_pity_start: u32,
    soft_pity_step: f64,
    hard_pity: BTreeMap<Rarity, u32>,
    base_rates: BTreeMap<Rarity, f64>,
    #[serde(default)]
    rarity_rewards: BTreeMap<Rarity, RarityReward>,
    pool: Vec<Item>,
}

fn default_cascade() -> bool {
    true
}

impl Catalog {
    /// Load from `path`, or the embedded default when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => {
                let contents = std::fs::read_to_string(p)
                    .map_err(|e| CatalogError::Io(p.to_string(), e))?;
                Self::from_json_str(&contents)
            }
            None => Self::from_json_str(DEFAULT_CATALOG),
        }
    }

    /// Parse and validate a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::build(raw)
    }

    fn build(raw: RawCatalog) -> Result<Self, CatalogError> {
        let known = &raw.starting_balances;

        let mut banners = BTreeMap::new();
        for raw_banner in raw.banners {
            let banner = build_banner(raw_banner, known)?;
            if banners.insert(banner.id.clone(), banner.clone()).is_some() {
                return Err(CatalogError::DuplicateBanner(banner.id));
            }
        }

        let mut exchanges = BTreeMap::new();
        for exchange in raw.exchanges {
            for (currency, what) in [
                (&exchange.cost_currency, "cost"),
                (&exchange.reward_currency, "reward"),
            ] {
                if !known.contains_key(currency) {
                    return Err(CatalogError::UnknownCurrency {
                        context: format!("exchange {} {}", exchange.id, what),
                        currency: currency.clone(),
                    });
                }
            }
            if exchanges
                .insert(exchange.id.clone(), exchange.clone())
                .is_some()
            {
                return Err(CatalogError::DuplicateExchange(exchange.id));
            }
        }

        if !known.contains_key(&raw.primary_currency) {
            return Err(CatalogError::UnknownCurrency {
                context: "primary currency".to_string(),
                currency: raw.primary_currency,
            });
        }

        Ok(Catalog {
            primary_currency: raw.primary_currency,
            starting_balances: raw.starting_balances,
            banners,
            exchanges,
        })
    }

    /// The premium currency that substitutes for any banner's orbs.
    pub fn primary_currency(&self) -> &CurrencyId {
        &self.primary_currency
    }

    /// Balances granted to a freshly created account.
    pub fn starting_balances(&self) -> &BTreeMap<CurrencyId, u64> {
        &self.starting_balances
    }

    /// Look up a banner; None for unrecognized ids.
    pub fn banner(&self, id: &BannerId) -> Option<&Banner> {
        self.banners.get(id)
    }

    /// Look up an exchange definition; None for unrecognized ids.
    pub fn exchange(&self, id: &ExchangeId) -> Option<&ExchangeDef> {
        self.exchanges.get(id)
    }

    /// All configured banners.
    pub fn banners(&self) -> impl Iterator<Item = &Banner> {
        self.banners.values()
    }
}

fn build_banner(
    raw: RawBanner,
    known: &BTreeMap<CurrencyId, u64>,
) -> Result<Banner, CatalogError> {
    if raw.base_rates.is_empty() {
        return Err(CatalogError::NoRates(raw.id));
    }
    for (&rarity, &rate) in &raw.base_rates {
        if rate < 0.0 {
            return Err(CatalogError::NegativeRate {
                banner: raw.id,
                rarity,
            });
        }
    }
    let sum: f64 = raw.base_rates.values().sum();
    if (sum - 1.0).abs() > RATE_SUM_EPSILON {
        return Err(CatalogError::RateSum {
            banner: raw.id,
            sum,
        });
    }
    if raw.soft_pity_step < 0.0 {
        return Err(CatalogError::NegativeSoftPityStep(raw.id));
    }

    let mut pools: BTreeMap<Rarity, Vec<Item>> = BTreeMap::new();
    for item in raw.pool {
        pools.entry(item.rarity).or_default().push(item);
    }

    // Every rarity a pull can land on must be resolvable to an item.
    let mut resolvable: Vec<Rarity> = raw.base_rates.keys().copied().collect();
    resolvable.extend(raw.hard_pity.keys().copied());
    for rarity in resolvable {
        if pools.get(&rarity).map_or(true, Vec::is_empty) {
            return Err(CatalogError::EmptyPool {
                banner: raw.id,
                rarity,
            });
        }
    }

    for (&rarity, &threshold) in &raw.hard_pity {
        if threshold == 0 {
            return Err(CatalogError::ZeroHardPity {
                banner: raw.id,
                rarity,
            });
        }
    }

    let top = *raw
        .base_rates
        .keys()
        .next_back()
        .expect("non-empty rates checked above");
    if let Some(&hard) = raw.hard_pity.get(&top) {
        if raw.soft_pity_start >= hard {
            return Err(CatalogError::SoftPityPastHardPity {
                banner: raw.id,
                start: raw.soft_pity_start,
                hard,
            });
        }
    }

    if !known.contains_key(&raw.orb_currency) {
        return Err(CatalogError::UnknownCurrency {
            context: format!("banner {} orb currency", raw.id),
            currency: raw.orb_currency,
        });
    }
    for reward in raw.rarity_rewards.values() {
        if !known.contains_key(&reward.currency) {
            return Err(CatalogError::UnknownCurrency {
                context: format!("banner {} rarity reward", raw.id),
                currency: reward.currency.clone(),
            });
        }
    }

    Ok(Banner {
        id: raw.id,
        orb_currency: raw.orb_currency,
        pull_cost_orbs: raw.pull_cost_orbs,
        pull_cost_primary: raw.pull_cost_primary,
        multi_pull_cost_primary: raw.multi_pull_cost_primary,
        pity_cascade: raw.pity_cascade,
        soft_pity_start: raw.soft_pity_start,
        soft_pity_step: raw.soft_pity_step,
        hard_pity: raw.hard_pity,
        base_rates: raw.base_rates,
        rarity_rewards: raw.rarity_rewards,
        pools,
    })
}
