//! Deterministic price ranking.

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Where items without a usable provider price are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnpricedPolicy {
    /// Rank as if the price were `0` (cheapest).
    #[default]
    AsZero,
    /// Rank after every priced item.
    Last,
}

impl UnpricedPolicy {
    /// Parses a policy name (`as-zero` or `last`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "as-zero" | "zero" => Some(Self::AsZero),
            "last" => Some(Self::Last),
            _ => None,
        }
    }

    /// Returns the policy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsZero => "as-zero",
            Self::Last => "last",
        }
    }
}

/// Ranks items by ascending price, unpriced items counting as `0`.
pub fn rank_items(items: &[Item]) -> Vec<Item> {
    rank_items_with(items, UnpricedPolicy::AsZero)
}

/// Ranks items by ascending price with an explicit unpriced policy.
///
/// Returns a new vector; the input is untouched. The sort is stable, so
/// items with equal keys keep their original relative order.
pub fn rank_items_with(items: &[Item], policy: UnpricedPolicy) -> Vec<Item> {
    let mut ranked = items.to_vec();

    match policy {
        UnpricedPolicy::AsZero => ranked.sort_by(|a, b| a.price.total_cmp(&b.price)),
        UnpricedPolicy::Last => ranked.sort_by(|a, b| {
            (!a.price_known)
                .cmp(&!b.price_known)
                .then(a.price.total_cmp(&b.price))
        }),
    }

    ranked
}
