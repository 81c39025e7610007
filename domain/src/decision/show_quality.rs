//! Show-quality representative selection
//!
//! For each lot, every category gets one representative photo. The newest
//! photo wins unless it already represents another category of the same
//! lot and an unclaimed photo exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A categorized photo asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedAsset {
    pub asset_id: String,
    pub lot_id: String,
    pub category: String,
    pub photographed_at: DateTime<Utc>,
}

/// Representative choice for one (lot, category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowQualitySelection {
    pub lot_id: String,
    pub category: String,
    /// Asset to mark show-quality
    pub chosen: String,
    /// Assets to explicitly unmark, newest first
    pub unmarked: Vec<String>,
}

/// Choose representatives for every (lot, category) in `assets`.
///
/// An asset listed under several categories appears once per category.
/// Lots and categories are processed in sorted order, so earlier
/// categories claim first.
pub fn select_show_quality(assets: &[CategorizedAsset]) -> Vec<ShowQualitySelection> {
    let mut lots: BTreeMap<&str, BTreeMap<&str, Vec<&CategorizedAsset>>> = BTreeMap::new();
    for asset in assets {
        lots.entry(asset.lot_id.as_str())
            .or_default()
            .entry(asset.category.as_str())
            .or_default()
            .push(asset);
    }

    let mut selections = Vec::new();
    for (lot_id, categories) in lots {
        let mut claimed: HashSet<&str> = HashSet::new();

        for (category, mut members) in categories {
            // Stable: equal timestamps keep input order.
            members.sort_by(|a, b| b.photographed_at.cmp(&a.photographed_at));

            let newest = members[0].asset_id.as_str();
            let chosen = if claimed.contains(newest) {
                members
                    .iter()
                    .map(|a| a.asset_id.as_str())
                    .find(|id| !claimed.contains(id))
                    .unwrap_or(newest)
            } else {
                newest
            };

            let unmarked = members
                .iter()
                .map(|a| a.asset_id.as_str())
                .filter(|id| *id != chosen && !claimed.contains(id))
                .map(str::to_string)
                .collect();

            claimed.insert(chosen);
            selections.push(ShowQualitySelection {
                lot_id: lot_id.to_string(),
                category: category.to_string(),
                chosen: chosen.to_string(),
                unmarked,
            });
        }
    }

    selections
}
