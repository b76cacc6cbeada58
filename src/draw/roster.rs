//! Draw Roster: items, categories and bins
//!
//! A roster is the fixed configuration shared by every trial:
//!
//! - **Items** (teams), each with a tier (pot) and a category (confederation)
//! - **Categories**, each with a per-bin quota and an expected roster count
//! - **Bin labels** (groups); the number of bins equals the items per tier
//! - **Pre-placements**: items forced into a bin before randomization
//!
//! Construction validates everything a trial relies on, so the draw loop
//! itself never has to handle a malformed roster.
//!
//! # Integrity Rules
//!
//! ```text
//! |tier t|                    = bins                for every tier t
//! |category c|                = expected(c)         for every category c
//! quota(c) × bins             ≥ |category c|        (enough capacity overall)
//! ```

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::RosterFile;
use crate::error::{DrawError, DrawResult};

/// Number of tiers (pots); every bin holds one item per tier.
pub const TIER_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CategoryId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Maximum number of this category's items a single bin may hold
    pub quota: u32,
    pub expected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    /// Zero-based tier index
    pub tier: usize,
    pub category: CategoryId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrePlacement {
    pub item: ItemId,
    pub bin: usize,
}

#[derive(Debug, Clone)]
pub struct Roster {
    categories: Vec<Category>,
    items: Vec<Item>,
    bin_labels: Vec<String>,
    pre_placements: Vec<PrePlacement>,
    tiers: [Vec<ItemId>; TIER_COUNT],
    quota_template: Vec<u32>,
    default_picked: Option<ItemId>,
}

fn unknown(kind: &str, name: &str) -> DrawError {
    DrawError::UnknownName {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

fn integrity(reason: String) -> DrawError {
    DrawError::RosterIntegrity { reason }
}

impl Roster {
    /// Resolve names and validate a roster description.
    pub fn from_file(file: &RosterFile) -> DrawResult<Self> {
        if file.bins.is_empty() {
            return Err(DrawError::InvalidConfiguration {
                field: "bins".to_string(),
                reason: "at least one bin is required".to_string(),
            });
        }
        let mut bin_index = HashMap::new();
        for (i, label) in file.bins.iter().enumerate() {
            if bin_index.insert(label.as_str(), i).is_some() {
                return Err(integrity(format!("bin '{}' is defined twice", label)));
            }
        }

        let mut category_index = HashMap::new();
        let mut categories = Vec::with_capacity(file.categories.len());
        for (i, entry) in file.categories.iter().enumerate() {
            if category_index.insert(entry.name.as_str(), CategoryId(i)).is_some() {
                return Err(integrity(format!("category '{}' is defined twice", entry.name)));
            }
            categories.push(Category {
                name: entry.name.clone(),
                quota: entry.quota,
                expected: entry.expected,
            });
        }

        let mut names = HashSet::new();
        let mut items = Vec::with_capacity(file.teams.len());
        let mut tiers: [Vec<ItemId>; TIER_COUNT] = Default::default();
        for entry in &file.teams {
            if !names.insert(entry.name.as_str()) {
                return Err(integrity(format!("team '{}' is listed twice", entry.name)));
            }
            if entry.pot == 0 || entry.pot > TIER_COUNT {
                return Err(DrawError::InvalidConfiguration {
                    field: format!("teams.{}.pot", entry.name),
                    reason: format!("must be between 1 and {}", TIER_COUNT),
                });
            }
            let category = *category_index
                .get(entry.category.as_str())
                .ok_or_else(|| unknown("category", &entry.category))?;
            let id = ItemId(items.len());
            tiers[entry.pot - 1].push(id);
            items.push(Item {
                name: entry.name.clone(),
                tier: entry.pot - 1,
                category,
            });
        }

        let bins = file.bins.len();
        for (tier, members) in tiers.iter().enumerate() {
            if members.len() != bins {
                return Err(integrity(format!(
                    "pot {} has {} teams, expected {}",
                    tier + 1,
                    members.len(),
                    bins
                )));
            }
        }

        let mut category_counts = vec![0usize; categories.len()];
        for item in &items {
            category_counts[item.category.0] += 1;
        }
        for (category, &count) in categories.iter().zip(&category_counts) {
            if count != category.expected {
                return Err(integrity(format!(
                    "category '{}' has {} teams, expected {}",
                    category.name, count, category.expected
                )));
            }
            let capacity = category.quota as usize * bins;
            if count > capacity {
                return Err(integrity(format!(
                    "category '{}' has {} teams but only {} places across {} bins",
                    category.name, count, capacity, bins
                )));
            }
        }

        let mut roster = Roster {
            quota_template: categories.iter().map(|c| c.quota).collect(),
            categories,
            items,
            bin_labels: file.bins.clone(),
            pre_placements: Vec::with_capacity(file.pre_placements.len()),
            tiers,
            default_picked: None,
        };

        // Pre-placements must leave each bin within quota and each slot single.
        let mut used = vec![roster.quota_template.clone(); bins];
        let mut filled = HashSet::new();
        let mut placed = HashSet::new();
        for entry in &file.pre_placements {
            let item = roster.item_id(&entry.team)?;
            let bin = *bin_index
                .get(entry.bin.as_str())
                .ok_or_else(|| unknown("bin", &entry.bin))?;
            let tier = roster.items[item.0].tier;
            let category = roster.items[item.0].category;
            if !placed.insert(item) {
                return Err(integrity(format!("team '{}' is pre-placed twice", entry.team)));
            }
            if !filled.insert((bin, tier)) {
                return Err(integrity(format!(
                    "bin '{}' already has a pre-placed team in pot {}",
                    entry.bin,
                    tier + 1
                )));
            }
            let remaining = &mut used[bin][category.0];
            if *remaining == 0 {
                return Err(integrity(format!(
                    "pre-placing '{}' exceeds the '{}' quota of bin '{}'",
                    entry.team, roster.categories[category.0].name, entry.bin
                )));
            }
            *remaining -= 1;
            roster.pre_placements.push(PrePlacement { item, bin });
        }

        if let Some(name) = &file.picked {
            roster.default_picked = Some(roster.item_id(name)?);
        }

        Ok(roster)
    }

    pub fn item_id(&self, name: &str) -> DrawResult<ItemId> {
        self.items
            .iter()
            .position(|item| item.name == name)
            .map(ItemId)
            .ok_or_else(|| unknown("team", name))
    }

    /// The distinguished item: `name` when given, otherwise the roster default.
    pub fn resolve_picked(&self, name: Option<&str>) -> DrawResult<ItemId> {
        match name {
            Some(name) => self.item_id(name),
            None => self.default_picked.ok_or_else(|| DrawError::InvalidConfiguration {
                field: "picked".to_string(),
                reason: "no team chosen and the roster names no default".to_string(),
            }),
        }
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_of(&self, id: ItemId) -> CategoryId {
        self.items[id.0].category
    }

    /// Items of one tier, in roster order
    pub fn tier(&self, tier: usize) -> &[ItemId] {
        &self.tiers[tier]
    }

    pub fn bin_count(&self) -> usize {
        self.bin_labels.len()
    }

    pub fn bin_label(&self, bin: usize) -> &str {
        &self.bin_labels[bin]
    }

    pub fn pre_placements(&self) -> &[PrePlacement] {
        &self.pre_placements
    }

    /// Fresh per-bin quota, indexed by category
    pub fn quota_template(&self) -> &[u32] {
        &self.quota_template
    }

    pub fn default_picked(&self) -> Option<ItemId> {
        self.default_picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryEntry, PrePlacementEntry, TeamEntry};

    fn team(name: &str, pot: usize, category: &str) -> TeamEntry {
        TeamEntry {
            name: name.to_string(),
            pot,
            category: category.to_string(),
        }
    }

    fn small_file() -> RosterFile {
        RosterFile {
            picked: Some("A1".to_string()),
            bins: vec!["X".to_string(), "Y".to_string()],
            categories: vec![
                CategoryEntry {
                    name: "red".to_string(),
                    quota: 2,
                    expected: 4,
                },
                CategoryEntry {
                    name: "blue".to_string(),
                    quota: 2,
                    expected: 4,
                },
            ],
            teams: vec![
                team("A1", 1, "red"),
                team("A2", 1, "blue"),
                team("B1", 2, "red"),
                team("B2", 2, "blue"),
                team("C1", 3, "red"),
                team("C2", 3, "blue"),
                team("D1", 4, "red"),
                team("D2", 4, "blue"),
            ],
            pre_placements: vec![PrePlacementEntry {
                team: "A1".to_string(),
                bin: "X".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_roster() {
        let roster = Roster::from_file(&small_file()).expect("valid");
        assert_eq!(roster.len(), 8);
        assert_eq!(roster.tier(0).len(), 2);
        assert_eq!(roster.quota_template(), &[2, 2]);
        assert_eq!(roster.pre_placements()[0].bin, 0);
        assert_eq!(roster.resolve_picked(None).unwrap(), ItemId(0));
        assert_eq!(roster.resolve_picked(Some("D2")).unwrap(), ItemId(7));
    }

    #[test]
    fn test_tier_count_mismatch() {
        let mut file = small_file();
        file.teams[1].pot = 2;
        let err = Roster::from_file(&file).unwrap_err();
        assert!(matches!(err, DrawError::RosterIntegrity { .. }));
        assert!(err.to_string().contains("pot 1"));
    }

    #[test]
    fn test_expected_category_mismatch() {
        let mut file = small_file();
        file.categories[0].expected = 5;
        let err = Roster::from_file(&file).unwrap_err();
        assert!(err.to_string().contains("red"));
    }

    #[test]
    fn test_capacity_shortfall() {
        let mut file = small_file();
        file.categories[0].quota = 1;
        let err = Roster::from_file(&file).unwrap_err();
        assert!(err.to_string().contains("places"));
    }

    #[test]
    fn test_unknown_category() {
        let mut file = small_file();
        file.teams[0].category = "green".to_string();
        let err = Roster::from_file(&file).unwrap_err();
        assert!(matches!(err, DrawError::UnknownName { .. }));
    }

    #[test]
    fn test_duplicate_team() {
        let mut file = small_file();
        file.teams[1].name = "A1".to_string();
        assert!(Roster::from_file(&file).is_err());
    }

    #[test]
    fn test_pot_out_of_range() {
        let mut file = small_file();
        file.teams[0].pot = 5;
        let err = Roster::from_file(&file).unwrap_err();
        assert!(matches!(err, DrawError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_pre_placement_into_filled_slot() {
        let mut file = small_file();
        file.pre_placements.push(PrePlacementEntry {
            team: "A2".to_string(),
            bin: "X".to_string(),
        });
        let err = Roster::from_file(&file).unwrap_err();
        assert!(err.to_string().contains("already has"));
    }

    #[test]
    fn test_pre_placement_unknown_bin() {
        let mut file = small_file();
        file.pre_placements[0].bin = "Z".to_string();
        assert!(matches!(
            Roster::from_file(&file).unwrap_err(),
            DrawError::UnknownName { .. }
        ));
    }

    #[test]
    fn test_missing_default_picked() {
        let mut file = small_file();
        file.picked = None;
        let roster = Roster::from_file(&file).expect("valid");
        assert!(roster.resolve_picked(None).is_err());
    }
}
