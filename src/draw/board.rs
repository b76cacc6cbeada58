//! Per-trial draw state: bins with tier slots and remaining quota
//!
//! A `DrawBoard` is allocated once per worker and reset at the start of every
//! trial, so the bins are reused rather than rebuilt. Placement and undo keep
//! three structures in step:
//!
//! - the bin's slot for the item's tier
//! - the bin's remaining quota for the item's category
//! - the item → bin lookup

use crate::draw::roster::{CategoryId, ItemId, Roster, TIER_COUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bin {
    slots: [Option<ItemId>; TIER_COUNT],
    quota: Vec<u32>,
}

impl Bin {
    pub fn new(template: &[u32]) -> Self {
        Bin {
            slots: [None; TIER_COUNT],
            quota: template.to_vec(),
        }
    }

    /// Empty every slot and restore quota from `template`.
    pub fn reset(&mut self, template: &[u32]) {
        self.slots = [None; TIER_COUNT];
        self.quota.clear();
        self.quota.extend_from_slice(template);
    }

    pub fn slot(&self, tier: usize) -> Option<ItemId> {
        self.slots[tier]
    }

    pub fn remaining(&self, category: CategoryId) -> u32 {
        self.quota[category.0]
    }

    /// Empty slot for `tier` and quota left for `category`
    pub fn accepts(&self, tier: usize, category: CategoryId) -> bool {
        self.slots[tier].is_none() && self.quota[category.0] > 0
    }

    pub fn members(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn fill(&mut self, tier: usize, item: ItemId, category: CategoryId) {
        debug_assert!(self.accepts(tier, category));
        self.slots[tier] = Some(item);
        self.quota[category.0] -= 1;
    }

    fn clear(&mut self, tier: usize, category: CategoryId) {
        debug_assert!(self.slots[tier].is_some());
        self.slots[tier] = None;
        self.quota[category.0] += 1;
    }
}

#[derive(Debug, Clone)]
pub struct DrawBoard {
    bins: Vec<Bin>,
    location: Vec<Option<usize>>,
}

impl DrawBoard {
    pub fn new(roster: &Roster) -> Self {
        let mut board = DrawBoard {
            bins: (0..roster.bin_count())
                .map(|_| Bin::new(roster.quota_template()))
                .collect(),
            location: vec![None; roster.len()],
        };
        board.reset(roster);
        board
    }

    /// Start a new trial: empty bins, fresh quota, pre-placements applied.
    pub fn reset(&mut self, roster: &Roster) {
        for bin in &mut self.bins {
            bin.reset(roster.quota_template());
        }
        self.location.iter_mut().for_each(|loc| *loc = None);
        for pre in roster.pre_placements() {
            self.place(roster, pre.item, pre.bin);
        }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn bin(&self, bin: usize) -> &Bin {
        &self.bins[bin]
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn bin_of(&self, item: ItemId) -> Option<usize> {
        self.location[item.0]
    }

    pub fn accepts(&self, roster: &Roster, bin: usize, item: ItemId) -> bool {
        let it = roster.item(item);
        self.bins[bin].accepts(it.tier, it.category)
    }

    /// Every bin that could take `item` right now, in scan order.
    pub fn eligible_bins(&self, roster: &Roster, item: ItemId, out: &mut Vec<usize>) {
        let it = roster.item(item);
        out.clear();
        out.extend(
            self.bins
                .iter()
                .enumerate()
                .filter(|(_, b)| b.accepts(it.tier, it.category))
                .map(|(i, _)| i),
        );
    }

    pub fn first_eligible(&self, roster: &Roster, item: ItemId) -> Option<usize> {
        let it = roster.item(item);
        self.bins
            .iter()
            .position(|b| b.accepts(it.tier, it.category))
    }

    pub fn place(&mut self, roster: &Roster, item: ItemId, bin: usize) {
        let it = roster.item(item);
        debug_assert!(self.location[item.0].is_none());
        self.bins[bin].fill(it.tier, item, it.category);
        self.location[item.0] = Some(bin);
    }

    /// Take `item` back out of its bin; a no-op when it is unplaced.
    pub fn undo(&mut self, roster: &Roster, item: ItemId) {
        if let Some(bin) = self.location[item.0].take() {
            let it = roster.item(item);
            self.bins[bin].clear(it.tier, it.category);
        }
    }

    pub fn is_tier_complete(&self, tier: usize) -> bool {
        self.bins.iter().all(|b| b.slot(tier).is_some())
    }

    pub fn is_complete(&self) -> bool {
        (0..TIER_COUNT).all(|tier| self.is_tier_complete(tier))
            && self.location.iter().all(Option::is_some)
    }

    pub fn placed_count(&self) -> usize {
        self.location.iter().filter(|l| l.is_some()).count()
    }
}
