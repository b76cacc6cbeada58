//! Tier Placement Strategies
//!
//! # Problem
//!
//! Place one tier's items, one per bin, such that every bin keeps
//! `remaining_quota(category) ≥ 0`. Earlier tiers (and pre-placements) have
//! already consumed some quota, so not every bin accepts every item.
//!
//! ## Sequential First Fit
//! Items in random order, each into the first eligible bin in label order.
//! Ignores the future; an item with no eligible bin dead-ends the trial,
//! which is then discarded.
//!
//! ## Lookahead Validated
//! First fit, but each tentative placement is checked against the items of
//! this tier still to come:
//! ```text
//! spaces(c) = #{ bins with empty tier slot and quota(c) > 0 }
//! needs(c)  = #{ remaining tier items of category c }
//! accept  ⇔  needs(c) ≤ spaces(c)  for every c
//! ```
//! The test is necessary but not sufficient, so a small share of trials
//! still dead-ends and is discarded.
//!
//! ## Rejection Restart
//! Each item goes to a bin chosen uniformly from its eligible set. If any bin
//! ends the pass without an item for this tier, every placement of the pass
//! is undone and the tier is redrawn from a fresh permutation. Trials are
//! never discarded.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::draw::board::DrawBoard;
use crate::draw::roster::{CategoryId, ItemId, Roster};
use crate::error::DrawError;
use crate::rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStrategy {
    SequentialFirstFit,
    LookaheadValidated,
    #[default]
    RejectionRestart,
}

/// Result of placing one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    /// Every bin received an item; `redraws` failed passes preceded success.
    Placed { redraws: usize },
    /// Some item had no admissible bin; the trial must be discarded.
    Stuck,
    /// The redraw cap was hit without a valid pass.
    Exhausted { redraws: usize },
}

impl DrawStrategy {
    pub const ALL: [DrawStrategy; 3] = [
        DrawStrategy::SequentialFirstFit,
        DrawStrategy::LookaheadValidated,
        DrawStrategy::RejectionRestart,
    ];

    /// Whether dead-ended trials are dropped from the denominator.
    pub fn discards_infeasible(&self) -> bool {
        !matches!(self, DrawStrategy::RejectionRestart)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrawStrategy::SequentialFirstFit => "naive",
            DrawStrategy::LookaheadValidated => "lookahead",
            DrawStrategy::RejectionRestart => "retry",
        }
    }

    /// Place every unplaced item of `tier`.
    ///
    /// `max_attempts` bounds the passes of the rejection strategy; the other
    /// strategies make a single pass.
    pub fn place_tier<R: Rng + ?Sized>(
        &self,
        board: &mut DrawBoard,
        roster: &Roster,
        tier: usize,
        max_attempts: usize,
        rng: &mut R,
    ) -> TierOutcome {
        let pending: Vec<ItemId> = roster
            .tier(tier)
            .iter()
            .copied()
            .filter(|&item| board.bin_of(item).is_none())
            .collect();

        match self {
            DrawStrategy::SequentialFirstFit => first_fit(board, roster, &pending, rng),
            DrawStrategy::LookaheadValidated => lookahead(board, roster, tier, &pending, rng),
            DrawStrategy::RejectionRestart => {
                rejection_restart(board, roster, tier, &pending, max_attempts, rng)
            }
        }
    }
}

impl fmt::Display for DrawStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrawStrategy {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" | "sequential" | "first-fit" => Ok(DrawStrategy::SequentialFirstFit),
            "lookahead" => Ok(DrawStrategy::LookaheadValidated),
            "retry" | "rejection" => Ok(DrawStrategy::RejectionRestart),
            other => Err(DrawError::InvalidConfiguration {
                field: "strategy".to_string(),
                reason: format!("'{}' is not one of naive, lookahead, retry", other),
            }),
        }
    }
}

fn first_fit<R: Rng + ?Sized>(
    board: &mut DrawBoard,
    roster: &Roster,
    pending: &[ItemId],
    rng: &mut R,
) -> TierOutcome {
    for item in rng::permutation(pending, rng) {
        match board.first_eligible(roster, item) {
            Some(bin) => board.place(roster, item, bin),
            None => return TierOutcome::Stuck,
        }
    }
    TierOutcome::Placed { redraws: 0 }
}

fn lookahead<R: Rng + ?Sized>(
    board: &mut DrawBoard,
    roster: &Roster,
    tier: usize,
    pending: &[ItemId],
    rng: &mut R,
) -> TierOutcome {
    let order = rng::permutation(pending, rng);
    for (pos, &item) in order.iter().enumerate() {
        let rest = &order[pos + 1..];
        let mut committed = false;
        for bin in 0..board.bin_count() {
            if !board.accepts(roster, bin, item) {
                continue;
            }
            board.place(roster, item, bin);
            if remains_feasible(board, roster, tier, rest) {
                committed = true;
                break;
            }
            board.undo(roster, item);
        }
        if !committed {
            return TierOutcome::Stuck;
        }
    }
    TierOutcome::Placed { redraws: 0 }
}

/// Per-category space check for the rest of a tier.
///
/// Each bin with an open slot contributes at most one space per category,
/// since only one more item of this tier can land there.
fn remains_feasible(board: &DrawBoard, roster: &Roster, tier: usize, rest: &[ItemId]) -> bool {
    let categories = roster.categories().len();
    let mut balance = vec![0i64; categories];
    for bin in board.bins().iter().filter(|b| b.slot(tier).is_none()) {
        for (c, slot) in balance.iter_mut().enumerate() {
            if bin.remaining(CategoryId(c)) > 0 {
                *slot += 1;
            }
        }
    }
    for &item in rest {
        balance[roster.category_of(item).0] -= 1;
    }
    balance.iter().all(|&b| b >= 0)
}

fn rejection_restart<R: Rng + ?Sized>(
    board: &mut DrawBoard,
    roster: &Roster,
    tier: usize,
    pending: &[ItemId],
    max_attempts: usize,
    rng: &mut R,
) -> TierOutcome {
    let mut eligible = Vec::with_capacity(board.bin_count());
    let mut placed = Vec::with_capacity(pending.len());

    for attempt in 0..max_attempts {
        placed.clear();
        for item in rng::permutation(pending, rng) {
            board.eligible_bins(roster, item, &mut eligible);
            if let Some(bin) = rng::choose_uniform(&eligible, rng) {
                board.place(roster, item, bin);
                placed.push(item);
            }
        }
        if board.is_tier_complete(tier) {
            return TierOutcome::Placed { redraws: attempt };
        }
        for &item in &placed {
            board.undo(roster, item);
        }
    }
    TierOutcome::Exhausted {
        redraws: max_attempts,
    }
}
