// src/draw/engine.rs
use crate::draw::board::DrawBoard;
use crate::draw::report::DrawReport;
use crate::draw::roster::{ItemId, Roster, TIER_COUNT};
use crate::draw::strategy::{DrawStrategy, TierOutcome};
use crate::error::{validation::*, DrawError, DrawResult};
use crate::math_utils::Timer;
use crate::rng;
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawConfig {
    pub trials: usize,
    pub seed: u64,
    pub strategy: DrawStrategy,
    /// Distinguished team; falls back to the roster's default
    pub picked: Option<String>,
    pub parallel: bool,
    pub record_trials: bool,
    /// Failed passes allowed on one tier before the whole trial restarts
    pub max_tier_attempts: usize,
    /// Whole-trial restarts allowed before the run fails
    pub max_trial_restarts: usize,
}

impl DrawConfig {
    /// Validate the simulation configuration
    pub fn validate(&self) -> DrawResult<()> {
        validate_trials(self.trials)?;
        if self.max_tier_attempts == 0 {
            return Err(DrawError::InvalidConfiguration {
                field: "max_tier_attempts".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            trials: 100_000,
            seed: 12345,
            strategy: DrawStrategy::RejectionRestart,
            picked: None,
            parallel: false,
            record_trials: false,
            max_tier_attempts: 10_000,
            max_trial_restarts: 1_000,
        }
    }
}

/// How a single trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Every slot filled; the board holds the final assignment.
    Completed { tier_redraws: usize, restarts: usize },
    /// A discarding strategy dead-ended while placing `tier`.
    Discarded { tier: usize },
}

/// Members of the picked bin in one counted trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub bin: String,
    pub members: Vec<String>,
}

/// Co-occurrence accumulator owned by the simulation loop.
///
/// Tallies from disjoint trial ranges merge by addition, so parallel workers
/// each keep one and the results are combined afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawTally {
    pub counts: Vec<u64>,
    pub counted: usize,
    pub discarded: usize,
    pub tier_redraws: u64,
    pub trial_restarts: u64,
    pub records: Option<Vec<TrialRecord>>,
}

impl DrawTally {
    pub fn new(items: usize, record_trials: bool) -> Self {
        DrawTally {
            counts: vec![0; items],
            counted: 0,
            discarded: 0,
            tier_redraws: 0,
            trial_restarts: 0,
            records: record_trials.then(Vec::new),
        }
    }

    /// Fold one finished trial into the tally.
    pub fn record(
        &mut self,
        trial: usize,
        outcome: TrialOutcome,
        board: &DrawBoard,
        roster: &Roster,
        picked: ItemId,
    ) -> DrawResult<()> {
        match outcome {
            TrialOutcome::Completed {
                tier_redraws,
                restarts,
            } => {
                let bin = board
                    .bin_of(picked)
                    .ok_or_else(|| DrawError::RosterIntegrity {
                        reason: format!(
                            "'{}' was not placed in completed trial {}",
                            roster.item(picked).name,
                            trial
                        ),
                    })?;
                for member in board.bin(bin).members() {
                    self.counts[member.0] += 1;
                }
                self.counted += 1;
                self.tier_redraws += tier_redraws as u64;
                self.trial_restarts += restarts as u64;

                if let Some(records) = self.records.as_mut() {
                    let members: Vec<String> = board
                        .bin(bin)
                        .members()
                        .map(|m| roster.item(m).name.clone())
                        .collect();
                    debug!(trial, group = roster.bin_label(bin), ?members, "trial drawn");
                    records.push(TrialRecord {
                        trial,
                        bin: roster.bin_label(bin).to_string(),
                        members,
                    });
                }
            }
            TrialOutcome::Discarded { tier } => {
                self.discarded += 1;
                trace!(trial, pot = tier + 1, "trial dead-ended, discarded");
            }
        }
        Ok(())
    }

    pub fn merge(mut self, other: DrawTally) -> DrawTally {
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.counted += other.counted;
        self.discarded += other.discarded;
        self.tier_redraws += other.tier_redraws;
        self.trial_restarts += other.trial_restarts;
        if let (Some(mine), Some(theirs)) = (self.records.as_mut(), other.records) {
            mine.extend(theirs);
        }
        self
    }
}

/// Run one trial on `board`.
///
/// The board is reset first. On `Completed` it holds the full assignment; on
/// `Discarded` its contents are partial and must not be counted. Exhausting
/// `cfg.max_tier_attempts` on a tier restarts the whole trial, up to
/// `cfg.max_trial_restarts` times.
pub fn run_trial<R: Rng + ?Sized>(
    board: &mut DrawBoard,
    roster: &Roster,
    cfg: &DrawConfig,
    trial: usize,
    rng: &mut R,
) -> DrawResult<TrialOutcome> {
    let mut restarts = 0;
    let mut tier_redraws = 0;

    'trial: loop {
        board.reset(roster);
        for tier in 0..TIER_COUNT {
            match cfg
                .strategy
                .place_tier(board, roster, tier, cfg.max_tier_attempts, rng)
            {
                TierOutcome::Placed { redraws } => tier_redraws += redraws,
                TierOutcome::Stuck => return Ok(TrialOutcome::Discarded { tier }),
                TierOutcome::Exhausted { redraws } => {
                    tier_redraws += redraws;
                    if restarts >= cfg.max_trial_restarts {
                        return Err(DrawError::Infeasible { trial, restarts });
                    }
                    restarts += 1;
                    warn!(trial, pot = tier + 1, restarts, "pot could not be completed, restarting trial");
                    continue 'trial;
                }
            }
        }
        debug_assert!(board.is_complete());
        return Ok(TrialOutcome::Completed {
            tier_redraws,
            restarts,
        });
    }
}

/// Monte Carlo estimate of group co-occurrence with the picked team
///
/// # Algorithm
///
/// For each of `cfg.trials` trials:
/// 1. Reset the board and apply pre-placements
/// 2. Place pots 1..4 with `cfg.strategy`
/// 3. Increment the counter of every team in the picked team's group
///
/// Each team's share is then
/// ```text
/// P(team with picked) ≈ count(team) / counted_trials
/// ```
///
/// # Denominator
///
/// The discarding strategies (naive, lookahead) drop dead-ended trials, so
/// `counted_trials = trials - discarded`. The retry strategy never discards,
/// so `counted_trials = trials`.
///
/// # Reproducibility
///
/// Sequential runs share one generator seeded with `cfg.seed`. Parallel runs
/// seed trial `i` with `cfg.seed + i`, so the result does not depend on the
/// number of rayon threads. The two modes give different (equally valid)
/// samples for the same seed.
///
/// # Errors
///
/// Returns `DrawError` for invalid configuration, an unknown picked team, or a
/// trial whose retry caps were exhausted.
pub fn run_draw_simulation(roster: &Roster, cfg: &DrawConfig) -> DrawResult<DrawReport> {
    cfg.validate()?;
    let picked = roster.resolve_picked(cfg.picked.as_deref())?;

    info!(
        trials = cfg.trials,
        seed = cfg.seed,
        strategy = %cfg.strategy,
        picked = %roster.item(picked).name,
        parallel = cfg.parallel,
        "starting draw simulation"
    );

    let timer = Timer::new();
    let mut tally = if cfg.parallel {
        run_parallel(roster, cfg, picked)?
    } else {
        run_sequential(roster, cfg, picked)?
    };
    if let Some(records) = tally.records.as_mut() {
        records.sort_by_key(|r| r.trial);
    }
    let elapsed = timer.elapsed();

    info!(
        counted = tally.counted,
        discarded = tally.discarded,
        tier_redraws = tally.tier_redraws,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "draw simulation finished"
    );

    Ok(DrawReport::new(roster, picked, cfg, tally, elapsed))
}

fn run_sequential(roster: &Roster, cfg: &DrawConfig, picked: ItemId) -> DrawResult<DrawTally> {
    let mut rng = rng::seed_rng_from_u64(cfg.seed);
    let mut board = DrawBoard::new(roster);
    let mut tally = DrawTally::new(roster.len(), cfg.record_trials);

    for trial in 0..cfg.trials {
        let outcome = run_trial(&mut board, roster, cfg, trial, &mut rng)?;
        tally.record(trial, outcome, &board, roster, picked)?;
    }
    Ok(tally)
}

fn run_parallel(roster: &Roster, cfg: &DrawConfig, picked: ItemId) -> DrawResult<DrawTally> {
    let factory = rng::RngFactory::new(cfg.seed);

    (0..cfg.trials)
        .into_par_iter()
        .try_fold(
            || {
                (
                    DrawBoard::new(roster),
                    DrawTally::new(roster.len(), cfg.record_trials),
                )
            },
            |(mut board, mut tally), trial| {
                let mut rng = factory.create_trial_rng(trial as u64);
                let outcome = run_trial(&mut board, roster, cfg, trial, &mut rng)?;
                tally.record(trial, outcome, &board, roster, picked)?;
                Ok::<_, DrawError>((board, tally))
            },
        )
        .map(|partial| partial.map(|(_, tally)| tally))
        .try_reduce(
            || DrawTally::new(roster.len(), cfg.record_trials),
            |a, b| Ok(a.merge(b)),
        )
}
