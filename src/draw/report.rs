// src/draw/report.rs
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::draw::engine::{DrawConfig, DrawTally, TrialRecord};
use crate::draw::roster::{ItemId, Roster, TIER_COUNT};
use crate::draw::strategy::DrawStrategy;
use crate::error::DrawResult;
use crate::math_utils::percentage;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemShare {
    pub name: String,
    pub category: String,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub label: String,
    pub items: Vec<ItemShare>,
}

/// Outcome of a draw simulation, grouped by pot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawReport {
    pub picked: String,
    pub strategy: DrawStrategy,
    pub seed: u64,
    pub parallel: bool,
    pub requested_trials: usize,
    pub counted_trials: usize,
    pub discarded_trials: usize,
    pub tier_redraws: u64,
    pub trial_restarts: u64,
    pub elapsed_ms: f64,
    pub tiers: Vec<TierSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trials: Vec<TrialRecord>,
}

impl DrawReport {
    pub fn new(
        roster: &Roster,
        picked: ItemId,
        cfg: &DrawConfig,
        tally: DrawTally,
        elapsed: Duration,
    ) -> Self {
        let tiers = (0..TIER_COUNT)
            .map(|tier| TierSummary {
                label: format!("Pot {}", tier + 1),
                items: roster
                    .tier(tier)
                    .iter()
                    .map(|&id| {
                        let item = roster.item(id);
                        let count = tally.counts[id.0];
                        ItemShare {
                            name: item.name.clone(),
                            category: roster.categories()[item.category.0].name.clone(),
                            count,
                            percent: percentage(count, tally.counted),
                        }
                    })
                    .collect(),
            })
            .collect();

        DrawReport {
            picked: roster.item(picked).name.clone(),
            strategy: cfg.strategy,
            seed: cfg.seed,
            parallel: cfg.parallel,
            requested_trials: cfg.trials,
            counted_trials: tally.counted,
            discarded_trials: tally.discarded,
            tier_redraws: tally.tier_redraws,
            trial_restarts: tally.trial_restarts,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            tiers,
            trials: tally.records.unwrap_or_default(),
        }
    }

    pub fn share(&self, name: &str) -> Option<&ItemShare> {
        self.tiers
            .iter()
            .flat_map(|t| t.items.iter())
            .find(|s| s.name == name)
    }

    pub fn percent_for(&self, name: &str) -> Option<f64> {
        self.share(name).map(|s| s.percent)
    }

    pub fn count_for(&self, name: &str) -> Option<u64> {
        self.share(name).map(|s| s.count)
    }

    /// Write one `tier,item,category,count,percent` row per team.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "tier,item,category,count,percent")?;
        for tier in &self.tiers {
            for share in &tier.items {
                writeln!(
                    file,
                    "{},{},{},{},{:.4}",
                    tier.label, share.name, share.category, share.count, share.percent
                )?;
            }
        }
        file.flush()
    }

    pub fn to_json(&self) -> DrawResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> DrawResult<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

impl fmt::Display for DrawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tier in &self.tiers {
            writeln!(f, "{}:", tier.label)?;
            for share in &tier.items {
                writeln!(f, "    {} : {:.2}%", share.name, share.percent)?;
            }
        }
        if self.strategy.discards_infeasible() {
            writeln!(
                f,
                "Counted trials: {} of {} ({} discarded)",
                self.counted_trials, self.requested_trials, self.discarded_trials
            )?;
        } else {
            writeln!(f, "Counted trials: {}", self.counted_trials)?;
        }
        write!(f, "Elapsed: {:.3}s", self.elapsed_ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::world_cup::world_cup_2018;

    fn sample_report() -> DrawReport {
        let roster = world_cup_2018().unwrap();
        let picked = roster.item_id("England").unwrap();
        let cfg = DrawConfig {
            trials: 4,
            strategy: DrawStrategy::SequentialFirstFit,
            ..Default::default()
        };
        let mut tally = DrawTally::new(roster.len(), false);
        tally.counts[picked.0] = 3;
        tally.counted = 3;
        tally.discarded = 1;
        DrawReport::new(&roster, picked, &cfg, tally, Duration::from_millis(1500))
    }

    #[test]
    fn test_percentages_use_counted_trials() {
        let report = sample_report();
        assert_eq!(report.percent_for("England"), Some(100.0));
        assert_eq!(report.percent_for("Spain"), Some(0.0));
        assert_eq!(report.count_for("England"), Some(3));
        assert!(report.share("Atlantis").is_none());
    }

    #[test]
    fn test_console_format() {
        let text = report_text();
        assert!(text.starts_with("Pot 1:\n    Russia : 0.00%"));
        assert!(text.contains("    England : 100.00%"));
        assert!(text.contains("Counted trials: 3 of 4 (1 discarded)"));
        assert!(text.ends_with("Elapsed: 1.500s"));
    }

    fn report_text() -> String {
        sample_report().to_string()
    }

    #[test]
    fn test_json_has_every_team() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let tiers = value["tiers"].as_array().unwrap();
        assert_eq!(tiers.len(), 4);
        assert_eq!(value["strategy"], "sequential_first_fit");
        assert!(value.get("trials").is_none());
    }

    #[test]
    fn test_csv_output() {
        let path = std::env::temp_dir().join("group_draw_report_test.csv");
        sample_report().write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 33);
        assert_eq!(lines[0], "tier,item,category,count,percent");
        assert!(lines.contains(&"Pot 2,England,uefa,3,100.0000"));
    }
}
