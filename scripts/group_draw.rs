// scripts/group_draw.rs
use chrono::Duration;
use group_draw::analytics::computus;
use group_draw::analytics::correlation;
use group_draw::analytics::extremes::{self, ReturnEstimate, PUBLISHED_ESTIMATES};
use group_draw::config;
use group_draw::draw::engine::{run_draw_simulation, DrawConfig};
use group_draw::draw::world_cup::world_cup_2018;
use group_draw::error::{DrawError, DrawResult};
use group_draw::logging;
use std::process::ExitCode;
use tracing::error;

const USAGE: &str = "\
usage:
  group-draw draw [--trials N] [--seed S] [--strategy naive|lookahead|retry]
                  [--team NAME] [--roster FILE] [--parallel] [--record]
                  [--csv FILE] [--json FILE]
  group-draw pancake [FIRST LAST]
  group-draw apollo
  group-draw storm-combine
  group-draw storm-gev FILE Z [--negate]
  group-draw storm-gpd FILE Z U RUN_HOURS [--negate]";

fn main() -> ExitCode {
    logging::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.first().map(String::as_str) {
        Some("draw") | None => run_draw(args.get(1..).unwrap_or_default()),
        Some("pancake") => run_pancake(&args[1..]),
        Some("apollo") => run_apollo(),
        Some("storm-combine") => run_storm_combine(),
        Some("storm-gev") => run_storm_gev(&args[1..]),
        Some("storm-gpd") => run_storm_gpd(&args[1..]),
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => Err(DrawError::InvalidConfiguration {
            field: "command".to_string(),
            reason: format!("unknown command '{}'\n{}", other, USAGE),
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> DrawResult<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| DrawError::InvalidConfiguration {
            field: flag.to_string(),
            reason: "missing value".to_string(),
        })
}

fn number<T: std::str::FromStr>(field: &str, text: &str) -> DrawResult<T> {
    text.parse().map_err(|_| DrawError::InvalidConfiguration {
        field: field.to_string(),
        reason: format!("'{}' is not a valid number", text),
    })
}

fn run_draw(args: &[String]) -> DrawResult<()> {
    let mut cfg = DrawConfig::default();
    let mut roster_path = None;
    let mut csv_path = None;
    let mut json_path = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--trials" => cfg.trials = number("trials", value(args, &mut i, "--trials")?)?,
            "--seed" => cfg.seed = number("seed", value(args, &mut i, "--seed")?)?,
            "--strategy" => cfg.strategy = value(args, &mut i, "--strategy")?.parse()?,
            "--team" => cfg.picked = Some(value(args, &mut i, "--team")?.to_string()),
            "--roster" => roster_path = Some(value(args, &mut i, "--roster")?.to_string()),
            "--csv" => csv_path = Some(value(args, &mut i, "--csv")?.to_string()),
            "--json" => json_path = Some(value(args, &mut i, "--json")?.to_string()),
            "--parallel" => cfg.parallel = true,
            "--record" => cfg.record_trials = true,
            other => {
                return Err(DrawError::InvalidConfiguration {
                    field: "draw".to_string(),
                    reason: format!("unknown option '{}'\n{}", other, USAGE),
                })
            }
        }
        i += 1;
    }

    let roster = match roster_path {
        Some(path) => config::load_roster(path)?,
        None => world_cup_2018()?,
    };

    let report = run_draw_simulation(&roster, &cfg)?;
    println!("Probability of sharing a group with {}", report.picked);
    println!("{}", report);

    if cfg.record_trials {
        for record in &report.trials {
            println!(
                "trial {:>6}: group {} -> {}",
                record.trial,
                record.bin,
                record.members.join(", ")
            );
        }
    }
    if let Some(path) = csv_path {
        report.write_csv(&path)?;
        println!("Results written to {}", path);
    }
    if let Some(path) = json_path {
        report.write_json(&path)?;
        println!("Results written to {}", path);
    }
    Ok(())
}

fn run_pancake(args: &[String]) -> DrawResult<()> {
    let (first, last) = match args {
        [] => (1900, 9999),
        [a, b] => (number("first", a)?, number("last", b)?),
        _ => {
            return Err(DrawError::InvalidConfiguration {
                field: "pancake".to_string(),
                reason: "expected no arguments or FIRST LAST".to_string(),
            })
        }
    };

    println!("Distribution of Pancake Days from {} to {}", first, last);
    for share in computus::shrove_tuesday_distribution(first, last)? {
        let bar = "#".repeat((share.percent * 4.0).round() as usize);
        println!("{} {:>6.2}% {}", share.label(), share.percent, bar);
    }
    Ok(())
}

fn run_apollo() -> DrawResult<()> {
    let reg = correlation::apollo_correlation()?;
    println!("Apollo mission vs. alphabetical astronaut order");
    println!("  correlation r : {:.4}", reg.r_value);
    println!("  slope         : {:.4} missions per astronaut", reg.slope);
    println!("  intercept     : {:.4}", reg.intercept);
    println!("  p-value       : {:.4}", reg.p_value);
    println!("  std error     : {:.4}", reg.std_err);
    Ok(())
}

fn run_storm_combine() -> DrawResult<()> {
    let estimates: Vec<ReturnEstimate> = PUBLISHED_ESTIMATES.iter().map(|&t| t.into()).collect();
    let combined = extremes::combine_estimates(&estimates)?;
    println!(
        "Combination: {:.1} ({:.1}, {:.1})",
        combined.value,
        combined.lower(),
        combined.upper()
    );
    Ok(())
}

fn split_negate(args: &[String]) -> (Vec<&str>, bool) {
    let negate = args.iter().any(|a| a == "--negate");
    let rest = args
        .iter()
        .filter(|a| a.as_str() != "--negate")
        .map(String::as_str)
        .collect();
    (rest, negate)
}

fn run_storm_gev(args: &[String]) -> DrawResult<()> {
    let (rest, negate) = split_negate(args);
    let [path, z] = rest[..] else {
        return Err(DrawError::InvalidConfiguration {
            field: "storm-gev".to_string(),
            reason: "expected FILE Z".to_string(),
        });
    };
    let z: f64 = number("z", z)?;

    let observations = extremes::read_index_csv(path, negate)?;
    let maxima = extremes::annual_maxima(&observations);
    let fit = extremes::fit_gumbel(&maxima)?;
    let estimate = extremes::bootstrap_gumbel_return_period(&fit, z, 1_000, 12345)?;

    println!(
        "Gumbel fit on {} annual maxima: loc {:.2}, scale {:.2}",
        fit.n, fit.loc, fit.scale
    );
    println!(
        "Return period of {}: 1-in-{:.1} years ({:.1}, {:.1})",
        z, estimate.value, estimate.lower, estimate.upper
    );
    Ok(())
}

fn run_storm_gpd(args: &[String]) -> DrawResult<()> {
    let (rest, negate) = split_negate(args);
    let [path, z, u, run] = rest[..] else {
        return Err(DrawError::InvalidConfiguration {
            field: "storm-gpd".to_string(),
            reason: "expected FILE Z U RUN_HOURS".to_string(),
        });
    };
    let z: f64 = number("z", z)?;
    let u: f64 = number("u", u)?;
    let run: i64 = number("run", run)?;

    let observations = extremes::read_index_csv(path, negate)?;
    let fit = extremes::fit_gpd_pot(&observations, u, Duration::hours(run))?;
    println!(
        "GPD fit on {} declustered peaks over {:.1} years: xi {:.3}, sigma {:.2}",
        fit.n_events, fit.years, fit.xi, fit.sigma
    );
    println!("Return period of {}: 1-in-{:.1} years", z, fit.return_period(z)?);
    Ok(())
}
