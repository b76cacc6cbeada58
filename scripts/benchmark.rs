// scripts/benchmark.rs
use group_draw::draw::engine::{run_draw_simulation, DrawConfig};
use group_draw::draw::report::DrawReport;
use group_draw::draw::strategy::DrawStrategy;
use group_draw::draw::world_cup::world_cup_2018;
use group_draw::error::DrawResult;
use group_draw::logging;
use std::env;
use std::fs::File;
use std::io::{self, Write};

const TRIALS: usize = 20_000;
const SEED: u64 = 42;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    trials: usize,
    counted: usize,
    time_ms: f64,
    throughput_trials_per_sec: f64,
    tier_redraws: u64,
    picked_share: f64,
}

impl BenchmarkResult {
    fn from_report(name: String, report: &DrawReport) -> Self {
        Self {
            name,
            trials: report.requested_trials,
            counted: report.counted_trials,
            time_ms: report.elapsed_ms,
            throughput_trials_per_sec: report.requested_trials as f64 / (report.elapsed_ms / 1000.0),
            tier_redraws: report.tier_redraws,
            picked_share: report.percent_for("Spain").unwrap_or(0.0),
        }
    }
}

fn run_benchmarks() -> DrawResult<Vec<BenchmarkResult>> {
    let roster = world_cup_2018()?;
    let mut results = Vec::new();

    for strategy in DrawStrategy::ALL {
        for parallel in [false, true] {
            let cfg = DrawConfig {
                trials: TRIALS,
                seed: SEED,
                strategy,
                parallel,
                ..Default::default()
            };
            let mode = if parallel { "parallel" } else { "sequential" };
            println!("  {} ({})...", strategy, mode);
            let report = run_draw_simulation(&roster, &cfg)?;
            results.push(BenchmarkResult::from_report(
                format!("{} {}", strategy, mode),
                &report,
            ));
        }
    }
    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "benchmark,trials,counted,time_ms,trials_per_sec,tier_redraws,england_with_spain_pct"
    )?;
    for r in results {
        writeln!(
            file,
            "{},{},{},{:.2},{:.0},{},{:.3}",
            r.name,
            r.trials,
            r.counted,
            r.time_ms,
            r.throughput_trials_per_sec,
            r.tier_redraws,
            r.picked_share
        )?;
    }
    Ok(())
}

fn main() {
    logging::init_tracing_with_filter("warn");

    println!("group-draw Benchmark Suite");
    println!("==========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    println!("Running draw benchmarks ({} trials each)...", TRIALS);
    let results = match run_benchmarks() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("benchmark failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{:=<86}", "");
    println!(
        "{:<24} {:>8} {:>8} {:>12} {:>14} {:>8} {:>8}",
        "Benchmark", "Trials", "Counted", "Time (ms)", "Trials/sec", "Redraws", "Spain %"
    );
    println!("{:-<86}", "");
    for r in &results {
        println!(
            "{:<24} {:>8} {:>8} {:>12.2} {:>14.0} {:>8} {:>8.2}",
            r.name,
            r.trials,
            r.counted,
            r.time_ms,
            r.throughput_trials_per_sec,
            r.tier_redraws,
            r.picked_share
        );
    }
    println!("{:=<86}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&results, &system_info, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("\nCould not write {}: {}", filename, e),
    }
}
