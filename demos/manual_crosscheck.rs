// demos/manual_crosscheck.rs
use group_draw::draw::engine::{run_draw_simulation, DrawConfig};
use group_draw::draw::world_cup::world_cup_2018;
use group_draw::logging;
use std::collections::BTreeMap;

fn main() {
    // GROUP_DRAW_LOG=debug also prints each trial as it is drawn.
    logging::init_tracing();

    println!("Manual cross-check: 10 recorded draws");
    println!("=====================================\n");

    let roster = world_cup_2018().expect("built-in roster is valid");
    let cfg = DrawConfig {
        trials: 10,
        seed: 2017,
        record_trials: true,
        ..Default::default()
    };
    let report = run_draw_simulation(&roster, &cfg).expect("valid configuration");

    let mut by_hand: BTreeMap<&str, u64> = BTreeMap::new();
    for record in &report.trials {
        println!("Trial {}: group {} = {}", record.trial, record.bin, record.members.join(", "));
        for member in &record.members {
            *by_hand.entry(member.as_str()).or_default() += 1;
        }
    }

    println!("\nTeam                 by hand   reported");
    for (name, count) in &by_hand {
        let reported = report.count_for(name).unwrap_or(0);
        let mark = if reported == *count { "ok" } else { "MISMATCH" };
        println!("{:<20} {:>7} {:>10}   {}", name, count, reported, mark);
    }

    println!("\n{}", report);
}
