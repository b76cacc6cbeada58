// tests/draw_invariants_test.rs
use group_draw::draw::board::DrawBoard;
use group_draw::draw::engine::{run_trial, DrawConfig, TrialOutcome};
use group_draw::draw::roster::{CategoryId, ItemId, Roster, TIER_COUNT};
use group_draw::draw::strategy::DrawStrategy;
use group_draw::draw::world_cup::world_cup_2018;
use group_draw::rng::seed_rng_from_u64;
use proptest::prelude::*;

fn strategy_arb() -> impl Strategy<Value = DrawStrategy> {
    prop::sample::select(DrawStrategy::ALL.to_vec())
}

/// No bin holds more of a category than its quota, and the bin's remaining
/// quota accounts for exactly what it holds.
fn assert_quotas(board: &DrawBoard, roster: &Roster) {
    for (b, bin) in board.bins().iter().enumerate() {
        for (c, category) in roster.categories().iter().enumerate() {
            let held = bin
                .members()
                .filter(|&m| roster.category_of(m) == CategoryId(c))
                .count() as u32;
            assert!(
                held <= category.quota,
                "bin {} holds {} '{}' teams, quota {}",
                roster.bin_label(b),
                held,
                category.name,
                category.quota
            );
            assert_eq!(bin.remaining(CategoryId(c)) + held, category.quota);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn completed_trials_fill_every_slot(seed in any::<u64>(), strategy in strategy_arb()) {
        let roster = world_cup_2018().unwrap();
        let cfg = DrawConfig { strategy, ..Default::default() };
        let mut board = DrawBoard::new(&roster);
        let mut rng = seed_rng_from_u64(seed);

        let outcome = run_trial(&mut board, &roster, &cfg, 0, &mut rng).unwrap();
        if let TrialOutcome::Completed { .. } = outcome {
            prop_assert!(board.is_complete());
            prop_assert_eq!(board.placed_count(), roster.len());
            for bin in board.bins() {
                prop_assert_eq!(bin.filled(), TIER_COUNT);
                for tier in 0..TIER_COUNT {
                    let item = bin.slot(tier).unwrap();
                    prop_assert_eq!(roster.item(item).tier, tier);
                }
            }
            for id in 0..roster.len() {
                let placed_in = board
                    .bins()
                    .iter()
                    .filter(|b| b.members().any(|m| m == ItemId(id)))
                    .count();
                prop_assert_eq!(placed_in, 1);
                prop_assert!(board.bin_of(ItemId(id)).is_some());
            }
        } else {
            prop_assert!(strategy.discards_infeasible());
        }
        assert_quotas(&board, &roster);
    }

    #[test]
    fn retry_never_discards(seed in any::<u64>()) {
        let roster = world_cup_2018().unwrap();
        let cfg = DrawConfig::default();
        let mut board = DrawBoard::new(&roster);
        let mut rng = seed_rng_from_u64(seed);

        for trial in 0..5 {
            let outcome = run_trial(&mut board, &roster, &cfg, trial, &mut rng).unwrap();
            let completed = matches!(outcome, TrialOutcome::Completed { .. });
            prop_assert!(completed);
        }
    }

    #[test]
    fn host_stays_in_group_a(seed in any::<u64>(), strategy in strategy_arb()) {
        let roster = world_cup_2018().unwrap();
        let cfg = DrawConfig { strategy, ..Default::default() };
        let mut board = DrawBoard::new(&roster);
        let mut rng = seed_rng_from_u64(seed);

        run_trial(&mut board, &roster, &cfg, 0, &mut rng).unwrap();
        let russia = roster.item_id("Russia").unwrap();
        prop_assert_eq!(board.bin_of(russia), Some(0));
        prop_assert_eq!(board.bin(0).slot(0), Some(russia));
    }
}
