//! Property tests: placements stay bijective and the incremental cost
//! table stays equal to a full recomputation, for every move strategy.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_placer::anneal::{AnnealConfig, Annealer, ExitCriterion, MoveBudget, MoveOutcome};
use u_placer::cost::{CostFormula, CostModel};
use u_placer::moves::{MoveGenerator, MoveStrategy};
use u_placer::netlist::{Circuit, CircuitConfig, Net};
use u_placer::placement::{CandidateView, CellLocator, Placement};

fn strategy_of(index: usize, fraction: f64) -> MoveStrategy {
    match index % 4 {
        0 => MoveStrategy::Plain,
        1 => MoveStrategy::Windowed { fraction },
        2 => MoveStrategy::Ripple { fraction },
        _ => MoveStrategy::Shuffle { fraction },
    }
}

/// A valid circuit: grid of at least `cells` sites, nets of 1-4 cells.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1usize..6, 1usize..6, 0usize..4).prop_flat_map(|(rows, cols, spare)| {
        let sites = rows * cols;
        let cells = sites.saturating_sub(spare).max(1);
        prop::collection::vec(prop::collection::vec(0..cells, 1..5), 1..8).prop_map(move |nets| {
            let config = CircuitConfig {
                cell_count: cells,
                net_count: nets.len(),
                rows,
                cols,
            };
            let nets = nets.into_iter().map(Net::new).collect();
            Circuit::new("prop", config, nets).unwrap()
        })
    })
}

fn arb_formula() -> impl Strategy<Value = CostFormula> {
    (any::<bool>(), any::<bool>()).prop_map(|(span, track)| CostFormula::new(span, track))
}

proptest! {
    #[test]
    fn committed_moves_keep_placement_bijective(
        circuit in arb_circuit(),
        strategy in 0usize..4,
        fraction in 0.1f64..1.0,
        seed in any::<u64>(),
        steps in 1usize..60,
    ) {
        let cc = *circuit.config();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut placement = Placement::random(cc.rows, cc.cols, cc.cell_count, &mut rng).unwrap();
        let generator = MoveGenerator::new(strategy_of(strategy, fraction), cc.cols, cc.rows);

        for _ in 0..steps {
            let Some(mv) = generator.propose(&placement, &mut rng) else {
                continue;
            };
            prop_assert!(mv.is_valid_for(&placement));
            placement.relocate(mv.relocations());
            prop_assert!(placement.is_consistent());
            prop_assert_eq!(placement.cell_count(), cc.cell_count);
        }
    }

    #[test]
    fn delta_matches_full_recomputation(
        circuit in arb_circuit(),
        formula in arb_formula(),
        strategy in 0usize..4,
        seed in any::<u64>(),
        steps in 1usize..40,
    ) {
        let cc = *circuit.config();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut placement = Placement::random(cc.rows, cc.cols, cc.cell_count, &mut rng).unwrap();
        let mut costs = CostModel::new(formula, &circuit, &placement);
        let generator = MoveGenerator::new(strategy_of(strategy, 0.5), cc.cols, cc.rows);

        for _ in 0..steps {
            let Some(mv) = generator.propose(&placement, &mut rng) else {
                continue;
            };
            let candidate = {
                let view = CandidateView::new(&placement, mv.relocations());
                costs.delta_cost(&circuit, &mv.moved_cells(), &view)
            };
            let before = costs.total_cost();

            let mut after = placement.clone();
            after.relocate(mv.relocations());
            let full = CostModel::full_cost(formula, &circuit, &after);
            prop_assert_eq!(before + candidate.delta(), full.total());

            // Commit only every other candidate; a dropped one must leave
            // the table untouched.
            if rng.random_bool(0.5) {
                placement = after;
                costs.commit(&candidate);
            }
            prop_assert!(costs.matches(&circuit, &placement));
        }
    }

    #[test]
    fn candidate_view_agrees_with_applied_move(
        circuit in arb_circuit(),
        strategy in 0usize..4,
        seed in any::<u64>(),
    ) {
        let cc = *circuit.config();
        let mut rng = StdRng::seed_from_u64(seed);
        let placement = Placement::random(cc.rows, cc.cols, cc.cell_count, &mut rng).unwrap();
        let generator = MoveGenerator::new(strategy_of(strategy, 0.4), cc.cols, cc.rows);
        if let Some(mv) = generator.propose(&placement, &mut rng) {
            let mut after = placement.clone();
            after.relocate(mv.relocations());
            let view = CandidateView::new(&placement, mv.relocations());
            for cell in 0..cc.cell_count {
                prop_assert_eq!(view.locate(cell), after.locate(cell));
            }
        }
    }

    #[test]
    fn annealer_never_loses_consistency(
        circuit in arb_circuit(),
        strategy in 0usize..4,
        seed in any::<u64>(),
    ) {
        let config = AnnealConfig::default()
            .with_initial_temperature(5.0)
            .with_cooling_rate(0.5)
            .with_exit(ExitCriterion::Temperature { exit_temperature: 0.0 })
            .with_move_budget(MoveBudget::Fixed { moves: 20 })
            .with_strategy(strategy_of(strategy, 0.5))
            .with_seed(seed);
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        while annealer.no_exit() {
            for _ in 0..10 {
                if let MoveOutcome::Accepted { .. } = annealer.try_move() {
                    prop_assert!(annealer.check_consistency());
                }
            }
            annealer.step_level();
        }
        prop_assert!(annealer.check_consistency());
        prop_assert_eq!(annealer.temperature(), 0.0);
    }
}
