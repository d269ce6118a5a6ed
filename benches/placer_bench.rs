//! Criterion benchmarks for u-placer.
//!
//! Uses synthetic random netlists to measure move evaluation and full
//! annealing runs independent of any benchmark suite.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_placer::anneal::{AnnealConfig, Annealer, ExitCriterion, MoveBudget};
use u_placer::cost::{CostFormula, CostModel};
use u_placer::moves::{MoveGenerator, MoveStrategy};
use u_placer::netlist::{Circuit, CircuitConfig, Net};
use u_placer::placement::{CandidateView, Placement};

// ===========================================================================
// Synthetic netlist: `cells` cells, nets of 2-5 random cells
// ===========================================================================

fn synthetic_circuit(cells: usize, seed: u64) -> Circuit {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = ((cells as f64).sqrt() * 1.2).ceil() as usize;
    let net_count = cells;
    let nets: Vec<Net> = (0..net_count)
        .map(|_| {
            let k = rng.random_range(2..=5);
            Net::new((0..k).map(|_| rng.random_range(0..cells)).collect())
        })
        .collect();
    let config = CircuitConfig {
        cell_count: cells,
        net_count,
        rows: side,
        cols: side,
    };
    match Circuit::new(format!("synthetic{cells}"), config, nets) {
        Ok(circuit) => circuit,
        Err(e) => panic!("synthetic circuit is invalid: {e}"),
    }
}

fn strategies() -> [MoveStrategy; 4] {
    [
        MoveStrategy::Plain,
        MoveStrategy::Windowed { fraction: 0.3 },
        MoveStrategy::Ripple { fraction: 0.3 },
        MoveStrategy::Shuffle { fraction: 0.3 },
    ]
}

fn bench_delta_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta_cost");

    for &cells in &[100, 1000] {
        let circuit = synthetic_circuit(cells, 7);
        let mut rng = StdRng::seed_from_u64(42);
        let placement = Placement::random(
            circuit.config().rows,
            circuit.config().cols,
            cells,
            &mut rng,
        )
        .unwrap();
        let costs = CostModel::new(CostFormula::default(), &circuit, &placement);

        for strategy in strategies() {
            let generator = MoveGenerator::new(strategy, placement.cols(), placement.rows());
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), cells),
                &generator,
                |b, g| {
                    b.iter(|| {
                        let mv = g.propose(black_box(&placement), &mut rng).unwrap();
                        let view = CandidateView::new(&placement, mv.relocations());
                        black_box(costs.delta_cost(&circuit, &mv.moved_cells(), &view))
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_anneal(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal");
    group.sample_size(10);

    for &cells in &[50, 200] {
        let circuit = synthetic_circuit(cells, 11);
        for strategy in strategies() {
            let config = AnnealConfig::default()
                .with_exit(ExitCriterion::Temperature {
                    exit_temperature: 0.0,
                })
                .with_move_budget(MoveBudget::Fixed { moves: 500 })
                .with_strategy(strategy)
                .with_record_trend(false)
                .with_seed(42);
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), cells),
                &config,
                |b, cfg| {
                    b.iter(|| {
                        let mut annealer = Annealer::new(black_box(&circuit), cfg.clone()).unwrap();
                        black_box(annealer.run())
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_delta_cost, bench_anneal);
criterion_main!(benches);
