//! Annealing loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::{AnnealConfig, ExitCriterion};
use super::schedule::{cool, metropolis, FREEZE_THRESHOLD};
use super::types::{AnnealSummary, LevelObserver, LevelReport, MoveOutcome, Phase, TrendPoint};
use crate::cost::{Cost, CostModel};
use crate::error::{PlacerError, Result};
use crate::moves::MoveGenerator;
use crate::netlist::Circuit;
use crate::placement::{CandidateView, Placement};

/// Simulated annealing controller for one circuit.
///
/// Owns the placement, the committed cost table, the random source and the
/// schedule state. All mutation happens through [`try_move`](Self::try_move)
/// and [`step_level`](Self::step_level); everything else is read-only.
///
/// # Examples
///
/// ```
/// use u_placer::anneal::{AnnealConfig, Annealer, ExitCriterion, MoveBudget};
/// use u_placer::netlist::parse_circuit;
///
/// let circuit = parse_circuit("demo", "4 2 3 3\n2 0 1\n3 1 2 3\n").unwrap();
/// let config = AnnealConfig::default()
///     .with_exit(ExitCriterion::Temperature { exit_temperature: 0.0 })
///     .with_move_budget(MoveBudget::Fixed { moves: 20 })
///     .with_seed(7);
///
/// let mut annealer = Annealer::new(&circuit, config).unwrap();
/// let summary = annealer.run();
/// assert!(summary.final_cost <= summary.initial_cost + 10);
/// assert!(annealer.check_consistency());
/// ```
pub struct Annealer<'c> {
    circuit: &'c Circuit,
    config: AnnealConfig,
    generator: MoveGenerator,
    placement: Placement,
    costs: CostModel,
    rng: StdRng,
    moves_per_level: usize,
    initial_cost: Cost,
    movable: bool,

    phase: Phase,
    temperature: f64,
    iteration: usize,
    level: usize,
    accepted: usize,
    improving: usize,
    last_delta: Cost,
    no_improvement: usize,
    trend: Vec<TrendPoint>,
}

impl<'c> Annealer<'c> {
    /// Validates `config`, draws a random initial placement and costs it.
    pub fn new(circuit: &'c Circuit, config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        let cc = circuit.config();
        let placement = Placement::random(cc.rows, cc.cols, cc.cell_count, &mut rng)?;
        Self::setup(circuit, config, placement, rng)
    }

    /// Like [`new`](Self::new) but starting from a given placement.
    ///
    /// # Errors
    ///
    /// Fails if the placement does not match the circuit's grid and cell
    /// count, or if the configuration is invalid.
    pub fn with_placement(circuit: &'c Circuit, config: AnnealConfig, placement: Placement) -> Result<Self> {
        config.validate()?;
        let cc = circuit.config();
        if placement.rows() != cc.rows
            || placement.cols() != cc.cols
            || placement.cell_count() != cc.cell_count
        {
            return Err(PlacerError::invalid(
                "placement",
                format!(
                    "{} cells on {}x{} does not match circuit {} ({} cells on {}x{})",
                    placement.cell_count(),
                    placement.rows(),
                    placement.cols(),
                    circuit.name(),
                    cc.cell_count,
                    cc.rows,
                    cc.cols
                ),
            ));
        }
        let rng = create_rng(config.seed);
        Self::setup(circuit, config, placement, rng)
    }

    fn setup(circuit: &'c Circuit, config: AnnealConfig, placement: Placement, rng: StdRng) -> Result<Self> {
        let costs = CostModel::new(config.cost, circuit, &placement);
        let generator = MoveGenerator::new(config.strategy, placement.cols(), placement.rows());
        let movable = generator.can_move(&placement);
        if !movable && placement.rows() * placement.cols() > 1 {
            return Err(PlacerError::invalid(
                "fraction",
                format!(
                    "{} covers a single site of the {}x{} grid",
                    config.strategy,
                    placement.rows(),
                    placement.cols()
                ),
            ));
        }
        let moves_per_level = config.moves.moves_for(circuit.cell_count());
        let temperature = if config.initial_temperature < FREEZE_THRESHOLD {
            0.0
        } else {
            config.initial_temperature
        };
        let initial_cost = costs.total_cost();

        log::debug!(
            "{}: initial cost {initial_cost}, {moves_per_level} moves per level, strategy {}",
            circuit.name(),
            config.strategy
        );
        log::trace!("initial placement:\n{placement}");

        Ok(Self {
            circuit,
            config,
            generator,
            placement,
            costs,
            rng,
            moves_per_level,
            initial_cost,
            movable,
            phase: Phase::Ready,
            temperature,
            iteration: 0,
            level: 0,
            accepted: 0,
            improving: 0,
            last_delta: 0,
            no_improvement: 0,
            trend: Vec::new(),
        })
    }

    /// The circuit being placed.
    pub fn circuit(&self) -> &Circuit {
        self.circuit
    }

    /// The configuration this run was set up with.
    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// The committed placement.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The committed cost table.
    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    /// Committed total cost.
    pub fn total_cost(&self) -> Cost {
        self.costs.total_cost()
    }

    /// Current temperature; exactly 0 once frozen.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Proposals made so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Temperature levels completed so far.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Proposals per temperature level.
    pub fn moves_per_level(&self) -> usize {
        self.moves_per_level
    }

    /// Committed moves so far.
    pub fn accepted_moves(&self) -> usize {
        self.accepted
    }

    /// Delta of the most recent proposal.
    pub fn last_delta(&self) -> Cost {
        self.last_delta
    }

    /// Consecutive frozen proposals that made the cost strictly worse.
    pub fn no_improvement_streak(&self) -> usize {
        self.no_improvement
    }

    /// Whether any move exists on this grid at all.
    pub fn can_move(&self) -> bool {
        self.movable
    }

    /// `(iteration, cost)` after every proposal, when recording is enabled.
    pub fn trend(&self) -> &[TrendPoint] {
        &self.trend
    }

    /// Recomputes every net cost from scratch and checks it against the
    /// committed table, and checks the placement maps against each other.
    pub fn check_consistency(&self) -> bool {
        self.placement.is_consistent() && self.costs.matches(self.circuit, &self.placement)
    }

    /// Proposes, evaluates and accepts or rejects a single move.
    pub fn try_move(&mut self) -> MoveOutcome {
        self.try_move_observed(&mut ())
    }

    fn try_move_observed(&mut self, observer: &mut dyn LevelObserver) -> MoveOutcome {
        self.iteration += 1;

        let outcome = match self.generator.propose(&self.placement, &mut self.rng) {
            None => MoveOutcome::NoMove,
            Some(mv) => {
                let candidate = {
                    let view = CandidateView::new(&self.placement, mv.relocations());
                    self.costs.delta_cost(self.circuit, &mv.moved_cells(), &view)
                };
                let delta = candidate.delta();
                if metropolis(delta, self.temperature, &mut self.rng) {
                    self.placement.relocate(mv.relocations());
                    self.costs.commit(&candidate);
                    self.accepted += 1;
                    if delta < 0 {
                        self.improving += 1;
                    }
                    log::trace!("move {}: accepted {mv:?} (delta {delta})", self.iteration);
                    observer.on_commit(&mv, self.costs.total_cost());
                    MoveOutcome::Accepted { mv, delta }
                } else {
                    MoveOutcome::Rejected { delta }
                }
            }
        };

        self.last_delta = outcome.delta();
        if self.last_delta > 0 && self.temperature == 0.0 {
            self.no_improvement += 1;
        } else {
            self.no_improvement = 0;
        }

        if self.config.record_trend {
            self.trend.push(TrendPoint {
                iteration: self.iteration,
                cost: self.costs.total_cost(),
            });
        }

        outcome
    }

    /// Runs one temperature level, then cools.
    pub fn step_level(&mut self) -> LevelReport {
        self.step_level_observed(&mut ())
    }

    fn step_level_observed(&mut self, observer: &mut dyn LevelObserver) -> LevelReport {
        if self.phase == Phase::Ready {
            self.phase = if self.temperature == 0.0 {
                Phase::Frozen
            } else {
                Phase::Annealing
            };
        }

        let temperature = self.temperature;
        let mut accepted = 0;
        for _ in 0..self.moves_per_level {
            if self.try_move_observed(observer).is_accepted() {
                accepted += 1;
            }
        }

        let report = LevelReport {
            level: self.level,
            temperature,
            attempted: self.moves_per_level,
            accepted,
            cost: self.costs.total_cost(),
        };

        self.level += 1;
        self.temperature = cool(self.temperature, self.config.cooling_rate);
        if self.temperature == 0.0 && self.phase == Phase::Annealing {
            log::debug!("{}: frozen after {} levels", self.circuit.name(), self.level);
            self.phase = Phase::Frozen;
        }

        log::debug!(
            "level {}: T={:.4} accepted {}/{} cost {}",
            report.level,
            report.temperature,
            report.accepted,
            report.attempted,
            report.cost
        );
        report
    }

    /// Whether the exit criterion allows another level.
    pub fn no_exit(&self) -> bool {
        match self.config.exit {
            ExitCriterion::Temperature { exit_temperature } => self.temperature > exit_temperature,
            ExitCriterion::NoImprovement => self.last_delta < 0 || self.temperature != 0.0,
            ExitCriterion::MultipleNoImprovement { iterations } => self.no_improvement < iterations,
        }
    }

    /// Runs levels until the exit criterion or the level cap stops the run.
    ///
    /// Returns at once when no move exists on the grid.
    pub fn run(&mut self) -> AnnealSummary {
        self.run_observed(&mut (), None)
    }

    /// Runs with an optional cancellation flag, checked between levels.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> AnnealSummary {
        self.run_observed(&mut (), cancel)
    }

    /// Runs with an observer notified after every commit and every level.
    pub fn run_observed(
        &mut self,
        observer: &mut dyn LevelObserver,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AnnealSummary {
        let mut cancelled = false;
        let mut hit_level_limit = false;

        if !self.movable {
            log::warn!(
                "{}: no move exists on a {}x{} grid with {} cells",
                self.circuit.name(),
                self.placement.rows(),
                self.placement.cols(),
                self.placement.cell_count()
            );
        }

        while self.movable && self.no_exit() {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if self.config.max_levels > 0 && self.level >= self.config.max_levels {
                hit_level_limit = true;
                break;
            }

            let report = self.step_level_observed(observer);
            observer.on_level(self, &report);
        }

        self.phase = Phase::Done;
        log::info!(
            "{}: cost {} -> {} after {} levels, {} moves ({} accepted)",
            self.circuit.name(),
            self.initial_cost,
            self.total_cost(),
            self.level,
            self.iteration,
            self.accepted
        );
        log::trace!("final placement:\n{}", self.placement);

        AnnealSummary {
            circuit: self.circuit.name().to_string(),
            initial_cost: self.initial_cost,
            final_cost: self.total_cost(),
            iterations: self.iteration,
            levels: self.level,
            accepted_moves: self.accepted,
            improving_moves: self.improving,
            final_temperature: self.temperature,
            hit_level_limit,
            cancelled,
        }
    }
}

fn create_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::MoveBudget;
    use crate::moves::MoveStrategy;
    use crate::netlist::{parse_circuit, CircuitConfig};
    use crate::placement::Coord;

    /// Two 8-cell chains on a 5×5 grid.
    fn chain_circuit() -> Circuit {
        let mut text = String::from("16 14 5 5\n");
        for i in 0..7 {
            text.push_str(&format!("2 {} {}\n", i, i + 1));
            text.push_str(&format!("2 {} {}\n", i + 8, i + 9));
        }
        parse_circuit("chains", &text).unwrap()
    }

    fn temp_config(seed: u64) -> AnnealConfig {
        AnnealConfig::default()
            .with_exit(ExitCriterion::Temperature {
                exit_temperature: 0.0,
            })
            .with_move_budget(MoveBudget::Fixed { moves: 100 })
            .with_seed(seed)
    }

    #[test]
    fn test_run_improves_chains() {
        let circuit = chain_circuit();
        for strategy in [
            MoveStrategy::Plain,
            MoveStrategy::Windowed { fraction: 0.3 },
            MoveStrategy::Ripple { fraction: 0.3 },
            MoveStrategy::Shuffle { fraction: 0.3 },
        ] {
            let mut annealer = Annealer::new(&circuit, temp_config(42).with_strategy(strategy)).unwrap();
            let summary = annealer.run();
            assert!(
                summary.final_cost < summary.initial_cost,
                "{strategy}: {} -> {}",
                summary.initial_cost,
                summary.final_cost
            );
            assert_eq!(annealer.phase(), Phase::Done);
            assert!(annealer.check_consistency());
        }
    }

    #[test]
    fn test_cost_consistent_after_every_accepted_move() {
        let circuit = chain_circuit();
        let mut annealer = Annealer::new(&circuit, temp_config(5)).unwrap();
        for _ in 0..2000 {
            if annealer.try_move().is_accepted() {
                assert!(annealer.check_consistency());
            }
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let circuit = chain_circuit();
        let a = Annealer::new(&circuit, temp_config(99)).unwrap().run();
        let b = Annealer::new(&circuit, temp_config(99)).unwrap().run();
        assert_eq!(a, b);
    }

    #[test]
    fn test_temperature_schedule() {
        let circuit = chain_circuit();
        let mut annealer = Annealer::new(
            &circuit,
            temp_config(1).with_move_budget(MoveBudget::Fixed { moves: 1 }),
        )
        .unwrap();
        let mut prev = annealer.temperature();
        let mut frozen = false;
        for _ in 0..100 {
            annealer.step_level();
            let t = annealer.temperature();
            assert!(t <= prev);
            if frozen {
                assert_eq!(t, 0.0);
                assert_eq!(annealer.phase(), Phase::Frozen);
            }
            frozen |= t == 0.0;
            prev = t;
        }
        assert!(frozen);
    }

    #[test]
    fn test_frozen_level_accepts_only_improvements() {
        let circuit = chain_circuit();
        let config = temp_config(13).with_initial_temperature(0.0);
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        assert_eq!(annealer.temperature(), 0.0);
        for _ in 0..500 {
            let before = annealer.total_cost();
            match annealer.try_move() {
                MoveOutcome::Accepted { delta, .. } => {
                    assert!(delta < 0);
                    assert_eq!(annealer.total_cost(), before + delta);
                }
                _ => assert_eq!(annealer.total_cost(), before),
            }
        }
        assert_eq!(annealer.phase(), Phase::Ready);
        annealer.step_level();
        assert_eq!(annealer.phase(), Phase::Frozen);
    }

    #[test]
    fn test_trend_recorded_per_move() {
        let circuit = chain_circuit();
        let mut annealer = Annealer::new(&circuit, temp_config(3).with_max_levels(2)).unwrap();
        let summary = annealer.run();
        assert!(summary.hit_level_limit);
        assert_eq!(summary.levels, 2);
        assert_eq!(annealer.trend().len(), 200);
        assert_eq!(annealer.trend()[0].iteration, 1);
        assert_eq!(annealer.trend().last().unwrap().cost, summary.final_cost);
    }

    #[test]
    fn test_trend_disabled() {
        let circuit = chain_circuit();
        let mut annealer = Annealer::new(
            &circuit,
            temp_config(3).with_max_levels(1).with_record_trend(false),
        )
        .unwrap();
        annealer.run();
        assert!(annealer.trend().is_empty());
    }

    #[test]
    fn test_no_improvement_stops_once_frozen_and_not_improving() {
        let circuit = chain_circuit();
        let config = temp_config(8)
            .with_exit(ExitCriterion::NoImprovement)
            .with_max_levels(10_000);
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        let summary = annealer.run();
        assert!(!summary.hit_level_limit);
        assert_eq!(summary.final_temperature, 0.0);
        assert!(annealer.last_delta() >= 0);
    }

    /// Four cells in a row, chained 0-1-2-3 in order: the optimum up to
    /// mirroring, and no single swap reaches the mirror image.
    fn row_chain() -> (Circuit, Placement) {
        let circuit = parse_circuit("row", "4 3 1 4\n2 0 1\n2 1 2\n2 2 3\n").unwrap();
        let placement = Placement::from_coords(
            1,
            4,
            (0..4).map(|c| Coord::new(c, 0)).collect(),
        )
        .unwrap();
        (circuit, placement)
    }

    fn frozen_plain(iterations: usize) -> AnnealConfig {
        temp_config(6)
            .with_initial_temperature(0.0)
            .with_strategy(MoveStrategy::Plain)
            .with_exit(ExitCriterion::MultipleNoImprovement { iterations })
    }

    #[test]
    fn test_streak_counts_worsening_frozen_moves() {
        let (circuit, placement) = row_chain();
        let mut annealer = Annealer::with_placement(&circuit, frozen_plain(5), placement).unwrap();
        assert_eq!(annealer.temperature(), 0.0);

        for k in 1..=5 {
            assert!(annealer.no_exit());
            match annealer.try_move() {
                MoveOutcome::Rejected { delta } => assert!(delta > 0),
                other => panic!("expected a rejected worsening swap, got {other:?}"),
            }
            assert_eq!(annealer.no_improvement_streak(), k);
        }
        assert!(!annealer.no_exit());
        assert_eq!(annealer.total_cost(), 9);
    }

    #[test]
    fn test_streak_resets_above_zero_temperature() {
        let (circuit, placement) = row_chain();
        let config = frozen_plain(1).with_initial_temperature(5.0);
        let mut annealer = Annealer::with_placement(&circuit, config, placement).unwrap();
        for _ in 0..50 {
            annealer.try_move();
            assert_eq!(annealer.no_improvement_streak(), 0);
            assert!(annealer.no_exit());
        }
    }

    #[test]
    fn test_streak_follows_last_delta() {
        let circuit = chain_circuit();
        let config = temp_config(21)
            .with_initial_temperature(0.0)
            .with_exit(ExitCriterion::MultipleNoImprovement { iterations: 3 });
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        let mut prev = 0;
        for _ in 0..1000 {
            annealer.try_move();
            let streak = annealer.no_improvement_streak();
            if annealer.last_delta() > 0 {
                assert_eq!(streak, prev + 1);
            } else {
                assert_eq!(streak, 0);
            }
            assert_eq!(annealer.no_exit(), streak < 3);
            prev = streak;
        }
    }

    #[test]
    fn test_multiple_no_improvement_stops_run() {
        let (circuit, placement) = row_chain();
        let config = frozen_plain(3).with_move_budget(MoveBudget::Fixed { moves: 2 });
        let mut annealer = Annealer::with_placement(&circuit, config, placement).unwrap();
        let summary = annealer.run();
        // Level 1 leaves the streak at 2, level 2 at 4.
        assert!(!summary.hit_level_limit);
        assert_eq!(summary.levels, 2);
        assert_eq!(summary.iterations, 4);
        assert_eq!(summary.final_cost, 9);
    }

    #[test]
    fn test_single_site_grid_returns_at_once() {
        let circuit = parse_circuit("lone", "1 1 1 1\n1 0\n").unwrap();
        let config = AnnealConfig::default().with_max_levels(0).with_seed(1);
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        assert!(!annealer.can_move());
        let summary = annealer.run();
        assert_eq!(summary.levels, 0);
        assert_eq!(summary.iterations, 0);
        assert!(!summary.hit_level_limit);
        assert_eq!(annealer.phase(), Phase::Done);
        assert!(annealer.trend().is_empty());
    }

    #[test]
    fn test_single_site_window_rejected() {
        let circuit = parse_circuit("grid", "4 1 3 3\n2 0 1\n").unwrap();
        let config = AnnealConfig::default()
            .with_strategy(MoveStrategy::Windowed { fraction: 0.1 })
            .with_seed(1);
        assert!(matches!(
            Annealer::new(&circuit, config),
            Err(PlacerError::InvalidParameter { name: "fraction", .. })
        ));
    }

    #[test]
    fn test_zero_delta_plateau_stops_at_default_cap() {
        // Singleton nets: every move has delta 0, so no exit criterion
        // based on worsening moves ever fires.
        let circuit = parse_circuit("flat", "2 2 1 3\n1 0\n1 1\n").unwrap();
        let config = AnnealConfig::default().with_record_trend(false).with_seed(2);
        let mut annealer = Annealer::new(&circuit, config).unwrap();
        let summary = annealer.run();
        assert!(summary.hit_level_limit);
        assert_eq!(summary.levels, crate::anneal::DEFAULT_MAX_LEVELS);
        assert_eq!(summary.final_cost, summary.initial_cost);
    }

    #[test]
    fn test_cancel_before_start() {
        let circuit = chain_circuit();
        let mut annealer = Annealer::new(&circuit, temp_config(1)).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let summary = annealer.run_with_cancel(Some(cancel));
        assert!(summary.cancelled);
        assert_eq!(summary.levels, 0);
        assert_eq!(summary.final_cost, summary.initial_cost);
    }

    #[test]
    fn test_observer_sees_every_level_and_commit() {
        struct Counter {
            levels: usize,
            commits: usize,
        }
        impl LevelObserver for Counter {
            fn on_commit(&mut self, _mv: &crate::moves::Move, _cost: Cost) {
                self.commits += 1;
            }
            fn on_level(&mut self, annealer: &Annealer<'_>, report: &LevelReport) {
                self.levels += 1;
                assert_eq!(report.cost, annealer.total_cost());
                assert_eq!(annealer.level(), report.level + 1);
            }
        }

        let circuit = chain_circuit();
        let mut annealer = Annealer::new(&circuit, temp_config(4).with_max_levels(5)).unwrap();
        let mut counter = Counter {
            levels: 0,
            commits: 0,
        };
        let summary = annealer.run_observed(&mut counter, None);
        assert_eq!(counter.levels, 5);
        assert_eq!(counter.commits, summary.accepted_moves);
    }

    #[test]
    fn test_with_placement_checks_dimensions() {
        let circuit = Circuit::new(
            "tiny",
            CircuitConfig {
                cell_count: 2,
                net_count: 1,
                rows: 1,
                cols: 2,
            },
            vec![vec![0, 1].into()],
        )
        .unwrap();
        let wrong = Placement::from_coords(2, 2, vec![Coord::new(0, 0), Coord::new(1, 0)]).unwrap();
        assert!(Annealer::with_placement(&circuit, temp_config(0), wrong).is_err());
        let right = Placement::from_coords(1, 2, vec![Coord::new(0, 0), Coord::new(1, 0)]).unwrap();
        assert!(Annealer::with_placement(&circuit, temp_config(0), right).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected_at_setup() {
        let circuit = chain_circuit();
        let config = temp_config(0).with_cooling_rate(2.0);
        assert!(Annealer::new(&circuit, config).is_err());
    }
}
