//! Outcomes, reports and the observer seam of the annealer.

use super::runner::Annealer;
use crate::cost::Cost;
use crate::moves::Move;

/// Lifecycle of an [`Annealer`].
///
/// Construction performs the setup (initial placement and full cost
/// computation), so an annealer is `Ready` as soon as it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Set up, no level run yet.
    Ready,
    /// Running levels at a positive temperature.
    Annealing,
    /// Temperature is zero; only improving moves are accepted.
    Frozen,
    /// The exit criterion, level cap or cancellation ended the run.
    Done,
}

/// Result of a single proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was committed.
    Accepted { mv: Move, delta: Cost },
    /// The move was evaluated and dropped.
    Rejected { delta: Cost },
    /// No perturbation exists for this placement.
    NoMove,
}

impl MoveOutcome {
    /// Cost delta of the proposal; 0 when no move was possible.
    pub fn delta(&self) -> Cost {
        match self {
            MoveOutcome::Accepted { delta, .. } | MoveOutcome::Rejected { delta } => *delta,
            MoveOutcome::NoMove => 0,
        }
    }

    /// Whether the move was committed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Accepted { .. })
    }
}

/// One sample of the cost trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    /// Move iteration, starting at 1.
    pub iteration: usize,
    /// Committed total cost after that move.
    pub cost: Cost,
}

/// Statistics of one completed temperature level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelReport {
    /// Level index, starting at 0.
    pub level: usize,
    /// Temperature the level ran at.
    pub temperature: f64,
    /// Proposals made.
    pub attempted: usize,
    /// Proposals committed.
    pub accepted: usize,
    /// Committed total cost at the end of the level.
    pub cost: Cost,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealSummary {
    /// Name of the annealed circuit.
    pub circuit: String,
    /// Cost of the initial random placement.
    pub initial_cost: Cost,
    /// Cost of the final placement.
    pub final_cost: Cost,
    /// Total proposals.
    pub iterations: usize,
    /// Temperature levels completed.
    pub levels: usize,
    /// Committed moves, improving or not.
    pub accepted_moves: usize,
    /// Committed moves with a negative delta.
    pub improving_moves: usize,
    /// Temperature when the run stopped.
    pub final_temperature: f64,
    /// Whether the run stopped on the level cap rather than the exit criterion.
    pub hit_level_limit: bool,
    /// Whether cancelled externally.
    pub cancelled: bool,
}

/// Side-effecting observer of a run: renderers, progress logs.
///
/// Callbacks run synchronously on the annealing thread and only ever get
/// shared access, so an observer can take a snapshot but cannot alter the
/// chain. The engine is paused for the duration of each call.
pub trait LevelObserver {
    /// Called after every committed move.
    fn on_commit(&mut self, _mv: &Move, _total_cost: Cost) {}

    /// Called after every completed level, once the temperature has cooled.
    fn on_level(&mut self, _annealer: &Annealer<'_>, _report: &LevelReport) {}
}

impl LevelObserver for () {}
