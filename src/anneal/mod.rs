//! Annealing controller.
//!
//! [`Annealer`] drives one sequential Markov chain over a [`Placement`]:
//! propose a move, evaluate its cost delta, apply the Metropolis test,
//! commit or drop, and after `moves_per_level` proposals cool the
//! temperature and ask the exit criterion whether to go on.
//!
//! Temperature decays geometrically and snaps to exactly zero once it
//! falls below [`FREEZE_THRESHOLD`]; from then on only strictly improving
//! moves are accepted.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Sechen & Sangiovanni-Vincentelli (1985), "The TimberWolf Placement and
//!   Routing Package" (moves per temperature proportional to `N^(4/3)`)
//!
//! [`Placement`]: crate::placement::Placement

mod config;
mod runner;
mod schedule;
mod types;

pub use config::{AnnealConfig, ExitCriterion, MoveBudget, DEFAULT_MAX_LEVELS};
pub use runner::Annealer;
pub use schedule::{cool, metropolis, FREEZE_THRESHOLD};
pub use types::{AnnealSummary, LevelObserver, LevelReport, MoveOutcome, Phase, TrendPoint};
