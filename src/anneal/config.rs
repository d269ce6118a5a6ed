//! Annealing schedule configuration.

use std::fmt;
use std::str::FromStr;

use crate::cost::CostFormula;
use crate::error::PlacerError;
use crate::moves::MoveStrategy;

/// When the annealer stops, checked once after every temperature level.
///
/// The two improvement-based criteria look at the last move of the level
/// only, not at the level as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ExitCriterion {
    /// Continue while the temperature is above `exit_temperature`.
    #[cfg_attr(feature = "serde", serde(rename = "temp"))]
    Temperature { exit_temperature: f64 },

    /// Continue while the last move improved the cost or the temperature
    /// is not yet zero.
    NoImprovement,

    /// Continue until `iterations` consecutive frozen moves have all made
    /// the cost strictly worse.
    ///
    /// The counter grows on every move with a positive delta at
    /// temperature zero and resets on any other move.
    MultipleNoImprovement { iterations: usize },
}

impl Default for ExitCriterion {
    fn default() -> Self {
        ExitCriterion::MultipleNoImprovement { iterations: 20 }
    }
}

impl ExitCriterion {
    /// Short name as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            ExitCriterion::Temperature { .. } => "temp",
            ExitCriterion::NoImprovement => "no_improvement",
            ExitCriterion::MultipleNoImprovement { .. } => "multiple_no_improvement",
        }
    }
}

impl FromStr for ExitCriterion {
    type Err = PlacerError;

    /// Parses a criterion name with default parameters
    /// (exit temperature 0, 20 iterations).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "temp" | "temperature" => Ok(ExitCriterion::Temperature {
                exit_temperature: 0.0,
            }),
            "no_improvement" => Ok(ExitCriterion::NoImprovement),
            "multiple_no_improvement" => Ok(ExitCriterion::MultipleNoImprovement { iterations: 20 }),
            _ => Err(PlacerError::UnknownExitCriterion(s.to_string())),
        }
    }
}

impl fmt::Display for ExitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCriterion::Temperature { exit_temperature } => {
                write!(f, "temp (exit temperature {exit_temperature})")
            }
            ExitCriterion::NoImprovement => f.write_str("no_improvement"),
            ExitCriterion::MultipleNoImprovement { iterations } => {
                write!(f, "multiple_no_improvement ({iterations} iterations)")
            }
        }
    }
}

/// Number of proposals per temperature level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MoveBudget {
    /// A constant number of moves.
    Fixed { moves: usize },
    /// `round(k × cells^(4/3))` moves, at least one.
    Dynamic { k: f64 },
}

impl Default for MoveBudget {
    fn default() -> Self {
        MoveBudget::Dynamic { k: 1.0 }
    }
}

impl MoveBudget {
    /// Moves per level for a circuit of `cell_count` cells.
    pub fn moves_for(&self, cell_count: usize) -> usize {
        match *self {
            MoveBudget::Fixed { moves } => moves,
            MoveBudget::Dynamic { k } => {
                let n = (k * (cell_count as f64).powf(4.0 / 3.0)).round() as usize;
                n.max(1)
            }
        }
    }
}

impl fmt::Display for MoveBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveBudget::Fixed { moves } => write!(f, "fixed {moves}"),
            MoveBudget::Dynamic { k } => write!(f, "dynamic k={k} (k*N^(4/3))"),
        }
    }
}

/// Default level cap.
///
/// With the default schedule (20, cooling 0.9) the temperature reaches zero
/// after about 50 levels, so the cap leaves hundreds of frozen levels for
/// the exit criterion to fire.
pub const DEFAULT_MAX_LEVELS: usize = 1_000;

/// Configuration of one annealing run.
///
/// Built once and passed by value to the [`Annealer`]; nothing in the
/// engine reads settings from anywhere else.
///
/// # Examples
///
/// ```
/// use u_placer::anneal::{AnnealConfig, ExitCriterion, MoveBudget};
/// use u_placer::moves::MoveStrategy;
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(50.0)
///     .with_cooling_rate(0.95)
///     .with_exit(ExitCriterion::Temperature { exit_temperature: 0.0 })
///     .with_move_budget(MoveBudget::Fixed { moves: 200 })
///     .with_strategy(MoveStrategy::Ripple { fraction: 0.2 })
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`Annealer`]: super::Annealer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnealConfig {
    /// Starting temperature.
    pub initial_temperature: f64,

    /// Geometric cooling factor in (0, 1).
    pub cooling_rate: f64,

    /// Termination policy.
    pub exit: ExitCriterion,

    /// Proposals per temperature level.
    pub moves: MoveBudget,

    /// Move neighbourhood.
    pub strategy: MoveStrategy,

    /// Wirelength formula variant.
    pub cost: CostFormula,

    /// Hard cap on temperature levels, [`DEFAULT_MAX_LEVELS`] unless set.
    /// 0 = no limit.
    ///
    /// The improvement-based exit criteria only look at the last move of a
    /// level, so on a plateau of zero-delta moves they may never fire.
    pub max_levels: usize,

    /// Record `(iteration, cost)` after every move.
    pub record_trend: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 20.0,
            cooling_rate: 0.9,
            exit: ExitCriterion::default(),
            moves: MoveBudget::default(),
            strategy: MoveStrategy::default(),
            cost: CostFormula::default(),
            max_levels: DEFAULT_MAX_LEVELS,
            record_trend: true,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_exit(mut self, exit: ExitCriterion) -> Self {
        self.exit = exit;
        self
    }

    pub fn with_move_budget(mut self, moves: MoveBudget) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_strategy(mut self, strategy: MoveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cost(mut self, cost: CostFormula) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_max_levels(mut self, n: usize) -> Self {
        self.max_levels = n;
        self
    }

    pub fn with_record_trend(mut self, record: bool) -> Self {
        self.record_trend = record;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), PlacerError> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature >= 0.0) {
            return Err(PlacerError::invalid(
                "initial_temperature",
                format!("must be finite and non-negative, got {}", self.initial_temperature),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(PlacerError::invalid(
                "cooling_rate",
                format!("must be in (0, 1), got {}", self.cooling_rate),
            ));
        }
        match self.exit {
            ExitCriterion::Temperature { exit_temperature } => {
                if !(exit_temperature.is_finite() && exit_temperature >= 0.0) {
                    return Err(PlacerError::invalid(
                        "exit_temperature",
                        format!("must be finite and non-negative, got {exit_temperature}"),
                    ));
                }
            }
            ExitCriterion::MultipleNoImprovement { iterations } => {
                if iterations == 0 {
                    return Err(PlacerError::invalid("iterations", "must be at least 1"));
                }
            }
            ExitCriterion::NoImprovement => {}
        }
        match self.moves {
            MoveBudget::Fixed { moves } => {
                if moves == 0 {
                    return Err(PlacerError::invalid("moves", "must be at least 1"));
                }
            }
            MoveBudget::Dynamic { k } => {
                if !(k > 0.0 && k.is_finite()) {
                    return Err(PlacerError::invalid("k", format!("must be positive, got {k}")));
                }
            }
        }
        self.strategy.validate()
    }
}
