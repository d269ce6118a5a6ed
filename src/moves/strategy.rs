//! Move strategy selection.

use std::fmt;
use std::str::FromStr;

use crate::error::PlacerError;

/// Window size used when a strategy is named without one.
pub const DEFAULT_WINDOW_FRACTION: f64 = 0.3;

/// The neighbourhood explored by the annealer.
///
/// Exactly one strategy is active per run. The windowed strategies carry a
/// `fraction` of the grid size: the range window around a cell extends
/// `round(fraction × cols)` columns and `round(fraction × rows)` rows to
/// each side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MoveStrategy {
    /// Swap with any cell or empty site.
    Plain,
    /// Swap with a site inside the range window.
    Windowed { fraction: f64 },
    /// Chain of windowed displacements.
    Ripple { fraction: f64 },
    /// Windowed swap whose partner steps into an adjacent empty site.
    Shuffle { fraction: f64 },
}

impl Default for MoveStrategy {
    fn default() -> Self {
        MoveStrategy::Windowed {
            fraction: DEFAULT_WINDOW_FRACTION,
        }
    }
}

impl MoveStrategy {
    /// Short name as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            MoveStrategy::Plain => "plain",
            MoveStrategy::Windowed { .. } => "windowed",
            MoveStrategy::Ripple { .. } => "ripple",
            MoveStrategy::Shuffle { .. } => "shuffle",
        }
    }

    /// Window fraction, or `None` for [`MoveStrategy::Plain`].
    pub fn window_fraction(&self) -> Option<f64> {
        match *self {
            MoveStrategy::Plain => None,
            MoveStrategy::Windowed { fraction }
            | MoveStrategy::Ripple { fraction }
            | MoveStrategy::Shuffle { fraction } => Some(fraction),
        }
    }

    /// Same strategy with another window fraction. No effect on `Plain`.
    pub fn with_fraction(self, fraction: f64) -> Self {
        match self {
            MoveStrategy::Plain => MoveStrategy::Plain,
            MoveStrategy::Windowed { .. } => MoveStrategy::Windowed { fraction },
            MoveStrategy::Ripple { .. } => MoveStrategy::Ripple { fraction },
            MoveStrategy::Shuffle { .. } => MoveStrategy::Shuffle { fraction },
        }
    }

    /// Checks that the window fraction lies in (0, 1].
    pub fn validate(&self) -> Result<(), PlacerError> {
        if let Some(fraction) = self.window_fraction() {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(PlacerError::invalid(
                    "window_fraction",
                    format!("must be in (0, 1], got {fraction}"),
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for MoveStrategy {
    type Err = PlacerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fraction = DEFAULT_WINDOW_FRACTION;
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(MoveStrategy::Plain),
            "windowed" | "window" | "range_window" => Ok(MoveStrategy::Windowed { fraction }),
            "ripple" => Ok(MoveStrategy::Ripple { fraction }),
            "shuffle" => Ok(MoveStrategy::Shuffle { fraction }),
            _ => Err(PlacerError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for MoveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window_fraction() {
            Some(fraction) => write!(f, "{} (window {fraction})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
