//! Half-perimeter cost variants.

use super::Cost;
use crate::netlist::Net;
use crate::placement::CellLocator;

/// Selects one of the four half-perimeter variants.
///
/// - `inclusive_span`: spans are counted in sites (`max − min + 1`) rather
///   than in steps (`max − min`).
/// - `routing_track`: adds the vertical span once more, accounting for a
///   routing channel between every pair of rows.
///
/// Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostFormula {
    pub inclusive_span: bool,
    pub routing_track: bool,
}

impl Default for CostFormula {
    fn default() -> Self {
        Self {
            inclusive_span: true,
            routing_track: true,
        }
    }
}

impl CostFormula {
    /// Selects a variant from its two toggles.
    pub fn new(inclusive_span: bool, routing_track: bool) -> Self {
        Self {
            inclusive_span,
            routing_track,
        }
    }

    /// Bounding-box cost of `net` with cell positions taken from `cells`.
    ///
    /// A single-cell net costs 0, or 2 with `inclusive_span`.
    pub fn net_cost<L: CellLocator + ?Sized>(&self, net: &Net, cells: &L) -> Cost {
        let mut iter = net.cells().iter().map(|&c| cells.locate(c));
        let Some(first) = iter.next() else {
            return 0;
        };
        let (mut min_c, mut max_c, mut min_r, mut max_r) = (first.col, first.col, first.row, first.row);
        for c in iter {
            min_c = min_c.min(c.col);
            max_c = max_c.max(c.col);
            min_r = min_r.min(c.row);
            max_r = max_r.max(c.row);
        }

        let width = (max_c - min_c) as Cost;
        let height = (max_r - min_r) as Cost;
        let mut cost = width + height;
        if self.inclusive_span {
            cost += 2;
        }
        if self.routing_track {
            cost += height;
        }
        cost
    }
}
