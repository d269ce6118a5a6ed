//! Wirelength cost model.
//!
//! Each net is charged the half perimeter of the bounding box of its
//! cells, in one of four variants selected by [`CostFormula`]. The
//! committed per-net costs live in a [`CostTable`]; evaluating a move
//! produces [`CandidateCosts`] for just the nets the move touches, which
//! are written back only if the move is accepted.

mod formula;
mod model;

pub use formula::CostFormula;
pub use model::{CandidateCosts, CostModel, CostTable};

/// Cost unit: sums of integer grid spans.
pub type Cost = i64;
