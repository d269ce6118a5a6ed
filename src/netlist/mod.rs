//! Circuits: cell counts, grid dimensions and nets.
//!
//! A [`Circuit`] is immutable for the lifetime of a placement run. It is
//! validated once, at construction, so the annealing core can rely on
//! every net referencing cells in `[0, cell_count)` and on the grid having
//! at least one site per cell.

mod parser;
mod types;

pub use parser::{parse_circuit, read_circuit};
pub use types::{CellId, Circuit, CircuitConfig, Net};
