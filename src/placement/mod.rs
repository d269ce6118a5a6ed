//! Placement state: which cell sits on which grid site.
//!
//! [`Placement`] keeps two maps in lockstep, site → [`Occupant`] and
//! cell → [`Coord`]. Moves never create or destroy cells, they only permute
//! coordinates, so the occupied set always has exactly one site per cell.
//!
//! The cost model never reads a placement directly; it goes through the
//! [`CellLocator`] trait, which is also implemented by [`CandidateView`], a
//! zero-copy overlay of a pending move on top of the committed placement.

mod grid;
mod types;

pub use grid::{CandidateView, Placement};
pub use types::{CellLocator, Coord, Occupant, Relocation};
