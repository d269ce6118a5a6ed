//! Move generation.
//!
//! A [`MoveGenerator`] proposes one perturbation of the committed placement
//! per call, as a [`Move`]: the list of cells that change site and where
//! they go. Proposing never mutates the placement; the annealer commits the
//! move only if it is accepted.
//!
//! Four neighbourhoods are available through [`MoveStrategy`]:
//!
//! - **Plain**: swap a random cell with any other cell or an empty site.
//! - **Windowed**: the partner is drawn from a range window around the cell.
//! - **Ripple**: a chain of windowed displacements that ends on an empty
//!   site, or closes back on the first cell.
//! - **Shuffle**: the displaced partner steps aside into an empty
//!   neighbouring site when one exists.

mod generator;
mod strategy;

pub use generator::{Move, MoveGenerator, RIPPLE_RETRIES};
pub use strategy::{MoveStrategy, DEFAULT_WINDOW_FRACTION};
