//! Grid placement by simulated annealing.
//!
//! Places the cells of a circuit on a `rows × cols` grid so as to minimize
//! total half-perimeter wirelength:
//!
//! - **Netlist** ([`netlist`]): circuits, nets and the plain-text reader.
//! - **Placement** ([`placement`]): the bidirectional site/cell map.
//! - **Cost** ([`cost`]): four half-perimeter variants, evaluated
//!   incrementally over the nets a move touches.
//! - **Moves** ([`moves`]): plain swaps, range-windowed swaps, ripple
//!   chains and shuffles.
//! - **Annealing** ([`anneal`]): Metropolis acceptance, geometric cooling
//!   with a freeze snap to zero, and three exit criteria.
//! - **Batch** ([`batch`], [`report`]): multi-circuit runs and results logs.
//!
//! # Example
//!
//! ```
//! use u_placer::anneal::{AnnealConfig, Annealer};
//! use u_placer::netlist::parse_circuit;
//!
//! let circuit = parse_circuit("pair", "4 2 2 3\n2 0 1\n2 2 3\n").unwrap();
//! let config = AnnealConfig::default().with_max_levels(50).with_seed(1);
//! let mut annealer = Annealer::new(&circuit, config).unwrap();
//! let summary = annealer.run();
//! println!("{} -> {}", summary.initial_cost, summary.final_cost);
//! ```

pub mod anneal;
pub mod batch;
pub mod cost;
pub mod error;
pub mod moves;
pub mod netlist;
pub mod placement;
pub mod report;

pub use error::{PlacerError, Result};
