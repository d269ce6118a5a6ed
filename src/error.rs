//! Error types for circuit loading, configuration and batch runs.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PlacerError>;

/// Errors raised before or around an annealing run.
///
/// Every variant is a setup-time failure: once an [`Annealer`] exists, the
/// search itself cannot fail. Degenerate search states (a ripple chain that
/// finds no empty slot, a frozen temperature) are resolved by documented
/// fallbacks, not errors.
///
/// [`Annealer`]: crate::anneal::Annealer
#[derive(Debug, thiserror::Error)]
pub enum PlacerError {
    /// The grid has fewer sites than there are cells to place.
    #[error("grid {rows}x{cols} has {} sites, cannot hold {cells} cells", .rows * .cols)]
    InsufficientSites {
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
        /// Number of cells in the circuit.
        cells: usize,
    },

    /// The circuit declares no cells.
    #[error("circuit has no cells")]
    NoCells,

    /// A net lists no cells at all.
    #[error("net {net} is empty")]
    EmptyNet {
        /// Index of the offending net.
        net: usize,
    },

    /// A net references a cell id outside `[0, cell_count)`.
    #[error("net {net} references cell {cell}, but the circuit has {cell_count} cells")]
    CellOutOfRange {
        /// Index of the offending net.
        net: usize,
        /// The out-of-range cell id.
        cell: usize,
        /// Number of cells declared by the circuit.
        cell_count: usize,
    },

    /// The header net count disagrees with the nets actually present.
    #[error("header declares {declared} nets, found {found}")]
    NetCountMismatch {
        /// Net count from the header.
        declared: usize,
        /// Nets read from the body.
        found: usize,
    },

    /// An exit criterion name that is not one of the supported policies.
    #[error("unknown exit criterion `{0}` (expected temp, no_improvement or multiple_no_improvement)")]
    UnknownExitCriterion(String),

    /// A move strategy name that is not one of the supported strategies.
    #[error("unknown move strategy `{0}` (expected plain, windowed, ripple or shuffle)")]
    UnknownStrategy(String),

    /// A numeric parameter outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A malformed line in a netlist file.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// An I/O error while reading a circuit or writing results.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PlacerError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PlacerError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// A `rows × cols` grid whose site count does not fit in `usize`.
    pub(crate) fn grid_too_large(rows: usize, cols: usize) -> Self {
        Self::invalid("grid", format!("{rows}x{cols} grid is too large"))
    }

    /// An I/O failure at `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlacerError::Io {
            path: path.into(),
            source,
        }
    }
}
