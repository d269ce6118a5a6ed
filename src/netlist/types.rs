//! Circuit data model.

use crate::error::{PlacerError, Result};

/// Identifier of a cell, in `[0, cell_count)`.
pub type CellId = usize;

/// Dimensions of a circuit: how many cells and nets, and the grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitConfig {
    /// Number of cells to place.
    pub cell_count: usize,
    /// Number of nets.
    pub net_count: usize,
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
}

impl CircuitConfig {
    /// Total number of grid sites, `None` if `rows × cols` overflows.
    pub fn sites(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

/// A net: cells that must be electrically connected.
///
/// The order of cells carries no meaning for cost; it is kept so that
/// renderers can draw wires from the first (driver) cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Net {
    cells: Vec<CellId>,
}

impl Net {
    /// Builds a net from its cell ids.
    pub fn new(cells: Vec<CellId>) -> Self {
        Self { cells }
    }

    /// Cell ids in file order.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Number of cell entries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the net lists no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `cell` belongs to the net.
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }
}

impl From<Vec<CellId>> for Net {
    fn from(cells: Vec<CellId>) -> Self {
        Net::new(cells)
    }
}

/// A validated circuit instance.
///
/// # Examples
///
/// ```
/// use u_placer::netlist::{Circuit, CircuitConfig};
///
/// let config = CircuitConfig { cell_count: 4, net_count: 2, rows: 2, cols: 2 };
/// let circuit = Circuit::new("demo", config, vec![vec![0, 1].into(), vec![2, 3].into()]).unwrap();
/// assert_eq!(circuit.nets().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    config: CircuitConfig,
    nets: Vec<Net>,
    /// For each cell, the indices of the nets it belongs to.
    incidence: Vec<Vec<usize>>,
}

impl Circuit {
    /// Builds and validates a circuit.
    ///
    /// `config.net_count` must equal `nets.len()`, the grid must hold every
    /// cell, and every net must be non-empty with in-range cell ids.
    pub fn new(name: impl Into<String>, config: CircuitConfig, nets: Vec<Net>) -> Result<Self> {
        if config.cell_count == 0 {
            return Err(PlacerError::NoCells);
        }
        let sites = config
            .sites()
            .ok_or_else(|| PlacerError::grid_too_large(config.rows, config.cols))?;
        if sites < config.cell_count {
            return Err(PlacerError::InsufficientSites {
                rows: config.rows,
                cols: config.cols,
                cells: config.cell_count,
            });
        }
        if config.net_count != nets.len() {
            return Err(PlacerError::NetCountMismatch {
                declared: config.net_count,
                found: nets.len(),
            });
        }

        let mut incidence = vec![Vec::new(); config.cell_count];
        for (i, net) in nets.iter().enumerate() {
            if net.is_empty() {
                return Err(PlacerError::EmptyNet { net: i });
            }
            for &cell in net.cells() {
                if cell >= config.cell_count {
                    return Err(PlacerError::CellOutOfRange {
                        net: i,
                        cell,
                        cell_count: config.cell_count,
                    });
                }
                // A cell listed twice in one net still belongs to it once.
                if incidence[cell].last() != Some(&i) {
                    incidence[cell].push(i);
                }
            }
        }

        Ok(Self {
            name: name.into(),
            config,
            nets,
            incidence,
        })
    }

    /// Circuit name, the file stem when read from disk.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell, net and grid dimensions.
    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    /// Number of cells to place.
    pub fn cell_count(&self) -> usize {
        self.config.cell_count
    }

    /// All nets, indexed by net id.
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Indices of the nets that contain `cell`.
    pub fn nets_of(&self, cell: CellId) -> &[usize] {
        self.incidence.get(cell).map_or(&[][..], Vec::as_slice)
    }
}
