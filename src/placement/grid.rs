//! The bidirectional site/cell map.

use std::fmt;

use rand::seq::index;
use rand::Rng;

use super::types::{CellLocator, Coord, Occupant, Relocation};
use crate::error::{PlacerError, Result};
use crate::netlist::CellId;

/// Assignment of every cell to a distinct grid site.
///
/// Sites are stored row-major. Both directions of the map are updated
/// together by [`Placement::relocate`], the only mutating operation after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    cols: usize,
    rows: usize,
    sites: Vec<Occupant>,
    cells: Vec<Coord>,
}

impl Placement {
    /// Places `cell_count` cells on distinct sites chosen uniformly at random.
    pub fn random<R: Rng>(rows: usize, cols: usize, cell_count: usize, rng: &mut R) -> Result<Self> {
        let total = rows
            .checked_mul(cols)
            .ok_or_else(|| PlacerError::grid_too_large(rows, cols))?;
        if total < cell_count {
            return Err(PlacerError::InsufficientSites {
                rows,
                cols,
                cells: cell_count,
            });
        }
        let coords = index::sample(rng, total, cell_count)
            .into_iter()
            .map(|i| Coord::new(i % cols, i / cols))
            .collect();
        Self::from_coords(rows, cols, coords)
    }

    /// Builds a placement from explicit coordinates, `coords[cell]` being the
    /// site of `cell`. Coordinates must be in bounds and pairwise distinct.
    pub fn from_coords(rows: usize, cols: usize, coords: Vec<Coord>) -> Result<Self> {
        let total = rows
            .checked_mul(cols)
            .ok_or_else(|| PlacerError::grid_too_large(rows, cols))?;
        if total < coords.len() {
            return Err(PlacerError::InsufficientSites {
                rows,
                cols,
                cells: coords.len(),
            });
        }
        let mut sites = vec![Occupant::Empty; total];
        for (cell, &c) in coords.iter().enumerate() {
            if c.col >= cols || c.row >= rows {
                return Err(PlacerError::invalid(
                    "placement",
                    format!("cell {cell} at {c} is outside the {rows}x{cols} grid"),
                ));
            }
            let slot = &mut sites[c.row * cols + c.col];
            if let Occupant::Cell(other) = *slot {
                return Err(PlacerError::invalid(
                    "placement",
                    format!("cells {other} and {cell} share site {c}"),
                ));
            }
            *slot = Occupant::Cell(cell);
        }
        Ok(Self {
            cols,
            rows,
            sites,
            cells: coords,
        })
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of placed cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of unoccupied sites. Constant for the lifetime of the placement.
    pub fn empty_count(&self) -> usize {
        self.sites.len() - self.cells.len()
    }

    /// Occupant of `coord`, or `None` if `coord` is off the grid.
    pub fn occupant(&self, coord: Coord) -> Option<Occupant> {
        if coord.col < self.cols && coord.row < self.rows {
            Some(self.sites[self.index(coord)])
        } else {
            None
        }
    }

    /// Whether `coord` is on the grid and unoccupied.
    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.occupant(coord) == Some(Occupant::Empty)
    }

    /// Site of `cell`, or `None` if the id is not part of this placement.
    pub fn coord_of(&self, cell: CellId) -> Option<Coord> {
        self.cells.get(cell).copied()
    }

    /// Cell coordinates indexed by cell id.
    pub fn coords(&self) -> &[Coord] {
        &self.cells
    }

    /// Iterates over all sites with their occupants, row by row.
    pub fn sites(&self) -> impl Iterator<Item = (Coord, Occupant)> + '_ {
        self.sites
            .iter()
            .enumerate()
            .map(move |(i, &o)| (Coord::new(i % self.cols, i / self.cols), o))
    }

    /// Uniformly random site of the grid.
    pub fn random_coord<R: Rng>(&self, rng: &mut R) -> Coord {
        Coord::new(rng.random_range(0..self.cols), rng.random_range(0..self.rows))
    }

    /// Samples sites uniformly until an empty one is found.
    ///
    /// Returns `None` when the grid is full.
    pub fn random_empty_coord<R: Rng>(&self, rng: &mut R) -> Option<Coord> {
        if self.empty_count() == 0 {
            return None;
        }
        loop {
            let c = self.random_coord(rng);
            if self.sites[self.index(c)].is_empty() {
                return Some(c);
            }
        }
    }

    /// Commits a set of relocations.
    ///
    /// The relocations must describe a permutation: destinations pairwise
    /// distinct, each one either vacated by a relocated cell or currently
    /// empty. Moves produced by [`MoveGenerator`] always satisfy this.
    ///
    /// [`MoveGenerator`]: crate::moves::MoveGenerator
    pub fn relocate(&mut self, relocations: &[Relocation]) {
        for r in relocations {
            let i = self.index(self.cells[r.cell]);
            self.sites[i] = Occupant::Empty;
        }
        for r in relocations {
            let i = self.index(r.to);
            debug_assert!(self.sites[i].is_empty(), "site {} double-booked", r.to);
            self.sites[i] = Occupant::Cell(r.cell);
            self.cells[r.cell] = r.to;
        }
    }

    /// Checks that both maps are exact inverses and that exactly one site
    /// is occupied per cell.
    pub fn is_consistent(&self) -> bool {
        let occupied = self.sites.iter().filter(|o| !o.is_empty()).count();
        occupied == self.cells.len()
            && self.cells.iter().enumerate().all(|(cell, &c)| {
                c.col < self.cols
                    && c.row < self.rows
                    && self.sites[self.index(c)] == Occupant::Cell(cell)
            })
    }

    fn index(&self, c: Coord) -> usize {
        c.row * self.cols + c.col
    }
}

impl CellLocator for Placement {
    fn locate(&self, cell: CellId) -> Coord {
        self.cells[cell]
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.cells.len().saturating_sub(1).to_string().len();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match self.sites[row * self.cols + col] {
                    Occupant::Cell(c) => write!(f, "{c:>width$}")?,
                    Occupant::Empty => write!(f, "{:>width$}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A pending move seen through the committed placement.
///
/// Relocated cells resolve to their destination, all others to their
/// committed site. Moves are a handful of cells, so a linear scan beats
/// any map.
#[derive(Debug, Clone, Copy)]
pub struct CandidateView<'a> {
    base: &'a Placement,
    relocations: &'a [Relocation],
}

impl<'a> CandidateView<'a> {
    /// Overlays `relocations` on `base` without touching it.
    pub fn new(base: &'a Placement, relocations: &'a [Relocation]) -> Self {
        Self { base, relocations }
    }
}

impl CellLocator for CandidateView<'_> {
    fn locate(&self, cell: CellId) -> Coord {
        self.relocations
            .iter()
            .find(|r| r.cell == cell)
            .map_or_else(|| self.base.locate(cell), |r| r.to)
    }
}
