//! Grid coordinates and site occupants.

use std::fmt;

use crate::netlist::CellId;

/// A grid site, `col` in `[0, cols)` and `row` in `[0, rows)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    /// Site at column `col`, row `row`.
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Offsets this coordinate, returning `None` when the result would be
    /// negative or fall outside a `cols × rows` grid.
    pub fn offset(self, dc: isize, dr: isize, cols: usize, rows: usize) -> Option<Coord> {
        let col = self.col.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        (col < cols && row < rows).then_some(Coord { col, row })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// What a grid site holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Empty,
    Cell(CellId),
}

impl Occupant {
    /// The occupying cell, if any.
    pub fn cell(self) -> Option<CellId> {
        match self {
            Occupant::Cell(c) => Some(c),
            Occupant::Empty => None,
        }
    }

    /// Whether no cell occupies the site.
    pub fn is_empty(self) -> bool {
        matches!(self, Occupant::Empty)
    }
}

/// One entry of a move: `cell` goes to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub cell: CellId,
    pub to: Coord,
}

impl Relocation {
    /// Moves `cell` to `to`.
    pub const fn new(cell: CellId, to: Coord) -> Self {
        Self { cell, to }
    }
}

/// Resolves a cell to its grid coordinate.
///
/// Implementors must return a coordinate for every cell of the circuit;
/// the cost model relies on this and does not check it.
pub trait CellLocator {
    fn locate(&self, cell: CellId) -> Coord;
}
