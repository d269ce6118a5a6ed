//! Candidate move construction for the four strategies.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::strategy::MoveStrategy;
use crate::netlist::CellId;
use crate::placement::{Coord, Occupant, Placement, Relocation};

/// Failed samples allowed per ripple link before the chain closes on its origin.
pub const RIPPLE_RETRIES: usize = 10;

/// A candidate perturbation: every relocated cell with its new site.
///
/// Empty sites never appear; a cell moving into an empty site is a single
/// relocation, and the site it leaves simply becomes empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    relocations: Vec<Relocation>,
}

impl Move {
    /// Wraps a list of relocations.
    pub fn new(relocations: Vec<Relocation>) -> Self {
        Self { relocations }
    }

    /// Every moved cell with its destination.
    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Cells whose site changes.
    pub fn moved_cells(&self) -> Vec<CellId> {
        self.relocations.iter().map(|r| r.cell).collect()
    }

    /// Number of relocated cells.
    pub fn len(&self) -> usize {
        self.relocations.len()
    }

    /// Whether the move relocates nothing.
    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty()
    }

    /// Whether committing this move onto `placement` keeps it a bijection:
    /// cells and destinations pairwise distinct, and every destination
    /// either empty or vacated by one of the moved cells.
    pub fn is_valid_for(&self, placement: &Placement) -> bool {
        let cells: HashSet<CellId> = self.relocations.iter().map(|r| r.cell).collect();
        let dests: HashSet<Coord> = self.relocations.iter().map(|r| r.to).collect();
        if cells.len() != self.len() || dests.len() != self.len() {
            return false;
        }
        self.relocations.iter().all(|r| match placement.occupant(r.to) {
            Some(Occupant::Empty) => true,
            Some(Occupant::Cell(c)) => cells.contains(&c),
            None => false,
        })
    }
}

/// Inclusive rectangle of sites, already clipped to the grid.
#[derive(Debug, Clone, Copy)]
struct Window {
    col_lo: usize,
    col_hi: usize,
    row_lo: usize,
    row_hi: usize,
}

impl Window {
    fn around(center: Coord, half_width: usize, half_height: usize, cols: usize, rows: usize) -> Self {
        Self {
            col_lo: center.col.saturating_sub(half_width),
            col_hi: (center.col + half_width).min(cols - 1),
            row_lo: center.row.saturating_sub(half_height),
            row_hi: (center.row + half_height).min(rows - 1),
        }
    }

    fn area(&self) -> usize {
        (self.col_hi - self.col_lo + 1) * (self.row_hi - self.row_lo + 1)
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Coord {
        Coord::new(
            rng.random_range(self.col_lo..=self.col_hi),
            rng.random_range(self.row_lo..=self.row_hi),
        )
    }
}

/// Proposes moves under one [`MoveStrategy`].
///
/// Window half-sizes are resolved once from the grid dimensions.
#[derive(Debug, Clone)]
pub struct MoveGenerator {
    strategy: MoveStrategy,
    half_width: usize,
    half_height: usize,
}

impl MoveGenerator {
    /// Resolves the window of `strategy` for a `cols × rows` grid.
    pub fn new(strategy: MoveStrategy, cols: usize, rows: usize) -> Self {
        let fraction = strategy.window_fraction().unwrap_or(1.0);
        Self {
            strategy,
            half_width: (fraction * cols as f64).round() as usize,
            half_height: (fraction * rows as f64).round() as usize,
        }
    }

    /// The strategy moves are drawn from.
    pub fn strategy(&self) -> MoveStrategy {
        self.strategy
    }

    /// Window half-extents `(columns, rows)`.
    pub fn window_half_size(&self) -> (usize, usize) {
        (self.half_width, self.half_height)
    }

    /// Whether [`propose`](Self::propose) can return a move on `placement`.
    ///
    /// Depends only on the grid, the cell count and the window, none of
    /// which change during a run.
    pub fn can_move(&self, placement: &Placement) -> bool {
        match self.strategy {
            MoveStrategy::Plain => placement.cell_count() > 1 || placement.empty_count() > 0,
            _ => {
                (self.half_width > 0 && placement.cols() > 1)
                    || (self.half_height > 0 && placement.rows() > 1)
            }
        }
    }

    /// Proposes one move against the committed `placement`.
    ///
    /// Returns `None` only when no perturbation exists: a lone cell on a
    /// full grid, or a window that contains nothing but the chosen cell.
    pub fn propose<R: Rng>(&self, placement: &Placement, rng: &mut R) -> Option<Move> {
        let n = placement.cell_count();
        if n == 0 {
            return None;
        }
        let c1 = rng.random_range(0..n);
        let p1 = placement.coord_of(c1)?;

        let mv = match self.strategy {
            MoveStrategy::Plain => self.plain(placement, c1, p1, rng)?,
            MoveStrategy::Windowed { .. } => {
                let p2 = self.window_partner(placement, p1, rng)?;
                swap(placement, c1, p1, p2)
            }
            MoveStrategy::Ripple { .. } => {
                let p2 = self.window_partner(placement, p1, rng)?;
                match placement.occupant(p2) {
                    Some(Occupant::Cell(c2)) => self.ripple(placement, c1, p1, c2, p2, rng),
                    _ => swap(placement, c1, p1, p2),
                }
            }
            MoveStrategy::Shuffle { .. } => {
                let p2 = self.window_partner(placement, p1, rng)?;
                match placement.occupant(p2) {
                    Some(Occupant::Cell(c2)) => shuffle(placement, c1, p1, c2, p2, rng),
                    _ => swap(placement, c1, p1, p2),
                }
            }
        };

        debug_assert!(mv.is_valid_for(placement), "invalid move {mv:?}");
        Some(mv)
    }

    /// Partner drawn uniformly from the other cells plus one "empty site"
    /// choice, offered only when the grid has empty sites.
    fn plain<R: Rng>(&self, placement: &Placement, c1: CellId, p1: Coord, rng: &mut R) -> Option<Move> {
        let others = placement.cell_count() - 1;
        let has_empty = placement.empty_count() > 0;
        let choices = others + usize::from(has_empty);
        if choices == 0 {
            return None;
        }
        let k = rng.random_range(0..choices);
        let p2 = if k == others {
            placement.random_empty_coord(rng)?
        } else {
            let c2 = if k < c1 { k } else { k + 1 };
            placement.coord_of(c2)?
        };
        Some(swap(placement, c1, p1, p2))
    }

    fn window(&self, center: Coord, placement: &Placement) -> Window {
        Window::around(
            center,
            self.half_width,
            self.half_height,
            placement.cols(),
            placement.rows(),
        )
    }

    /// Samples the range window around `p1` until a different site comes up.
    fn window_partner<R: Rng>(&self, placement: &Placement, p1: Coord, rng: &mut R) -> Option<Coord> {
        let window = self.window(p1, placement);
        if window.area() < 2 {
            return None;
        }
        loop {
            let p2 = window.sample(rng);
            if p2 != p1 {
                return Some(p2);
            }
        }
    }

    /// Builds a displacement chain starting `c1 → p2`, `c2 → …`.
    ///
    /// Each new link is sampled in the window around the previous one and
    /// must not revisit a site already in the chain. The chain stops at the
    /// first empty site; if a link cannot be placed within
    /// [`RIPPLE_RETRIES`] samples, the last cell goes to `p1` instead,
    /// closing the cycle.
    fn ripple<R: Rng>(
        &self,
        placement: &Placement,
        c1: CellId,
        p1: Coord,
        c2: CellId,
        p2: Coord,
        rng: &mut R,
    ) -> Move {
        let mut cells = vec![c1, c2];
        let mut sites = vec![p1, p2];
        let mut visited: HashSet<Coord> = sites.iter().copied().collect();

        let terminus = loop {
            let prev = sites[sites.len() - 1];
            let window = self.window(prev, placement);
            let next = (0..RIPPLE_RETRIES)
                .map(|_| window.sample(rng))
                .find(|q| !visited.contains(q));
            let Some(q) = next else {
                break p1;
            };
            match placement.occupant(q) {
                Some(Occupant::Cell(c)) => {
                    cells.push(c);
                    sites.push(q);
                    visited.insert(q);
                }
                _ => break q,
            }
        };

        let relocations = cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| Relocation::new(cell, sites.get(i + 1).copied().unwrap_or(terminus)))
            .collect();
        Move::new(relocations)
    }
}

/// `c1` takes `p2`; whoever was on `p2` takes `p1`.
fn swap(placement: &Placement, c1: CellId, p1: Coord, p2: Coord) -> Move {
    match placement.occupant(p2) {
        Some(Occupant::Cell(c2)) => Move::new(vec![Relocation::new(c1, p2), Relocation::new(c2, p1)]),
        _ => Move::new(vec![Relocation::new(c1, p2)]),
    }
}

/// `c1` takes `p2`; `c2` steps into a random empty neighbour of `p2`, or
/// into `p1` when it has none.
fn shuffle<R: Rng>(
    placement: &Placement,
    c1: CellId,
    p1: Coord,
    c2: CellId,
    p2: Coord,
    rng: &mut R,
) -> Move {
    let mut steps: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
    steps.shuffle(rng);
    let dest = steps
        .iter()
        .filter_map(|&(dc, dr)| p2.offset(dc, dr, placement.cols(), placement.rows()))
        .find(|&q| placement.is_empty_at(q))
        .unwrap_or(p1);
    Move::new(vec![Relocation::new(c1, p2), Relocation::new(c2, dest)])
}
