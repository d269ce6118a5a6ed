//! Committed per-net costs and incremental move evaluation.

use super::formula::CostFormula;
use super::Cost;
use crate::netlist::{CellId, Circuit};
use crate::placement::CellLocator;

/// Committed cost of every net, with a running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    per_net: Vec<Cost>,
    total: Cost,
}

impl CostTable {
    fn from_costs(per_net: Vec<Cost>) -> Self {
        let total = per_net.iter().sum();
        Self { per_net, total }
    }

    /// Cost of net `net`.
    pub fn get(&self, net: usize) -> Cost {
        self.per_net[net]
    }

    /// Per-net costs indexed by net.
    pub fn as_slice(&self) -> &[Cost] {
        &self.per_net
    }

    /// Number of nets.
    pub fn len(&self) -> usize {
        self.per_net.len()
    }

    /// Whether the circuit has no nets.
    pub fn is_empty(&self) -> bool {
        self.per_net.is_empty()
    }

    /// The incrementally maintained total.
    pub fn total(&self) -> Cost {
        self.total
    }

    /// Sums the per-net entries from scratch, O(net count).
    pub fn recompute_total(&self) -> Cost {
        self.per_net.iter().sum()
    }
}

/// Speculative costs of the nets a pending move touches.
///
/// Nets absent from [`entries`](Self::entries) keep their committed cost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCosts {
    entries: Vec<(usize, Cost)>,
    delta: Cost,
}

impl CandidateCosts {
    /// Sum of `new − old` over the touched nets.
    pub fn delta(&self) -> Cost {
        self.delta
    }

    /// `(net index, new cost)` for every touched net.
    pub fn entries(&self) -> &[(usize, Cost)] {
        &self.entries
    }

    /// Cost of `net` under the candidate, falling back to `committed`.
    pub fn cost_of(&self, net: usize, committed: &CostTable) -> Cost {
        self.entries
            .iter()
            .find(|(n, _)| *n == net)
            .map_or_else(|| committed.get(net), |&(_, c)| c)
    }
}

/// Cost state for one placement run.
///
/// The formula is fixed at construction and used for every evaluation of
/// the run.
#[derive(Debug, Clone)]
pub struct CostModel {
    formula: CostFormula,
    table: CostTable,
}

impl CostModel {
    /// Computes the committed table for `cells` from scratch.
    pub fn new<L: CellLocator + ?Sized>(formula: CostFormula, circuit: &Circuit, cells: &L) -> Self {
        let table = Self::full_cost(formula, circuit, cells);
        Self { formula, table }
    }

    /// Costs every net of `circuit` from scratch.
    pub fn full_cost<L: CellLocator + ?Sized>(
        formula: CostFormula,
        circuit: &Circuit,
        cells: &L,
    ) -> CostTable {
        CostTable::from_costs(
            circuit
                .nets()
                .iter()
                .map(|net| formula.net_cost(net, cells))
                .collect(),
        )
    }

    /// The formula every net is costed with.
    pub fn formula(&self) -> CostFormula {
        self.formula
    }

    /// Committed per-net costs.
    pub fn table(&self) -> &CostTable {
        &self.table
    }

    /// Committed total cost.
    pub fn total_cost(&self) -> Cost {
        self.table.total()
    }

    /// Evaluates a candidate placement in which only `moved` cells differ
    /// from the committed one.
    ///
    /// Every net containing a moved cell is recosted under `candidate`;
    /// each such net is counted once even when several of its cells move.
    pub fn delta_cost<L: CellLocator + ?Sized>(
        &self,
        circuit: &Circuit,
        moved: &[CellId],
        candidate: &L,
    ) -> CandidateCosts {
        let mut touched: Vec<usize> = moved
            .iter()
            .flat_map(|&cell| circuit.nets_of(cell).iter().copied())
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let mut delta = 0;
        let entries = touched
            .into_iter()
            .map(|i| {
                let cost = self.formula.net_cost(&circuit.nets()[i], candidate);
                delta += cost - self.table.get(i);
                (i, cost)
            })
            .collect();

        CandidateCosts { entries, delta }
    }

    /// Writes accepted candidate costs into the committed table.
    pub fn commit(&mut self, candidate: &CandidateCosts) {
        for &(i, cost) in &candidate.entries {
            self.table.per_net[i] = cost;
        }
        self.table.total += candidate.delta;
    }

    /// Whether the committed table matches a from-scratch recomputation.
    pub fn matches<L: CellLocator + ?Sized>(&self, circuit: &Circuit, cells: &L) -> bool {
        let fresh = Self::full_cost(self.formula, circuit, cells);
        fresh == self.table && self.table.total() == self.table.recompute_total()
    }
}
