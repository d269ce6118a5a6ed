//! Results log: a configuration header, one line per circuit, and the
//! average final cost.
//!
//! ```text
//! # u-placer results: benchmarks
//! # initial_temperature = 20
//! # ...
//! circuit	cost	iterations
//! cm138a	48	12345
//! ...
//! # average cost = 48
//! ```

use std::io::{self, Write};

use crate::anneal::{AnnealConfig, AnnealSummary};
use crate::cost::Cost;

/// Writes a results log to any sink.
pub struct ResultsLog<W: Write> {
    out: W,
    total_cost: Cost,
    circuits: usize,
}

impl<W: Write> ResultsLog<W> {
    /// Starts a log, writing the configuration header immediately.
    pub fn new(mut out: W, config: &AnnealConfig, label: &str) -> io::Result<Self> {
        write_header(&mut out, config, label)?;
        writeln!(out, "circuit\tcost\titerations")?;
        Ok(Self {
            out,
            total_cost: 0,
            circuits: 0,
        })
    }

    /// Appends the result line of one circuit.
    pub fn record(&mut self, summary: &AnnealSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}",
            summary.circuit, summary.final_cost, summary.iterations
        )?;
        self.total_cost += summary.final_cost;
        self.circuits += 1;
        Ok(())
    }

    /// Mean final cost over the recorded circuits, if any.
    pub fn average_cost(&self) -> Option<f64> {
        (self.circuits > 0).then(|| self.total_cost as f64 / self.circuits as f64)
    }

    /// Writes the trailer and hands back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(avg) = self.average_cost() {
            writeln!(self.out, "# average cost = {avg}")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes the `# key = value` header describing `config`.
pub fn write_header<W: Write>(out: &mut W, config: &AnnealConfig, label: &str) -> io::Result<()> {
    writeln!(out, "# u-placer results: {label}")?;
    writeln!(out, "# initial_temperature = {}", config.initial_temperature)?;
    writeln!(out, "# cooling_rate = {}", config.cooling_rate)?;
    writeln!(out, "# exit = {}", config.exit)?;
    writeln!(out, "# moves = {}", config.moves)?;
    writeln!(out, "# strategy = {}", config.strategy)?;
    writeln!(
        out,
        "# cost = inclusive_span {}, routing_track {}",
        config.cost.inclusive_span, config.cost.routing_track
    )?;
    writeln!(out, "# max_levels = {}", config.max_levels)?;
    match config.seed {
        Some(seed) => writeln!(out, "# seed = {seed}"),
        None => writeln!(out, "# seed = random"),
    }
}
