//! Multi-circuit runs.
//!
//! Each circuit gets its own annealer, random source and placement; with
//! the `parallel` feature, circuits are annealed concurrently with rayon.
//! The search inside one circuit stays sequential.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::anneal::{AnnealConfig, AnnealSummary, Annealer};
use crate::error::{PlacerError, Result};
use crate::netlist::{read_circuit, Circuit};
use crate::report::ResultsLog;

/// Circuit files (`*.txt`) in `dir`, sorted by name.
pub fn circuit_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| PlacerError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PlacerError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every circuit of `paths`, failing on the first invalid one.
pub fn load_circuits(paths: &[PathBuf]) -> Result<Vec<Circuit>> {
    paths.iter().map(read_circuit).collect()
}

/// Anneals every circuit with `config`.
///
/// With a seed set, circuit `i` is seeded with `seed + i`, so a batch is
/// reproducible and its circuits draw independent streams. Summaries come
/// back in the order of `circuits`.
pub fn run_batch(circuits: &[Circuit], config: &AnnealConfig) -> Result<Vec<AnnealSummary>> {
    config.validate()?;

    let run_one = |(i, circuit): (usize, &Circuit)| -> Result<AnnealSummary> {
        let mut config = config.clone();
        config.seed = config.seed.map(|s| s.wrapping_add(i as u64));
        log::info!("annealing {} ({} cells)", circuit.name(), circuit.cell_count());
        let mut annealer = Annealer::new(circuit, config)?;
        Ok(annealer.run())
    };

    #[cfg(feature = "parallel")]
    let summaries = circuits.par_iter().enumerate().map(run_one).collect();
    #[cfg(not(feature = "parallel"))]
    let summaries = circuits.iter().enumerate().map(run_one).collect();

    summaries
}

/// Writes a results log for `summaries` to `path`.
pub fn write_results(
    path: impl AsRef<Path>,
    config: &AnnealConfig,
    label: &str,
    summaries: &[AnnealSummary],
) -> Result<()> {
    let path = path.as_ref();
    let io_err = |e| PlacerError::io(path, e);
    let file = File::create(path).map_err(io_err)?;
    let mut log = ResultsLog::new(BufWriter::new(file), config, label).map_err(io_err)?;
    for summary in summaries {
        log.record(summary).map_err(io_err)?;
    }
    if let Some(avg) = log.average_cost() {
        log::info!("average final cost over {} circuits: {avg:.2}", summaries.len());
    }
    log.finish().map_err(io_err)?;
    Ok(())
}
