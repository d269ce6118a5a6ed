//! Plain-text netlist reader.
//!
//! Format:
//!
//! ```text
//! <cells> <nets> <rows> <cols>
//! <k> <cell_1> ... <cell_k>      one line per net
//! ```
//!
//! Blank lines are ignored. Line numbers in errors are 1-based and refer
//! to the physical line in the input.

use std::fs;
use std::path::Path;

use super::types::{Circuit, CircuitConfig, Net};
use crate::error::{PlacerError, Result};

/// Reads and validates a circuit file. The circuit is named after the file stem.
pub fn read_circuit(path: impl AsRef<Path>) -> Result<Circuit> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| PlacerError::io(path, e))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_circuit(&name, &text)
}

/// Parses a circuit from netlist text.
pub fn parse_circuit(name: &str, text: &str) -> Result<Circuit> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or(PlacerError::Parse {
        line: 1,
        reason: "missing header".into(),
    })?;
    let fields = parse_numbers(header_line, header)?;
    if fields.len() != 4 {
        return Err(PlacerError::Parse {
            line: header_line,
            reason: format!(
                "header needs 4 fields (cells nets rows cols), got {}",
                fields.len()
            ),
        });
    }
    let config = CircuitConfig {
        cell_count: fields[0],
        net_count: fields[1],
        rows: fields[2],
        cols: fields[3],
    };

    let mut nets = Vec::with_capacity(config.net_count);
    for (line_no, line) in lines {
        let fields = parse_numbers(line_no, line)?;
        let (&count, cells) = fields.split_first().ok_or(PlacerError::Parse {
            line: line_no,
            reason: "empty net line".into(),
        })?;
        if count != cells.len() {
            return Err(PlacerError::Parse {
                line: line_no,
                reason: format!("net declares {count} cells, lists {}", cells.len()),
            });
        }
        nets.push(Net::new(cells.to_vec()));
    }

    let circuit = Circuit::new(name, config, nets)?;
    log::debug!(
        "{name}: {} cells on a {}x{} grid, {} nets",
        config.cell_count,
        config.rows,
        config.cols,
        circuit.nets().len()
    );
    Ok(circuit)
}

fn parse_numbers(line_no: usize, line: &str) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>().map_err(|_| PlacerError::Parse {
                line: line_no,
                reason: format!("expected a non-negative integer, found `{tok}`"),
            })
        })
        .collect()
}
