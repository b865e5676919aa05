//! DIMACS `.col` graph loader.
//!
//! ```text
//! c optional comments
//! p edge 5 4
//! e 1 2
//! e 2 3
//! ```
//!
//! Vertices are 1-based in the file and 0-based in the model.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::{field, stem, LoadError};
use crate::models::GraphProblem;

pub fn from_bufread<R: BufRead>(reader: R) -> Result<GraphProblem, LoadError> {
    let mut header: Option<(usize, usize)> = None;
    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            None | Some("c") => {}
            Some("p") => {
                if header.is_some() {
                    return Err(LoadError::parse(lineno, "duplicate problem line"));
                }
                match tokens.next() {
                    Some("edge") | Some("col") => {}
                    other => {
                        return Err(LoadError::parse(
                            lineno,
                            format!("expected `p edge n m`, found format {:?}", other.unwrap_or("")),
                        ))
                    }
                }
                let n: usize = field(tokens.next(), lineno, "vertex count")?;
                let m: usize = field(tokens.next(), lineno, "edge count")?;
                if n == 0 {
                    return Err(LoadError::parse(lineno, "graph has no vertices"));
                }
                edges.reserve(m);
                header = Some((n, m));
            }
            Some("e") => {
                let (n, _) = header.ok_or_else(|| LoadError::parse(lineno, "edge before the problem line"))?;
                let u: usize = field(tokens.next(), lineno, "edge endpoint")?;
                let v: usize = field(tokens.next(), lineno, "edge endpoint")?;
                for w in [u, v] {
                    if w == 0 || w > n {
                        return Err(LoadError::parse(lineno, format!("vertex {w} out of range 1..={n}")));
                    }
                }
                if u == v {
                    return Err(LoadError::parse(lineno, format!("self loop on vertex {u}")));
                }
                if !seen.insert((u.min(v), u.max(v))) {
                    return Err(LoadError::parse(lineno, format!("duplicate edge ({u}, {v})")));
                }
                edges.push((u - 1, v - 1));
            }
            Some(tag) => {
                return Err(LoadError::parse(lineno, format!("unknown line type `{tag}`")));
            }
        }
    }

    let (n, m) = header.ok_or(LoadError::UnexpectedEof {
        expected: "problem line `p edge n m`",
    })?;
    if edges.len() != m {
        warn!(declared = m, found = edges.len(), "DIMACS edge count differs from header");
    }
    let graph = GraphProblem::new(n, edges)?;
    debug!(vertices = n, edges = graph.num_edges(), "loaded DIMACS graph");
    Ok(graph)
}

pub fn from_reader<R: Read>(reader: R) -> Result<GraphProblem, LoadError> {
    from_bufread(BufReader::new(reader))
}

pub fn from_str(s: &str) -> Result<GraphProblem, LoadError> {
    from_reader(s.as_bytes())
}

/// Loads a `.col` file, naming the graph after the file stem.
pub fn from_path(path: impl AsRef<Path>) -> Result<GraphProblem, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    Ok(from_bufread(BufReader::new(file))?.with_name(stem(path)))
}
