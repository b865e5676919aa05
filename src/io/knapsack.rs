//! 0/1 knapsack loader.
//!
//! The first non-blank line holds `n W`, followed by `n` lines of
//! `value weight`. A sibling file `<stem>.opt` may hold the optimum value.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::{field, stem, LoadError};
use crate::models::{Item, KnapsackProblem};

pub fn from_bufread<R: BufRead>(reader: R) -> Result<KnapsackProblem, LoadError> {
    let mut header: Option<(usize, u64)> = None;
    let mut items = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        match header {
            None => {
                let n: usize = field(Some(first), lineno, "item count")?;
                let capacity: u64 = field(tokens.next(), lineno, "capacity")?;
                items.reserve(n);
                header = Some((n, capacity));
            }
            Some((n, _)) if items.len() == n => {
                return Err(LoadError::parse(lineno, format!("more than {n} items")));
            }
            Some(_) => {
                let value: u64 = field(Some(first), lineno, "value")?;
                let weight: u64 = field(tokens.next(), lineno, "weight")?;
                items.push(Item { value, weight });
            }
        }
        if tokens.next().is_some() {
            return Err(LoadError::parse(lineno, "unexpected trailing token"));
        }
    }

    let (n, capacity) = header.ok_or(LoadError::UnexpectedEof {
        expected: "header `n W`",
    })?;
    if items.len() < n {
        return Err(LoadError::UnexpectedEof { expected: "item line" });
    }
    let problem = KnapsackProblem::new(items, capacity)?;
    debug!(items = n, capacity, "loaded knapsack instance");
    Ok(problem)
}

pub fn from_reader<R: Read>(reader: R) -> Result<KnapsackProblem, LoadError> {
    from_bufread(BufReader::new(reader))
}

pub fn from_str(s: &str) -> Result<KnapsackProblem, LoadError> {
    from_reader(s.as_bytes())
}

/// Loads an instance file and, when present, its `<stem>.opt` optimum.
pub fn from_path(path: impl AsRef<Path>) -> Result<KnapsackProblem, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut problem = from_bufread(BufReader::new(file))?.with_name(stem(path));
    let opt = path.with_extension("opt");
    if opt.is_file() {
        let text = fs::read_to_string(&opt)?;
        let optimum: u64 = field(text.split_whitespace().next(), 1, "optimum")?;
        problem = problem.with_known_optimum(optimum);
    }
    Ok(problem)
}

/// Loads every instance in `dir`, sorted by file name. `.opt` files are
/// attached to their instance rather than loaded on their own.
pub fn load_group(dir: impl AsRef<Path>) -> Result<Vec<KnapsackProblem>, LoadError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension() != Some(OsStr::new("opt")) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths.iter().map(from_path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "4 10\n10 5\n40 4\n30 6\n50 3\n";

    #[test]
    fn test_parses_items() {
        let k = from_str(SMALL).expect("valid");
        assert_eq!(k.num_items(), 4);
        assert_eq!(k.capacity(), 10);
        assert_eq!(k.value(1), 40);
        assert_eq!(k.weight(3), 3);
        assert_eq!(k.known_optimum(), None);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let k = from_str("\n2 5\n\n1 1\n2 2\n\n").expect("valid");
        assert_eq!(k.num_items(), 2);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(from_str(""), Err(LoadError::UnexpectedEof { .. })));
        assert!(matches!(from_str("3 10\n1 1\n"), Err(LoadError::UnexpectedEof { .. })));
        assert!(matches!(from_str("1 10\n1 1\n2 2\n"), Err(LoadError::Parse { line: 3, .. })));
        assert!(matches!(from_str("1 10\n1 -1\n"), Err(LoadError::Parse { line: 2, .. })));
        assert!(matches!(from_str("1 10\n0 1\n"), Err(LoadError::Model(_))));
    }

    #[test]
    fn test_group_with_optimum_sidecar() {
        let dir = std::env::temp_dir().join(format!("u-ils-knapsack-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("tmp dir");
        fs::write(dir.join("b.txt"), "1 5\n3 5\n").expect("write");
        fs::write(dir.join("a.txt"), SMALL).expect("write");
        fs::write(dir.join("a.opt"), "90\n").expect("write");

        let group = load_group(&dir).expect("valid");
        fs::remove_dir_all(&dir).ok();

        let names: Vec<&str> = group.iter().map(KnapsackProblem::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(group[0].known_optimum(), Some(90));
        assert_eq!(group[1].known_optimum(), None);
    }
}
