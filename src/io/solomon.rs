//! Solomon VRPTW benchmark loader.
//!
//! ```text
//! C101
//!
//! VEHICLE
//! NUMBER     CAPACITY
//!   25         200
//!
//! CUSTOMER
//! CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE TIME
//!     0      40         50          0          0       1236          0
//!     1      45         68         10        912        967         90
//! ```
//!
//! Row 0 is the depot.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::{field, LoadError};
use crate::models::{Customer, ModelError, TimeWindow, VrptwProblem};

/// Loader for Solomon-format files.
///
/// # Examples
///
/// ```
/// use u_ils::io::SolomonLoader;
///
/// let text = "tiny\nVEHICLE\nNUMBER CAPACITY\n2 10\nCUSTOMER\n\
///             CUST NO. XCOORD. YCOORD. DEMAND READY DUE SERVICE\n\
///             0 0 0 0 0 100 0\n1 3 4 5 0 50 1\n";
/// let problem = SolomonLoader::new().with_expected_customers(1).from_str(text).unwrap();
/// assert_eq!(problem.name(), "tiny");
/// assert_eq!(problem.num_customers(), 1);
/// assert_eq!(problem.fleet_size(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolomonLoader {
    expected_customers: Option<usize>,
}

impl Default for SolomonLoader {
    fn default() -> Self {
        Self {
            expected_customers: Some(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Vehicle,
    Customer,
}

impl SolomonLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of customers the file must hold, depot excluded.
    #[inline]
    pub fn with_expected_customers(mut self, n: usize) -> Self {
        self.expected_customers = Some(n);
        self
    }

    /// Accepts any number of customers.
    #[inline]
    pub fn any_size(mut self) -> Self {
        self.expected_customers = None;
        self
    }

    pub fn expected_customers(&self) -> Option<usize> {
        self.expected_customers
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.expected_customers == Some(0) {
            return Err("expected_customers must be positive".into());
        }
        Ok(())
    }

    pub fn from_bufread<R: BufRead>(&self, reader: R) -> Result<VrptwProblem, LoadError> {
        let mut section = Section::Name;
        let mut name = String::new();
        let mut fleet: Option<(usize, i32)> = None;
        let mut customers = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("VEHICLE") {
                section = Section::Vehicle;
                continue;
            }
            if trimmed.eq_ignore_ascii_case("CUSTOMER") {
                if fleet.is_none() {
                    return Err(LoadError::parse(lineno, "CUSTOMER block before VEHICLE block"));
                }
                section = Section::Customer;
                continue;
            }
            // Column headings start with a letter.
            let numeric = trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.');
            match section {
                Section::Name => {
                    if !name.is_empty() {
                        return Err(LoadError::parse(lineno, "expected VEHICLE block"));
                    }
                    name = trimmed.to_string();
                }
                Section::Vehicle if !numeric => {}
                Section::Vehicle => {
                    if fleet.is_some() {
                        return Err(LoadError::parse(lineno, "VEHICLE block has more than one row"));
                    }
                    let mut tokens = trimmed.split_whitespace();
                    let number: usize = field(tokens.next(), lineno, "vehicle number")?;
                    let capacity: i32 = field(tokens.next(), lineno, "capacity")?;
                    fleet = Some((number, capacity));
                }
                Section::Customer if !numeric && customers.is_empty() => {}
                Section::Customer => customers.push(customer_row(trimmed, lineno)?),
            }
        }

        let (fleet_size, capacity) = fleet.ok_or(LoadError::UnexpectedEof {
            expected: "VEHICLE block",
        })?;
        if fleet_size == 0 {
            return Err(LoadError::Invalid("vehicle number must be positive".into()));
        }
        if customers.is_empty() {
            return Err(LoadError::UnexpectedEof {
                expected: "CUSTOMER rows",
            });
        }
        let found = customers.len() - 1;
        if let Some(expected) = self.expected_customers {
            if found != expected {
                return Err(LoadError::Invalid(format!(
                    "expected {expected} customers, found {found}"
                )));
            }
        }
        if found == 0 {
            return Err(ModelError::Empty.into());
        }

        let problem = VrptwProblem::new(customers, capacity, fleet_size)?.with_name(name);
        debug!(
            name = problem.name(),
            customers = found,
            fleet = fleet_size,
            capacity,
            "loaded Solomon instance"
        );
        Ok(problem)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<VrptwProblem, LoadError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<VrptwProblem, LoadError> {
        self.from_bufread(BufReader::new(r))
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<VrptwProblem, LoadError> {
        self.from_reader(s.as_bytes())
    }
}

/// Parses `id x y demand ready due service`.
fn customer_row(line: &str, lineno: usize) -> Result<Customer, LoadError> {
    let mut tokens = line.split_whitespace();
    let id: usize = field(tokens.next(), lineno, "customer number")?;
    let x: f64 = field(tokens.next(), lineno, "x coordinate")?;
    let y: f64 = field(tokens.next(), lineno, "y coordinate")?;
    let demand: i32 = field(tokens.next(), lineno, "demand")?;
    let ready: f64 = field(tokens.next(), lineno, "ready time")?;
    let due: f64 = field(tokens.next(), lineno, "due date")?;
    let service: f64 = field(tokens.next(), lineno, "service time")?;
    if tokens.next().is_some() {
        return Err(LoadError::parse(lineno, "unexpected trailing token"));
    }
    if demand < 0 || ready < 0.0 || due < 0.0 || service < 0.0 {
        return Err(LoadError::parse(lineno, format!("customer {id} has a negative field")));
    }
    let window = TimeWindow::new(ready, due)
        .ok_or_else(|| LoadError::parse(lineno, format!("customer {id} has ready {ready} after due {due}")))?;
    Ok(Customer::new(id, x, y, demand, service).with_time_window(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
R-small

VEHICLE
NUMBER     CAPACITY
  3         50

CUSTOMER
CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE TIME

    0      35         35          0          0        230          0
    1      41         49         10        161        171         10
    2      35         17          7         50         60         10
    3      55         45         13        116        126         10
";

    fn loader() -> SolomonLoader {
        SolomonLoader::new().with_expected_customers(3)
    }

    #[test]
    fn test_parses_blocks() {
        let p = loader().from_str(SMALL).expect("valid");
        assert_eq!(p.name(), "R-small");
        assert_eq!(p.num_customers(), 3);
        assert_eq!(p.fleet_size(), 3);
        assert_eq!(p.capacity(), 50);
        assert_eq!(p.customer(2).demand(), 7);
        assert_eq!(p.customer(3).ready(), 116.0);
        assert_eq!(p.depot().due(), 230.0);
        assert_eq!(p.customer(1).service_duration(), 10.0);
    }

    #[test]
    fn test_customer_count_is_checked() {
        assert!(matches!(SolomonLoader::new().from_str(SMALL), Err(LoadError::Invalid(_))));
        assert!(SolomonLoader::new().any_size().from_str(SMALL).is_ok());
    }

    #[test]
    fn test_rejects_bad_rows() {
        let ready_after_due = SMALL.replace("161        171", "171        161");
        assert!(matches!(loader().from_str(&ready_after_due), Err(LoadError::Parse { line: 11, .. })));

        let negative = SMALL.replace("     7 ", "    -7 ");
        assert!(matches!(loader().from_str(&negative), Err(LoadError::Parse { .. })));

        let depot_demand = SMALL.replace("35          0          0        230", "35          4          0        230");
        assert!(matches!(
            loader().from_str(&depot_demand),
            Err(LoadError::Model(ModelError::DepotDemand { demand: 4 }))
        ));

        let gap = SMALL.replace("    3      55", "    4      55");
        assert!(matches!(
            loader().from_str(&gap),
            Err(LoadError::Model(ModelError::NonConsecutiveIds { position: 3, id: 4 }))
        ));
    }

    #[test]
    fn test_missing_blocks() {
        assert!(matches!(loader().from_str("name\n"), Err(LoadError::UnexpectedEof { .. })));
        assert!(matches!(
            loader().from_str("name\nVEHICLE\n1 10\n"),
            Err(LoadError::UnexpectedEof { .. })
        ));
        assert!(matches!(loader().from_str("name\nCUSTOMER\n0 0 0 0 0 1 0\n"), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_validate() {
        assert!(SolomonLoader::new().validate().is_ok());
        assert!(SolomonLoader::new().with_expected_customers(0).validate().is_err());
        assert_eq!(SolomonLoader::default().expected_customers(), Some(100));
    }
}
