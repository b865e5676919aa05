//! Closed operator vocabularies.
//!
//! Every name belongs to exactly one domain. Names serialize as their
//! canonical spelling ([`as_str`](ConstructorName::as_str)); parsing is
//! case-insensitive and ignores `_`, `-` and spaces, so `largest_first`,
//! `LargestFirst` and the alias `LF` all resolve to the same variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Domain;

/// Default TabuCol tenure.
pub const DEFAULT_TABU_TENURE: u32 = 10;

/// Lowercase alphanumerics only.
fn normalized(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_with<T: Copy>(s: &str, all: &[T], name: fn(&T) -> &'static str, aliases: &[(&str, T)]) -> Option<T> {
    let key = normalized(s);
    all.iter()
        .copied()
        .find(|v| normalized(name(v)) == key)
        .or_else(|| aliases.iter().find(|(a, _)| *a == key).map(|&(_, v)| v))
}

/// Constructive heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructorName {
    #[serde(rename = "DSATUR")]
    Dsatur,
    #[serde(alias = "LF")]
    LargestFirst,
    #[serde(alias = "SL")]
    SmallestLast,
    RandomSequential,
    #[serde(rename = "RLF")]
    Rlf,
    ByValue,
    ByWeight,
    ByRatio,
    Random,
    NearestNeighbor,
    RandomizedInsertion,
    Savings,
    TimeOrientedNearestNeighbor,
    SolomonI1,
    RegretInsertion,
}

impl ConstructorName {
    pub const ALL: [ConstructorName; 15] = [
        ConstructorName::Dsatur,
        ConstructorName::LargestFirst,
        ConstructorName::SmallestLast,
        ConstructorName::RandomSequential,
        ConstructorName::Rlf,
        ConstructorName::ByValue,
        ConstructorName::ByWeight,
        ConstructorName::ByRatio,
        ConstructorName::Random,
        ConstructorName::NearestNeighbor,
        ConstructorName::RandomizedInsertion,
        ConstructorName::Savings,
        ConstructorName::TimeOrientedNearestNeighbor,
        ConstructorName::SolomonI1,
        ConstructorName::RegretInsertion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructorName::Dsatur => "DSATUR",
            ConstructorName::LargestFirst => "LargestFirst",
            ConstructorName::SmallestLast => "SmallestLast",
            ConstructorName::RandomSequential => "RandomSequential",
            ConstructorName::Rlf => "RLF",
            ConstructorName::ByValue => "ByValue",
            ConstructorName::ByWeight => "ByWeight",
            ConstructorName::ByRatio => "ByRatio",
            ConstructorName::Random => "Random",
            ConstructorName::NearestNeighbor => "NearestNeighbor",
            ConstructorName::RandomizedInsertion => "RandomizedInsertion",
            ConstructorName::Savings => "Savings",
            ConstructorName::TimeOrientedNearestNeighbor => "TimeOrientedNearestNeighbor",
            ConstructorName::SolomonI1 => "SolomonI1",
            ConstructorName::RegretInsertion => "RegretInsertion",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            ConstructorName::Dsatur
            | ConstructorName::LargestFirst
            | ConstructorName::SmallestLast
            | ConstructorName::RandomSequential
            | ConstructorName::Rlf => Domain::GraphColoring,
            ConstructorName::ByValue
            | ConstructorName::ByWeight
            | ConstructorName::ByRatio
            | ConstructorName::Random => Domain::Knapsack,
            ConstructorName::NearestNeighbor
            | ConstructorName::RandomizedInsertion
            | ConstructorName::Savings
            | ConstructorName::TimeOrientedNearestNeighbor
            | ConstructorName::SolomonI1
            | ConstructorName::RegretInsertion => Domain::Vrptw,
        }
    }

    /// Names of one domain, in declaration order.
    pub fn for_domain(domain: Domain) -> Vec<ConstructorName> {
        Self::ALL.into_iter().filter(|n| n.domain() == domain).collect()
    }
}

impl FromStr for ConstructorName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with(
            s,
            &Self::ALL,
            ConstructorName::as_str,
            &[
                ("lf", ConstructorName::LargestFirst),
                ("sl", ConstructorName::SmallestLast),
                ("nn", ConstructorName::NearestNeighbor),
                ("clarkewright", ConstructorName::Savings),
            ],
        )
        .ok_or_else(|| format!("unknown constructor `{s}`"))
    }
}

/// Local-search neighborhoods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalSearchName {
    KempeChain,
    OneVertexMove,
    SwapColors,
    TabuColoring { tenure: u32 },
    FlipBestItem,
    FlipWorstItem,
    OneExchange,
    TwoExchange,
    TwoOpt,
    OrOpt,
    Relocate,
    ThreeOpt,
    CrossExchange,
    TwoOptStar,
    SwapCustomers,
    InterRelocate,
}

impl LocalSearchName {
    /// Every neighborhood; `TabuColoring` with the default tenure.
    pub const ALL: [LocalSearchName; 16] = [
        LocalSearchName::KempeChain,
        LocalSearchName::OneVertexMove,
        LocalSearchName::SwapColors,
        LocalSearchName::TabuColoring {
            tenure: DEFAULT_TABU_TENURE,
        },
        LocalSearchName::FlipBestItem,
        LocalSearchName::FlipWorstItem,
        LocalSearchName::OneExchange,
        LocalSearchName::TwoExchange,
        LocalSearchName::TwoOpt,
        LocalSearchName::OrOpt,
        LocalSearchName::Relocate,
        LocalSearchName::ThreeOpt,
        LocalSearchName::CrossExchange,
        LocalSearchName::TwoOptStar,
        LocalSearchName::SwapCustomers,
        LocalSearchName::InterRelocate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocalSearchName::KempeChain => "KempeChain",
            LocalSearchName::OneVertexMove => "OneVertexMove",
            LocalSearchName::SwapColors => "SwapColors",
            LocalSearchName::TabuColoring { .. } => "TabuColoring",
            LocalSearchName::FlipBestItem => "FlipBestItem",
            LocalSearchName::FlipWorstItem => "FlipWorstItem",
            LocalSearchName::OneExchange => "OneExchange",
            LocalSearchName::TwoExchange => "TwoExchange",
            LocalSearchName::TwoOpt => "TwoOpt",
            LocalSearchName::OrOpt => "OrOpt",
            LocalSearchName::Relocate => "Relocate",
            LocalSearchName::ThreeOpt => "ThreeOpt",
            LocalSearchName::CrossExchange => "CrossExchange",
            LocalSearchName::TwoOptStar => "TwoOptStar",
            LocalSearchName::SwapCustomers => "SwapCustomers",
            LocalSearchName::InterRelocate => "InterRelocate",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            LocalSearchName::KempeChain
            | LocalSearchName::OneVertexMove
            | LocalSearchName::SwapColors
            | LocalSearchName::TabuColoring { .. } => Domain::GraphColoring,
            LocalSearchName::FlipBestItem
            | LocalSearchName::FlipWorstItem
            | LocalSearchName::OneExchange
            | LocalSearchName::TwoExchange => Domain::Knapsack,
            _ => Domain::Vrptw,
        }
    }

    pub fn for_domain(domain: Domain) -> Vec<LocalSearchName> {
        Self::ALL.into_iter().filter(|n| n.domain() == domain).collect()
    }
}

impl FromStr for LocalSearchName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with(
            s,
            &Self::ALL,
            LocalSearchName::as_str,
            &[
                ("kempe", LocalSearchName::KempeChain),
                (
                    "tabucol",
                    LocalSearchName::TabuColoring {
                        tenure: DEFAULT_TABU_TENURE,
                    },
                ),
                ("2opt", LocalSearchName::TwoOpt),
                ("3opt", LocalSearchName::ThreeOpt),
            ],
        )
        .ok_or_else(|| format!("unknown local search `{s}`"))
    }
}

/// Perturbation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerturbationName {
    RandomRecolor,
    PartialDestroy,
    RandomFlip,
    DestroyByRemoval,
    EjectionChain,
    RuinAndRecreate,
    RandomRemoval,
    RouteElimination,
}

impl PerturbationName {
    pub const ALL: [PerturbationName; 8] = [
        PerturbationName::RandomRecolor,
        PerturbationName::PartialDestroy,
        PerturbationName::RandomFlip,
        PerturbationName::DestroyByRemoval,
        PerturbationName::EjectionChain,
        PerturbationName::RuinAndRecreate,
        PerturbationName::RandomRemoval,
        PerturbationName::RouteElimination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerturbationName::RandomRecolor => "RandomRecolor",
            PerturbationName::PartialDestroy => "PartialDestroy",
            PerturbationName::RandomFlip => "RandomFlip",
            PerturbationName::DestroyByRemoval => "DestroyByRemoval",
            PerturbationName::EjectionChain => "EjectionChain",
            PerturbationName::RuinAndRecreate => "RuinAndRecreate",
            PerturbationName::RandomRemoval => "RandomRemoval",
            PerturbationName::RouteElimination => "RouteElimination",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            PerturbationName::RandomRecolor | PerturbationName::PartialDestroy => Domain::GraphColoring,
            PerturbationName::RandomFlip | PerturbationName::DestroyByRemoval => Domain::Knapsack,
            _ => Domain::Vrptw,
        }
    }

    pub fn for_domain(domain: Domain) -> Vec<PerturbationName> {
        Self::ALL.into_iter().filter(|n| n.domain() == domain).collect()
    }
}

impl FromStr for PerturbationName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with(s, &Self::ALL, PerturbationName::as_str, &[])
            .ok_or_else(|| format!("unknown perturbation `{s}`"))
    }
}

/// Repair operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairName {
    SequentialResolution,
    GreedyRebuild,
    RemoveLowestRatio,
    GreedyRefill,
    CapacityRepair,
    TimeWindowRepair,
    GreedyRepair,
}

impl RepairName {
    pub const ALL: [RepairName; 7] = [
        RepairName::SequentialResolution,
        RepairName::GreedyRebuild,
        RepairName::RemoveLowestRatio,
        RepairName::GreedyRefill,
        RepairName::CapacityRepair,
        RepairName::TimeWindowRepair,
        RepairName::GreedyRepair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairName::SequentialResolution => "SequentialResolution",
            RepairName::GreedyRebuild => "GreedyRebuild",
            RepairName::RemoveLowestRatio => "RemoveLowestRatio",
            RepairName::GreedyRefill => "GreedyRefill",
            RepairName::CapacityRepair => "CapacityRepair",
            RepairName::TimeWindowRepair => "TimeWindowRepair",
            RepairName::GreedyRepair => "GreedyRepair",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            RepairName::SequentialResolution | RepairName::GreedyRebuild => Domain::GraphColoring,
            RepairName::RemoveLowestRatio | RepairName::GreedyRefill => Domain::Knapsack,
            _ => Domain::Vrptw,
        }
    }

    pub fn for_domain(domain: Domain) -> Vec<RepairName> {
        Self::ALL.into_iter().filter(|n| n.domain() == domain).collect()
    }
}

impl FromStr for RepairName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with(s, &Self::ALL, RepairName::as_str, &[])
            .ok_or_else(|| format!("unknown repair `{s}`"))
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ConstructorName, LocalSearchName, PerturbationName, RepairName);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_has_one_domain() {
        let total = Domain::ALL
            .iter()
            .map(|&d| {
                ConstructorName::for_domain(d).len()
                    + LocalSearchName::for_domain(d).len()
                    + PerturbationName::for_domain(d).len()
                    + RepairName::for_domain(d).len()
            })
            .sum::<usize>();
        assert_eq!(total, 15 + 16 + 8 + 7);
        assert_eq!(ConstructorName::for_domain(Domain::Vrptw).len(), 6);
        assert_eq!(LocalSearchName::for_domain(Domain::Vrptw).len(), 8);
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!("largest_first".parse(), Ok(ConstructorName::LargestFirst));
        assert_eq!("LF".parse(), Ok(ConstructorName::LargestFirst));
        assert_eq!("dsatur".parse(), Ok(ConstructorName::Dsatur));
        assert_eq!("two-opt".parse(), Ok(LocalSearchName::TwoOpt));
        assert_eq!(
            "tabu_coloring".parse(),
            Ok(LocalSearchName::TabuColoring { tenure: 10 })
        );
        assert_eq!("remove lowest ratio".parse(), Ok(RepairName::RemoveLowestRatio));
        assert!("Sweep".parse::<ConstructorName>().is_err());
    }

    #[test]
    fn test_serde_spelling() {
        assert_eq!(serde_json::to_string(&ConstructorName::Dsatur).expect("json"), "\"DSATUR\"");
        let lf: ConstructorName = serde_json::from_str("\"LF\"").expect("alias");
        assert_eq!(lf, ConstructorName::LargestFirst);
        assert_eq!(
            serde_json::to_string(&LocalSearchName::TabuColoring { tenure: 15 }).expect("json"),
            r#"{"TabuColoring":{"tenure":15}}"#
        );
        assert_eq!(serde_json::to_string(&LocalSearchName::TwoOpt).expect("json"), "\"TwoOpt\"");
    }
}
