//! End-to-end runs of hand-written programs on small instances.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use u_ils::generator::generate;
use u_ils::grammar::{AcceptanceRule, Budget, Condition, Node, StopRule};
use u_ils::interpreter::execute;
use u_ils::io::{dimacs, knapsack, SolomonLoader};
use u_ils::models::{Domain, Problem};
use u_ils::operators::{Constructor, ConstructorName, LocalSearchName, PerturbationName, RepairName, Repairer};
use u_ils::solution::{KnapsackAssignment, Solution};

const PETERSEN: &str = "\
c Petersen graph
p edge 10 15
e 1 2
e 2 3
e 3 4
e 4 5
e 5 1
e 1 6
e 2 7
e 3 8
e 4 9
e 5 10
e 6 8
e 8 10
e 10 7
e 7 9
e 9 6
";

const SMALL_KNAPSACK: &str = "4 10\n10 5\n40 4\n30 6\n50 3\n";

fn construct(heuristic: ConstructorName) -> Node {
    Node::GreedyConstruct { heuristic }
}

fn local_search(neighborhood: LocalSearchName, iter_cap: u32) -> Node {
    Node::LocalSearch {
        neighborhood,
        acceptance: AcceptanceRule::Improving,
        iter_cap,
    }
}

fn small_knapsack() -> Problem {
    knapsack::from_str(SMALL_KNAPSACK).expect("valid instance").into()
}

/// A 100-customer instance in Solomon text format with capacity 200. Wide
/// windows around a central depot keep every customer reachable.
fn solomon_text(seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut text = String::from(
        "SYNTH100\n\nVEHICLE\nNUMBER     CAPACITY\n  25         200\n\nCUSTOMER\n\
         CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE TIME\n\n",
    );
    text.push_str("    0      40         50          0          0       1236          0\n");
    for id in 1..=100 {
        let x = rng.random_range(10..=70);
        let y = rng.random_range(20..=80);
        let demand = rng.random_range(5..=25);
        let ready = rng.random_range(0..=500);
        let due = ready + 500;
        text.push_str(&format!(
            "{id:5} {x:8} {y:10} {demand:10} {ready:10} {due:10} {:10}\n",
            10
        ));
    }
    text
}

fn round4(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

/// Ten clusters of ten customers, each cluster laid out along a ray from the
/// depot. Windows are 60 wide around the arrival times of one vehicle
/// sweeping its ray outward, with the 90-unit service of the clustered
/// Solomon sets, so each cluster fits exactly one route.
fn clustered_text() -> String {
    let depot = (40.0, 50.0);
    let mut text = String::from(
        "CLUSTER100\n\nVEHICLE\nNUMBER     CAPACITY\n  25         200\n\nCUSTOMER\n\
         CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE TIME\n\n",
    );
    text.push_str("    0      40.0000      50.0000      0        0     1236      0\n");
    let mut id = 1;
    for cluster in 0..10 {
        let angle = f64::from(cluster) * std::f64::consts::PI / 5.0;
        let mut prev = depot;
        let mut time = 0.0;
        for step in 0..10 {
            let r = 20.0 + 2.0 * f64::from(step);
            let x = round4(depot.0 + r * angle.cos());
            let y = round4(depot.1 + r * angle.sin());
            time += (x - prev.0).hypot(y - prev.1);
            let ready = (time - 30.0).floor().max(0.0);
            let due = (time + 30.0).ceil();
            text.push_str(&format!("{id:5} {x:12.4} {y:12.4} {:6} {ready:8} {due:8} {:6}\n", 10, 90));
            time += 90.0;
            prev = (x, y);
            id += 1;
        }
    }
    text
}

fn served_once(solution: &Solution, n: usize) -> bool {
    let Some(routing) = solution.as_routing() else {
        return false;
    };
    let mut seen = vec![0usize; n + 1];
    for route in routing.routes() {
        for &c in route.customers() {
            seen[c] += 1;
        }
    }
    seen[1..].iter().all(|&count| count == 1) && routing.unassigned().is_empty()
}

#[test]
fn dimacs_triangle_needs_three_colors() {
    let graph = dimacs::from_str("p edge 3 3\ne 1 2\ne 1 3\ne 2 3\n").expect("valid instance");
    let problem = Problem::from(graph);
    let ast = Node::Seq {
        body: vec![
            construct(ConstructorName::Dsatur),
            local_search(LocalSearchName::KempeChain, 10),
        ],
    };

    let run = execute(&ast, &problem, 0).expect("valid program");
    assert!(run.is_completed());
    let best = run.best.expect("constructed");
    let coloring = best.as_coloring().expect("coloring");
    assert_eq!(coloring.num_colors(), 3);
    assert_eq!(coloring.conflicts(), 0);
    assert!(best.is_feasible());
}

#[test]
fn petersen_with_perturbation_stays_proper() {
    let problem = Problem::from(dimacs::from_str(PETERSEN).expect("valid instance").with_known_chromatic(3));
    let ast = Node::Seq {
        body: vec![
            construct(ConstructorName::LargestFirst),
            Node::While {
                budget: Budget::IterBudget { n: 50 },
                body: Box::new(Node::If {
                    cond: Condition::Stagnation { k: 10 },
                    then: Box::new(Node::Perturbation {
                        operator: PerturbationName::RandomRecolor,
                        intensity: 0.3,
                    }),
                    otherwise: Some(Box::new(local_search(LocalSearchName::OneVertexMove, 50))),
                }),
            },
        ],
    };

    for seed in [0, 1, 7, 42] {
        let run = execute(&ast, &problem, seed).expect("valid program");
        let best = run.best.expect("constructed");
        let coloring = best.as_coloring().expect("coloring");
        assert!(best.is_feasible(), "seed {seed}");
        assert!(coloring.num_colors() <= 4, "seed {seed}: {} colors", coloring.num_colors());
    }
}

#[test]
fn knapsack_small_reaches_optimum() {
    let problem = small_knapsack();
    let ast = Node::ChooseBestOf {
        n: 5,
        body: Box::new(Node::Seq {
            body: vec![
                construct(ConstructorName::ByRatio),
                local_search(LocalSearchName::FlipBestItem, 100),
            ],
        }),
    };

    let run = execute(&ast, &problem, 3).expect("valid program");
    let best = run.best.expect("constructed");
    let assignment = best.as_knapsack().expect("knapsack");
    assert_eq!(assignment.value(), 90);
    assert_eq!(assignment.weight(), 7);
    assert_eq!(assignment.selected_items(), vec![1, 3]);
    assert!(best.is_feasible());
}

#[test]
fn knapsack_overfill_is_repaired() {
    let problem = small_knapsack();
    let k = problem.as_knapsack().expect("knapsack");

    let full = Solution::from(KnapsackAssignment::from_selection(k, vec![true; 4]));
    assert_eq!(full.as_knapsack().map(KnapsackAssignment::weight), Some(18));
    assert!(!full.is_feasible());
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let repaired = RepairName::RemoveLowestRatio
        .repair(&full, &problem, &mut rng)
        .expect("same domain");
    assert!(repaired.is_feasible());

    // ByValue picks items 2 and 4; flipping every item leaves 1 and 3,
    // weight 11 > 10.
    let ast = Node::Seq {
        body: vec![
            construct(ConstructorName::ByValue),
            Node::Perturbation {
                operator: PerturbationName::RandomFlip,
                intensity: 1.0,
            },
            Node::Repair {
                operator: RepairName::RemoveLowestRatio,
            },
        ],
    };
    let run = execute(&ast, &problem, 0).expect("valid program");
    let currents: Vec<Option<f64>> = run.trace.records().iter().map(|r| r.current_fitness).collect();
    assert_eq!(currents.len(), 3);
    assert_eq!(currents[0], Some(-90.0));
    assert!(currents[1] > Some(-40.0));
    assert_eq!(currents[2], Some(-30.0));
    assert_eq!(run.best_fitness().map(|f| f.scalar()), Some(-90.0));
}

#[test]
fn same_seed_gives_byte_equal_traces() {
    let problem = Problem::from(dimacs::from_str(PETERSEN).expect("valid instance"));
    for seed in 0..5 {
        let ast = generate(Domain::GraphColoring, seed).expect("generated");
        let a = execute(&ast, &problem, seed).expect("valid program");
        let b = execute(&ast, &problem, seed).expect("valid program");
        assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
        assert_eq!(a.best, b.best);
        assert_eq!(a.counters, b.counters);
    }
}

#[test]
fn vrptw_nearest_neighbor_with_two_opt_is_feasible() {
    let text = solomon_text(101);
    let problem = Problem::from(SolomonLoader::new().from_str(&text).expect("valid instance"));
    let ast = Node::Seq {
        body: vec![
            construct(ConstructorName::NearestNeighbor),
            Node::ApplyUntilNoImprove {
                body: Box::new(local_search(LocalSearchName::TwoOpt, 50)),
                stop: StopRule::Stagnation { k: 20 },
            },
        ],
    };

    let run = execute(&ast, &problem, 0).expect("valid program");
    assert!(run.is_completed());
    let best = run.best.expect("constructed");
    let routing = best.as_routing().expect("routing");

    let mut seen = vec![0usize; 101];
    for route in routing.routes() {
        for &c in route.customers() {
            seen[c] += 1;
        }
    }
    assert!(seen[1..].iter().all(|&count| count == 1));
    assert!(routing.unassigned().is_empty());
    assert!(routing.num_routes() <= 20, "{} routes", routing.num_routes());
    assert!(routing.routes().iter().all(|r| r.is_feasible()));
    assert!(best.is_feasible());
}

#[test]
fn vrptw_tight_windows_nearest_neighbor_keeps_clusters() {
    let problem = Problem::from(SolomonLoader::new().from_str(&clustered_text()).expect("valid instance"));
    let ast = Node::Seq {
        body: vec![
            construct(ConstructorName::NearestNeighbor),
            Node::ApplyUntilNoImprove {
                body: Box::new(local_search(LocalSearchName::TwoOpt, 50)),
                stop: StopRule::Stagnation { k: 20 },
            },
        ],
    };

    let run = execute(&ast, &problem, 0).expect("valid program");
    assert!(run.is_completed());
    let best = run.best.expect("constructed");
    assert!(served_once(&best, 100));
    let routing = best.as_routing().expect("routing");
    assert!(routing.num_routes() <= 20, "{} routes", routing.num_routes());
    // Leaving a cluster means arriving after every other window closed.
    assert_eq!(routing.num_routes(), 10);
    assert!(routing.routes().iter().all(|r| r.is_feasible()));
    assert!(best.is_feasible());
}

#[test]
fn vrptw_tight_windows_every_constructor_is_feasible() {
    let problem = Problem::from(SolomonLoader::new().from_str(&clustered_text()).expect("valid instance"));
    for seed in [0, 3] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for name in ConstructorName::for_domain(Domain::Vrptw) {
            let built = name.build(&problem, &mut rng).expect("same domain");
            assert!(served_once(&built, 100), "{name}");
            assert!(built.is_feasible(), "{name}");

            let repaired = RepairName::GreedyRepair
                .repair(&built, &problem, &mut rng)
                .expect("same domain");
            assert!(served_once(&repaired, 100), "{name} + GreedyRepair");
            assert!(repaired.is_feasible(), "{name} + GreedyRepair");
            // One 90-unit service per window slot caps a route at ten visits.
            let routes = repaired.as_routing().map_or(0, |r| r.num_routes());
            assert!((10..=100).contains(&routes), "{name}: {routes} routes");
        }
    }
}
