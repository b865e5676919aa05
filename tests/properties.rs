//! Invariants that must hold for every instance, program and seed.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use u_ils::generator::{Generator, GeneratorConfig};
use u_ils::grammar::{AcceptanceRule, Node};
use u_ils::interpreter::execute;
use u_ils::models::{Customer, Domain, GraphProblem, Item, KnapsackProblem, Problem, TimeWindow, VrptwProblem};
use u_ils::operators::{ConstructorName, Constructor, Improver, LocalSearchName, PerturbationName};
use u_ils::solution::{Coloring, KnapsackAssignment, Solution};

const RULES: [AcceptanceRule; 4] = [
    AcceptanceRule::Improving,
    AcceptanceRule::FirstImproving,
    AcceptanceRule::Metropolis { temperature: 2.0 },
    AcceptanceRule::AlwaysAccept,
];

/// Small loops so generated programs finish quickly.
fn quick_generator(domain: Domain) -> Generator {
    let config = GeneratorConfig::new(domain)
        .with_iterations(vec![5, 10])
        .with_loop_budgets(vec![2, 3, 5])
        .with_stagnation(vec![2, 3])
        .with_choose_best_of(vec![2]);
    Generator::new(config).expect("valid config")
}

fn graph_strategy() -> impl Strategy<Value = GraphProblem> {
    (3usize..12)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
        .prop_map(|(n, pairs)| {
            let edges: BTreeSet<(usize, usize)> = pairs
                .into_iter()
                .filter(|(u, v)| u != v)
                .map(|(u, v)| (u.min(v), u.max(v)))
                .collect();
            GraphProblem::new(n, edges).expect("simple graph")
        })
}

fn knapsack_strategy() -> impl Strategy<Value = KnapsackProblem> {
    (prop::collection::vec((1u64..50, 1u64..30), 1..12), 1u64..100).prop_map(|(items, capacity)| {
        let items = items.into_iter().map(|(value, weight)| Item { value, weight }).collect();
        KnapsackProblem::new(items, capacity).expect("positive items")
    })
}

fn vrptw_strategy() -> impl Strategy<Value = VrptwProblem> {
    prop::collection::vec((0u32..50, 0u32..50, 1i32..10), 2..12).prop_map(|rows| {
        let wide = |due: f64| TimeWindow::new(0.0, due).expect("ordered window");
        let mut customers = vec![Customer::depot(25.0, 25.0).with_time_window(wide(2000.0))];
        for (i, (x, y, demand)) in rows.iter().enumerate() {
            customers.push(
                Customer::new(i + 1, f64::from(*x), f64::from(*y), *demand, 5.0).with_time_window(wide(1000.0)),
            );
        }
        let fleet = rows.len();
        VrptwProblem::new(customers, 30, fleet).expect("valid instance")
    })
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
    seen[1..].iter().all(|&count| count == 1)
}

fn first_index(tree: &Node, pred: impl Fn(&Node) -> bool) -> Option<usize> {
    tree.preorder().iter().position(|node| pred(node))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn same_inputs_same_run(knapsack in knapsack_strategy(), seed in any::<u64>()) {
        let problem = Problem::from(knapsack);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = quick_generator(Domain::Knapsack).ramped_half_and_half(&mut rng).expect("generated");
        let a = execute(&tree, &problem, seed).expect("valid program");
        let b = execute(&tree, &problem, seed).expect("valid program");
        prop_assert_eq!(a.best_fitness(), b.best_fitness());
        prop_assert_eq!(a.best, b.best);
        prop_assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
    }

    #[test]
    fn same_inputs_same_run_coloring(graph in graph_strategy(), seed in any::<u64>()) {
        let problem = Problem::from(graph);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = quick_generator(Domain::GraphColoring).ramped_half_and_half(&mut rng).expect("generated");
        let a = execute(&tree, &problem, seed).expect("valid program");
        let b = execute(&tree, &problem, seed).expect("valid program");
        prop_assert_eq!(a.best, b.best);
        prop_assert_eq!(a.counters, b.counters);
        prop_assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
    }

    #[test]
    fn same_inputs_same_run_routing(vrptw in vrptw_strategy(), seed in any::<u64>()) {
        let problem = Problem::from(vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = quick_generator(Domain::Vrptw).ramped_half_and_half(&mut rng).expect("generated");
        let a = execute(&tree, &problem, seed).expect("valid program");
        let b = execute(&tree, &problem, seed).expect("valid program");
        prop_assert_eq!(a.best, b.best);
        prop_assert_eq!(a.counters, b.counters);
        prop_assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
    }

    #[test]
    fn best_never_gets_worse(graph in graph_strategy(), seed in any::<u64>()) {
        let problem = Problem::from(graph);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = quick_generator(Domain::GraphColoring).ramped_half_and_half(&mut rng).expect("generated");
        let run = execute(&tree, &problem, seed).expect("valid program");
        let curve: Vec<f64> = run.trace.best_curve().into_iter().flatten().collect();
        for pair in curve.windows(2) {
            prop_assert!(pair[1] <= pair[0], "best went from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn generated_trees_validate_and_construct_first(seed in any::<u64>(), domain in prop::sample::select(Domain::ALL.to_vec())) {
        let generator = Generator::new(GeneratorConfig::new(domain)).expect("valid config");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..5 {
            let tree = generator.ramped_half_and_half(&mut rng).expect("generated");
            prop_assert!(generator.grammar().validate(&tree).is_ok());

            let construct = first_index(&tree, |n| matches!(n, Node::GreedyConstruct { .. }));
            let other = first_index(&tree, |n| {
                matches!(n, Node::LocalSearch { .. } | Node::Perturbation { .. } | Node::Repair { .. })
            });
            prop_assert!(construct.is_some());
            if let (Some(c), Some(o)) = (construct, other) {
                prop_assert!(c < o, "constructor at {} after operator at {}", c, o);
            }

            let parsed = Node::from_json(&tree.to_json()).expect("round trip");
            prop_assert_eq!(&parsed, &tree);
        }
    }

    #[test]
    fn coloring_improvers_never_worsen(
        (graph, colors) in graph_strategy().prop_flat_map(|g| {
            let n = g.num_vertices();
            (Just(g), prop::collection::vec(0usize..5, n))
        }),
        seed in any::<u64>(),
    ) {
        let start = Solution::from(Coloring::from_colors(&graph, colors));
        let problem = Problem::from(graph);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for name in LocalSearchName::for_domain(Domain::GraphColoring) {
            for rule in &RULES {
                let out = name.improve(&start, &problem, rule, 30, &mut rng).expect("same domain");
                prop_assert!(out.solution.fitness() <= start.fitness(), "{} under {}", name, rule);
            }
        }
    }

    #[test]
    fn knapsack_improvers_never_worsen(
        (knapsack, selection) in knapsack_strategy().prop_flat_map(|k| {
            let n = k.num_items();
            (Just(k), prop::collection::vec(any::<bool>(), n))
        }),
        seed in any::<u64>(),
    ) {
        let start = Solution::from(KnapsackAssignment::from_selection(&knapsack, selection));
        let problem = Problem::from(knapsack);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for name in LocalSearchName::for_domain(Domain::Knapsack) {
            for rule in &RULES {
                let out = name.improve(&start, &problem, rule, 30, &mut rng).expect("same domain");
                prop_assert!(out.solution.fitness() <= start.fitness(), "{} under {}", name, rule);
            }
        }
    }

    #[test]
    fn routing_improvers_never_worsen(vrptw in vrptw_strategy(), seed in any::<u64>()) {
        let problem = Problem::from(vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start = ConstructorName::RandomizedInsertion.build(&problem, &mut rng).expect("same domain");
        for name in LocalSearchName::for_domain(Domain::Vrptw) {
            for rule in &RULES {
                let out = name.improve(&start, &problem, rule, 20, &mut rng).expect("same domain");
                prop_assert!(out.solution.fitness() <= start.fitness(), "{} under {}", name, rule);
            }
        }
    }

    #[test]
    fn constructors_are_feasible(graph in graph_strategy(), knapsack in knapsack_strategy(), seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for problem in [Problem::from(graph), Problem::from(knapsack)] {
            for name in ConstructorName::for_domain(problem.domain()) {
                let solution = name.build(&problem, &mut rng).expect("same domain");
                prop_assert!(solution.is_feasible(), "{} on {}", name, problem.domain());
            }
        }
    }

    #[test]
    fn routing_constructors_serve_everyone_once(vrptw in vrptw_strategy(), seed in any::<u64>()) {
        let n = vrptw.num_customers();
        let problem = Problem::from(vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for name in ConstructorName::for_domain(Domain::Vrptw) {
            let solution = name.build(&problem, &mut rng).expect("same domain");
            prop_assert!(served_once(&solution, n), "{}", name);
        }
    }

    #[test]
    fn one_record_per_top_level_pass(knapsack in knapsack_strategy(), passes in 1u32..20, seed in any::<u64>()) {
        let problem = Problem::from(knapsack);
        let tree = Node::Seq {
            body: vec![
                Node::GreedyConstruct { heuristic: ConstructorName::Random },
                Node::For {
                    iterations: passes,
                    body: Box::new(Node::Perturbation { operator: PerturbationName::RandomFlip, intensity: 0.3 }),
                },
            ],
        };
        let run = execute(&tree, &problem, seed).expect("valid program");
        prop_assert_eq!(run.trace.len(), 1 + passes as usize);
        prop_assert_eq!(run.counters.iterations, passes as usize);
    }

    #[test]
    fn one_record_per_top_level_statement(knapsack in knapsack_strategy(), extra in 1usize..6, seed in any::<u64>()) {
        let problem = Problem::from(knapsack);
        let mut body = vec![Node::GreedyConstruct { heuristic: ConstructorName::ByRatio }];
        for i in 0..extra {
            body.push(if i % 2 == 0 {
                Node::Perturbation { operator: PerturbationName::DestroyByRemoval, intensity: 0.5 }
            } else {
                Node::LocalSearch {
                    neighborhood: LocalSearchName::OneExchange,
                    acceptance: AcceptanceRule::Improving,
                    iter_cap: 10,
                }
            });
        }
        let run = execute(&Node::Seq { body }, &problem, seed).expect("valid program");
        prop_assert_eq!(run.trace.len(), 1 + extra);
        prop_assert_eq!(run.counters.iterations, 0);
    }
}
