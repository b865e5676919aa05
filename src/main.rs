use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{arg, value_parser, ArgMatches, Command};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use u_ils::evaluation::Evaluator;
use u_ils::generator::{Generator, GeneratorConfig};
use u_ils::grammar::{GrammarConfig, Node};
use u_ils::interpreter::{Execution, Interpreter, InterpreterConfig, RunStatus};
use u_ils::io::{self, knapsack, SolomonLoader};
use u_ils::models::{Domain, Problem};
use u_ils::{Error, Result};

fn domain_arg() -> clap::Arg {
    arg!(-d --domain <DOMAIN> "Problem domain: graph_coloring, knapsack or vrptw")
        .required(true)
        .value_parser(value_parser!(Domain))
}

fn seed_arg() -> clap::Arg {
    arg!(--seed [SEED] "Base seed")
        .default_value("0")
        .value_parser(value_parser!(u64))
}

fn output_arg() -> clap::Arg {
    arg!(-o --output [PATH] "Write JSON here instead of stdout").value_parser(value_parser!(PathBuf))
}

fn time_limit_arg() -> clap::Arg {
    arg!(--"time-limit" [SECONDS] "Wall-clock limit per run").value_parser(value_parser!(f64))
}

fn customers_arg() -> clap::Arg {
    arg!(--customers [N] "Customers a Solomon file must hold")
        .default_value("100")
        .value_parser(value_parser!(usize))
}

fn depth_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(--"min-depth" [N] "Minimum tree depth")
            .default_value("2")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        arg!(--"max-depth" [N] "Maximum tree depth")
            .default_value("5")
            .value_parser(value_parser!(usize)),
    )
    .arg(arg!(--"fixed-shape" "Generate Seq[construct, If(cond, local search, perturbation)] programs"))
}

fn cli() -> Command {
    Command::new("u-ils")
        .about("Generates and runs iterated local search programs")
        .arg_required_else_help(true)
        .subcommand(depth_args(
            Command::new("generate")
                .about("Generates random programs and prints them as JSON")
                .arg(domain_arg())
                .arg(
                    arg!(-n --count [N] "Number of programs")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(seed_arg())
                .arg(output_arg()),
        ))
        .subcommand(depth_args(
            Command::new("run")
                .about("Generates programs and runs each on an instance several times")
                .arg(domain_arg())
                .arg(
                    arg!(-i --instance <PATH> "Instance file, or a folder of knapsack instances")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-a --algorithms [N] "Number of generated programs")
                        .default_value("10")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    arg!(-r --repetitions [N] "Runs per program and instance")
                        .default_value("5")
                        .value_parser(value_parser!(usize)),
                )
                .arg(seed_arg())
                .arg(time_limit_arg())
                .arg(customers_arg())
                .arg(output_arg()),
        ))
        .subcommand(
            Command::new("execute")
                .about("Runs one program from a JSON file on an instance")
                .arg(domain_arg())
                .arg(
                    arg!(-i --instance <PATH> "Instance file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-p --program <PATH> "Program JSON file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(seed_arg())
                .arg(time_limit_arg())
                .arg(customers_arg())
                .arg(arg!(--trace "Include the full trace in the output"))
                .arg(output_arg()),
        )
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("generate", sub)) => generate(sub),
        Some(("run", sub)) => run(sub),
        Some(("execute", sub)) => execute(sub),
        _ => Err(Error::Config("unknown subcommand".into())),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn domain(sub: &ArgMatches) -> Result<Domain> {
    sub.get_one::<Domain>("domain")
        .copied()
        .ok_or_else(|| Error::Config("--domain is required".into()))
}

fn seed(sub: &ArgMatches) -> u64 {
    sub.get_one::<u64>("seed").copied().unwrap_or(0)
}

/// Seed of one repetition; wraps at `u64::MAX`.
fn repetition_seed(base: u64, repetition: usize) -> u64 {
    base.wrapping_add(repetition as u64)
}

fn positive(sub: &ArgMatches, name: &str) -> Result<usize> {
    match sub.get_one::<usize>(name).copied() {
        Some(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!("--{name} must be positive"))),
    }
}

fn generator_config(sub: &ArgMatches, domain: Domain) -> Result<GeneratorConfig> {
    let grammar = GrammarConfig::new(domain)
        .with_min_depth(sub.get_one::<usize>("min-depth").copied().unwrap_or(2))
        .with_max_depth(sub.get_one::<usize>("max-depth").copied().unwrap_or(5));
    let config = GeneratorConfig::new(domain).with_grammar(grammar);
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

fn interpreter(sub: &ArgMatches, grammar: GrammarConfig) -> Result<Interpreter> {
    let mut config = InterpreterConfig::default().with_grammar(grammar);
    if let Some(&seconds) = sub.get_one::<f64>("time-limit") {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(Error::Config(format!("--time-limit must be positive, got {seconds}")));
        }
        config = config.with_time_limit(Duration::from_secs_f64(seconds));
    }
    config.validate().map_err(Error::Config)?;
    Ok(Interpreter::new(config))
}

fn load_instances(sub: &ArgMatches, domain: Domain) -> Result<Vec<Problem>> {
    let path = sub
        .get_one::<PathBuf>("instance")
        .ok_or_else(|| Error::Config("--instance is required".into()))?;
    let problems: Vec<Problem> = match domain {
        Domain::Knapsack if path.is_dir() => knapsack::load_group(path)?.into_iter().map(Problem::from).collect(),
        Domain::Vrptw => {
            let customers = positive(sub, "customers")?;
            let loader = SolomonLoader::new().with_expected_customers(customers);
            loader.validate().map_err(Error::Config)?;
            vec![loader.from_path(path)?.into()]
        }
        _ => vec![io::load(domain, path)?],
    };
    if problems.is_empty() {
        return Err(Error::Config(format!("no instances found in {}", path.display())));
    }
    info!(count = problems.len(), path = %path.display(), "instances loaded");
    Ok(problems)
}

fn write_output(sub: &ArgMatches, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| Error::Config(e.to_string()))?;
    match sub.get_one::<PathBuf>("output") {
        Some(path) => write_file(path, &text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "output written");
    Ok(())
}

fn programs(sub: &ArgMatches, config: GeneratorConfig, count: usize) -> Result<Vec<Node>> {
    let generator = Generator::new(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed(sub));
    let fixed = sub.get_flag("fixed-shape");
    (0..count)
        .map(|_| {
            if fixed {
                generator.fixed_shape(&mut rng)
            } else {
                generator.ramped_half_and_half(&mut rng)
            }
        })
        .collect::<std::result::Result<_, _>>()
        .map_err(Error::from)
}

fn generate(sub: &ArgMatches) -> Result<()> {
    let domain = domain(sub)?;
    let count = positive(sub, "count")?;
    let trees = programs(sub, generator_config(sub, domain)?, count)?;
    let value = if trees.len() == 1 {
        trees[0].to_value()
    } else {
        Value::Array(trees.iter().map(Node::to_value).collect())
    };
    write_output(sub, &value)
}

fn summary(execution: &Execution, problem: &Problem, seed: u64) -> Value {
    let evaluation = execution.best.as_ref().map(|best| Evaluator::new(problem).evaluate(best));
    let status = match &execution.status {
        RunStatus::Completed => json!("completed"),
        RunStatus::BudgetExceeded => json!("budget_exceeded"),
        RunStatus::Failed { error } => json!({ "failed": error.to_string() }),
    };
    json!({
        "seed": seed,
        "status": status,
        "best_fitness": execution.best_fitness(),
        "objective": evaluation.map(|e| e.measure.objective()),
        "feasible": evaluation.map(|e| e.feasible),
        "gap_to_known": evaluation.and_then(|e| e.gap_to_known),
        "counters": execution.counters,
        "elapsed_s": execution.elapsed.as_secs_f64(),
    })
}

fn run(sub: &ArgMatches) -> Result<()> {
    let domain = domain(sub)?;
    let algorithms = positive(sub, "algorithms")?;
    let repetitions = positive(sub, "repetitions")?;
    let base_seed = seed(sub);
    let config = generator_config(sub, domain)?;
    let interpreter = interpreter(sub, config.grammar.clone())?;
    let problems = load_instances(sub, domain)?;
    let trees = programs(sub, config, algorithms)?;

    let mut report = Vec::with_capacity(trees.len());
    for (index, tree) in trees.iter().enumerate() {
        let mut instances = Vec::with_capacity(problems.len());
        for problem in &problems {
            let mut runs = Vec::with_capacity(repetitions);
            let mut scalars = Vec::with_capacity(repetitions);
            for repetition in 0..repetitions {
                let seed = repetition_seed(base_seed, repetition);
                let execution = interpreter.execute(tree, problem, seed)?;
                if let RunStatus::Failed { error } = &execution.status {
                    warn!(algorithm = index, instance = problem.name(), seed, %error, "run failed");
                }
                if let Some(f) = execution.best_fitness() {
                    scalars.push(f.scalar());
                }
                runs.push(summary(&execution, problem, seed));
            }
            let mean = (!scalars.is_empty()).then(|| scalars.iter().sum::<f64>() / scalars.len() as f64);
            let best = scalars.iter().copied().reduce(f64::min);
            info!(algorithm = index, instance = problem.name(), ?mean, ?best, "algorithm evaluated");
            instances.push(json!({
                "instance": problem.name(),
                "mean_fitness": mean,
                "best_fitness": best,
                "runs": runs,
            }));
        }
        report.push(json!({
            "algorithm": index,
            "program": tree.to_value(),
            "pseudocode": tree.pseudocode(),
            "instances": instances,
        }));
    }
    write_output(
        sub,
        &json!({
            "domain": domain.to_string(),
            "base_seed": base_seed,
            "repetitions": repetitions,
            "algorithms": report,
        }),
    )
}

fn execute(sub: &ArgMatches) -> Result<()> {
    let domain = domain(sub)?;
    let seed = seed(sub);
    let problems = load_instances(sub, domain)?;
    let program_path = sub
        .get_one::<PathBuf>("program")
        .ok_or_else(|| Error::Config("--program is required".into()))?;
    let text = fs::read_to_string(program_path).map_err(|source| Error::Io {
        path: program_path.clone(),
        source,
    })?;
    let tree = Node::from_json(&text).map_err(|e| Error::Config(format!("invalid program JSON: {e}")))?;
    // Hand-written programs may exceed the generation limits.
    let grammar = GrammarConfig::new(domain)
        .with_max_depth(tree.depth().max(5))
        .with_max_size(tree.size().max(100));
    let interpreter = interpreter(sub, grammar)?;

    let mut failure = None;
    let mut results = Vec::with_capacity(problems.len());
    for problem in &problems {
        let execution = interpreter.execute(&tree, problem, seed)?;
        let mut value = summary(&execution, problem, seed);
        value["instance"] = json!(problem.name());
        if sub.get_flag("trace") {
            value["trace"] = serde_json::to_value(&execution.trace).unwrap_or(Value::Null);
        }
        results.push(value);
        if let Err(e) = Error::check(execution) {
            failure.get_or_insert(e);
        }
    }
    let value = if results.len() == 1 {
        results.swap_remove(0)
    } else {
        Value::Array(results)
    };
    write_output(sub, &value)?;
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
