use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use relief_algorithms::helicopter_relief::ratio_search::{self, Solver};
use relief_challenges::helicopter_relief::{ProblemData, Solution, Track};
use relief_utils::{
    compress_obj, dejsonify, init_logging, jsonify, jsonify_pretty, load_obj, read_json_arg,
};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

fn cli() -> Command {
    Command::new("relief-runtime")
        .about("Plans, verifies or generates helicopter relief deliveries")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Searches for a delivery plan within the problem's time limit")
                .arg(
                    arg!(<PROBLEM> "Problem json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for the search, overrides the hyperparameters")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the solution will be saved to this file path (default json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress "If output file is set, the solution will be compressed as zlib")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"log-file" [LOG_FILE] "If set, JSON logs are also written to this file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Verifies a solution and prints its evaluation")
                .arg(
                    arg!(<PROBLEM> "Problem json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to a json or zlib file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates a random problem")
                .arg(arg!(<SEED> "Seed for the instance").value_parser(clap::value_parser!(u64)))
                .arg(
                    arg!(--cities [CITIES] "Number of cities")
                        .default_value("3")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--villages [VILLAGES] "Number of villages")
                        .default_value("50")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--helicopters [HELICOPTERS] "Number of helicopters")
                        .default_value("5")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"time-limit" [MINUTES] "Time limit in minutes")
                        .default_value("1.0")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(arg!(--pretty "Indent the generated json").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("help-algorithm").about("Lists the search hyperparameters"))
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<String>("PROBLEM").cloned().unwrap_or_default(),
            sub_m.get_one::<String>("hyperparameters").cloned(),
            sub_m.get_one::<u64>("seed").copied(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            sub_m.get_flag("compress"),
            sub_m.get_one::<PathBuf>("log-file").cloned(),
        ),
        Some(("verify", sub_m)) => verify(
            sub_m.get_one::<String>("PROBLEM").cloned().unwrap_or_default(),
            sub_m.get_one::<String>("SOLUTION").cloned().unwrap_or_default(),
        ),
        Some(("generate", sub_m)) => generate(
            sub_m.get_one::<u64>("SEED").copied().unwrap_or_default(),
            Track {
                num_cities: sub_m.get_one::<usize>("cities").copied().unwrap_or(3),
                num_villages: sub_m.get_one::<usize>("villages").copied().unwrap_or(50),
                num_helicopters: sub_m.get_one::<usize>("helicopters").copied().unwrap_or(5),
            },
            sub_m.get_one::<f64>("time-limit").copied().unwrap_or(1.0),
            sub_m.get_flag("pretty"),
        ),
        Some(("help-algorithm", _)) => {
            ratio_search::help();
            Ok(())
        }
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn solve(
    problem: String,
    hyperparameters: Option<String>,
    seed: Option<u64>,
    output_file: Option<PathBuf>,
    compress: bool,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let _guard = init_logging(log_file)?;
    let problem = load_problem(&problem)?;
    let hyperparameters = load_hyperparameters(hyperparameters.as_deref(), seed)?;

    let report = Solver::solve_challenge_instance(&problem, &hyperparameters)?;
    info!(
        restarts = report.stats.restarts,
        iterations = report.stats.iterations,
        improvements = report.stats.improvements,
        "search statistics"
    );
    eprintln!(
        "score: {:.4} (value {:.4}, cost {:.4}, distance {:.4})",
        report.evaluation.score(),
        report.evaluation.value,
        report.evaluation.cost,
        report.evaluation.distance
    );

    if let Some(path) = output_file {
        if compress {
            fs::write(&path, compress_obj(&report.solution)?)?;
        } else {
            fs::write(&path, jsonify(&report.solution)?)?;
        }
        eprintln!("solution written to: {:?}", path);
    } else {
        println!("{}", jsonify(&report.solution)?);
    }
    Ok(())
}

pub fn verify(problem: String, solution: String) -> Result<()> {
    let problem = load_problem(&problem)?;
    let solution = load_solution(&solution)?;

    problem
        .verify_solution(&solution)
        .map_err(|e| anyhow!("Invalid solution: {}", e))?;
    let evaluation = problem.evaluate_solution(&solution)?;
    println!("Solution is valid");
    println!("{}", jsonify(&evaluation)?);
    Ok(())
}

pub fn generate(seed: u64, track: Track, time_limit_minutes: f64, pretty: bool) -> Result<()> {
    let mut problem = ProblemData::generate_instance(&expand_seed(seed), &track)?;
    problem.time_limit_minutes = time_limit_minutes;
    problem.validate()?;
    if pretty {
        println!("{}", jsonify_pretty(&problem)?);
    } else {
        println!("{}", jsonify(&problem)?);
    }
    Ok(())
}

fn load_problem(problem: &str) -> Result<ProblemData> {
    let problem = dejsonify::<ProblemData>(&read_json_arg(problem)?)
        .map_err(|e| anyhow!("Failed to parse problem: {}", e))?;
    problem.validate()?;
    Ok(problem)
}

/// Files written by `solve --output`, compressed or not, load directly.
fn load_solution(solution: &str) -> Result<Solution> {
    if solution != "-" && Path::new(solution).is_file() {
        return load_obj::<Solution>(solution)
            .map_err(|e| anyhow!("Failed to load solution file {}: {}", solution, e));
    }
    dejsonify::<Solution>(&read_json_arg(solution)?)
        .map_err(|e| anyhow!("Failed to parse solution: {}", e))
}

fn load_hyperparameters(
    hyperparameters: Option<&str>,
    seed: Option<u64>,
) -> Result<Option<Map<String, Value>>> {
    let mut map = match hyperparameters {
        Some(h) => Some(
            dejsonify::<Map<String, Value>>(&read_json_arg(h)?)
                .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))?,
        ),
        None => None,
    };
    if let Some(seed) = seed {
        map.get_or_insert_with(Map::new)
            .insert("seed".to_string(), Value::from(seed));
    }
    Ok(map)
}

fn expand_seed(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for chunk in bytes.chunks_mut(8) {
        chunk.copy_from_slice(&seed.to_le_bytes());
    }
    bytes
}
