mod config;
mod constructor;
mod deadline;
mod demand;
mod runner;
mod search;

pub use config::Config;
pub use constructor::TripConstructor;
pub use deadline::{Clock, Deadline, ManualClock, SystemClock};
pub use runner::{SolveReport, Solver};
pub use search::{EvaluatedSolution, RatioSearch, SearchOutcome, SearchStats};

use anyhow::Result;
use relief_challenges::helicopter_relief::*;
use serde_json::{Map, Value};

pub fn solve_challenge(
    problem: &ProblemData,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let report = Solver::solve_challenge_instance(problem, hyperparameters)?;
    save_solution(&report.solution)
}

pub fn help() {
    println!("Ratio search: greedy multi-stop trip construction tuned by annealing over the dry-food ratio");
    println!("");
    println!("HYPERPARAMETERS (all optional):");
    println!("  starting_ratios      dry-food fractions to restart from   [0.1, 0.3, 0.5, 0.7, 0.9]");
    println!("  initial_step         ratio step at the start of a restart  0.2");
    println!("  min_step / max_step  bounds on the ratio step              0.05 / 0.3");
    println!("  step_growth          step factor after a non-worse score   1.1");
    println!("  step_shrink          step factor after a rejected move     0.9");
    println!("  initial_temperature  annealing temperature                 100.0");
    println!("  cooling_rate         temperature factor per iteration      0.95");
    println!("  max_no_improvement   stagnant iterations before restarting 20");
    println!("  min_improvement      gain that resets stagnation           0.01");
    println!("  deadline_fraction    share of the time limit to use        0.95");
    println!("  seed                 seed for the acceptance draws         (entropy)");
}
