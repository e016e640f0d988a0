use super::config::Config;
use super::deadline::{Clock, Deadline, SystemClock};
use super::search::{RatioSearch, SearchStats};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use relief_challenges::helicopter_relief::{Evaluation, ProblemData, Solution};
use serde_json::{Map, Value};
use tracing::info;

/// Sanitized result of a full solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub solution: Solution,
    pub evaluation: Evaluation,
    pub stats: SearchStats,
}

pub struct Solver;

impl Solver {
    /// Runs the ratio search until the deadline and passes the best candidate through the
    /// sanitizer. Returns the empty solution when nothing was scored in time.
    pub fn solve<R: Rng>(
        problem: &ProblemData,
        config: &Config,
        deadline: &Deadline,
        rng: &mut R,
    ) -> Result<SolveReport> {
        let outcome = RatioSearch::new(problem, config, deadline).run(rng)?;
        let solution = match outcome.best {
            Some(best) => problem.sanitize_solution(&best.solution),
            None => Solution::new(),
        };
        let evaluation = problem.evaluate_solution(&solution)?;
        info!(
            score = evaluation.score(),
            value = evaluation.value,
            cost = evaluation.cost,
            helicopters = solution.plans.len(),
            trips = solution.num_trips(),
            restarts = outcome.stats.restarts,
            iterations = outcome.stats.iterations,
            "search finished"
        );
        Ok(SolveReport {
            solution,
            evaluation,
            stats: outcome.stats,
        })
    }

    pub fn solve_with_clock(
        problem: &ProblemData,
        hyperparameters: &Option<Map<String, Value>>,
        clock: &dyn Clock,
    ) -> Result<SolveReport> {
        let config = Config::initialize(hyperparameters);
        let deadline =
            Deadline::from_time_limit(clock, problem.time_limit_minutes, config.deadline_fraction);
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::solve(problem, &config, &deadline, &mut rng)
    }

    pub fn solve_challenge_instance(
        problem: &ProblemData,
        hyperparameters: &Option<Map<String, Value>>,
    ) -> Result<SolveReport> {
        let clock = SystemClock::start();
        Self::solve_with_clock(problem, hyperparameters, &clock)
    }
}
