use super::config::Config;
use super::constructor::TripConstructor;
use super::deadline::Deadline;
use anyhow::Result;
use rand::Rng;
use relief_challenges::helicopter_relief::{Evaluation, ProblemData, Solution};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedSolution {
    pub solution: Solution,
    pub evaluation: Evaluation,
}

impl EvaluatedSolution {
    pub fn score(&self) -> f64 {
        self.evaluation.score()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub restarts: usize,
    pub iterations: usize,
    pub improvements: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best candidate across all restarts, `None` if nothing was scored before the deadline.
    pub best: Option<EvaluatedSolution>,
    pub stats: SearchStats,
}

/// Local search state of one restart.
struct Restart {
    dry_ratio: f64,
    step: f64,
    direction: f64,
    temperature: f64,
    previous_score: Option<f64>,
    no_improvement: usize,
}

impl Restart {
    fn new(start_ratio: f64, config: &Config) -> Self {
        Self {
            dry_ratio: start_ratio.clamp(0.0, 1.0),
            step: config.initial_step,
            direction: 1.0,
            temperature: config.initial_temperature,
            previous_score: None,
            no_improvement: 0,
        }
    }

    /// Moves the ratio after scoring a candidate. A worse score is accepted with the
    /// annealing probability; a rejected move reverses direction and shortens the step.
    fn advance<R: Rng>(&mut self, score: f64, rng: &mut R, config: &Config) {
        match self.previous_score {
            None => {}
            Some(previous) if score < previous => {
                let acceptance = ((score - previous) / self.temperature).exp();
                if rng.gen::<f64>() >= acceptance {
                    self.direction = -self.direction;
                    self.step *= config.step_shrink;
                }
            }
            Some(_) => self.step *= config.step_growth,
        }
        self.previous_score = Some(score);
        self.dry_ratio = (self.dry_ratio + self.direction * self.step).clamp(0.0, 1.0);
        self.step = self.step.max(config.min_step).min(config.max_step);
        self.temperature *= config.cooling_rate;
    }
}

/// Anytime search over the dry-food ratio fed to the trip constructor.
pub struct RatioSearch<'a> {
    problem: &'a ProblemData,
    config: &'a Config,
    deadline: &'a Deadline<'a>,
}

impl<'a> RatioSearch<'a> {
    pub fn new(problem: &'a ProblemData, config: &'a Config, deadline: &'a Deadline<'a>) -> Self {
        Self {
            problem,
            config,
            deadline,
        }
    }

    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<SearchOutcome> {
        let mut best: Option<EvaluatedSolution> = None;
        let mut stats = SearchStats::default();

        for &start_ratio in &self.config.starting_ratios {
            if self.deadline.expired() {
                break;
            }
            stats.restarts += 1;
            let iterations = self.restart(start_ratio, rng, &mut best, &mut stats)?;
            info!(
                start_ratio,
                iterations,
                best_score = best.as_ref().map(EvaluatedSolution::score),
                "restart finished"
            );
        }

        Ok(SearchOutcome { best, stats })
    }

    /// Returns the number of candidates scored by this restart.
    fn restart<R: Rng>(
        &self,
        start_ratio: f64,
        rng: &mut R,
        best: &mut Option<EvaluatedSolution>,
        stats: &mut SearchStats,
    ) -> Result<usize> {
        let mut state = Restart::new(start_ratio, self.config);
        let mut iterations = 0;

        loop {
            if self.deadline.expired() {
                break;
            }
            let solution =
                TripConstructor::new(self.problem, state.dry_ratio, self.deadline).build_solution();
            let evaluation = self.problem.evaluate_solution(&solution)?;
            let score = evaluation.score();
            iterations += 1;
            stats.iterations += 1;

            let gain = match best.as_ref() {
                None => Some(f64::INFINITY),
                Some(incumbent) if score > incumbent.score() => Some(score - incumbent.score()),
                Some(_) => None,
            };
            match gain {
                Some(gain) => {
                    debug!(dry_ratio = state.dry_ratio, score, gain, "new best");
                    stats.improvements += 1;
                    *best = Some(EvaluatedSolution {
                        solution,
                        evaluation,
                    });
                    if gain >= self.config.min_improvement {
                        state.no_improvement = 0;
                    } else {
                        state.no_improvement += 1;
                    }
                }
                None => state.no_improvement += 1,
            }

            if state.no_improvement >= self.config.max_no_improvement {
                break;
            }
            state.advance(score, rng, self.config);
        }
        Ok(iterations)
    }
}
