use super::{delivery_value, ProblemData, Solution};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Authoritative score of a solution, split into its parts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    pub value: f64,
    pub cost: f64,
    pub distance: f64,
}

impl Evaluation {
    pub fn score(&self) -> f64 {
        self.value - self.cost
    }
}

impl ProblemData {
    /// Recomputes cost and delivered value of `solution` from scratch. Village caps are
    /// applied once across every plan and trip, in encounter order.
    pub fn evaluate_solution(&self, solution: &Solution) -> Result<Evaluation> {
        let mut counted_food = vec![0i64; self.villages.len()];
        let mut counted_other = vec![0i64; self.villages.len()];
        let mut evaluation = Evaluation::default();

        for plan in &solution.plans {
            let helicopter = self.helicopter(plan.helicopter_id)?;
            let home = self.home_of(helicopter)?;

            for trip in &plan.trips {
                if trip.drops.is_empty() {
                    continue;
                }
                let trip_distance = self.trip_distance(home, trip)?;
                evaluation.distance += trip_distance;
                evaluation.cost += helicopter.trip_cost(trip_distance);

                for drop in &trip.drops {
                    let idx = self.village_index(drop.village_id)?;
                    evaluation.value += delivery_value(
                        &self.villages[idx],
                        &self.packages,
                        drop.dry_food,
                        drop.perishable_food,
                        drop.other_supplies,
                        counted_food[idx],
                        counted_other[idx],
                    );
                    counted_food[idx] += drop.food();
                    counted_other[idx] += drop.other_supplies;
                }
            }
        }
        Ok(evaluation)
    }
}
