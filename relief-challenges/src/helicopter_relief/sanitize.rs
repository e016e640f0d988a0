use super::{Helicopter, HelicopterPlan, Point, ProblemData, Solution, Trip, EPSILON};
use tracing::debug;

impl ProblemData {
    /// Returns a copy of `solution` without the trips and plans that break a feasibility
    /// rule. Surviving trips are kept untouched and in their original order.
    pub fn sanitize_solution(&self, solution: &Solution) -> Solution {
        let mut sanitized = Solution::new();

        for plan in &solution.plans {
            let helicopter = match self.helicopter(plan.helicopter_id) {
                Ok(helicopter) => helicopter,
                Err(e) => {
                    debug!(helicopter_id = plan.helicopter_id, "dropping plan: {}", e);
                    continue;
                }
            };
            let home = match self.home_of(helicopter) {
                Ok(home) => home,
                Err(e) => {
                    debug!(helicopter_id = helicopter.id, "dropping plan: {}", e);
                    continue;
                }
            };

            let mut kept = HelicopterPlan {
                helicopter_id: plan.helicopter_id,
                trips: Vec::new(),
            };
            let mut used_distance = 0.0;
            for (trip_idx, trip) in plan.trips.iter().enumerate() {
                match self.check_trip(helicopter, home, trip, used_distance) {
                    Ok(trip_distance) => {
                        used_distance += trip_distance;
                        kept.trips.push(trip.clone());
                    }
                    Err(reason) => {
                        debug!(helicopter_id = helicopter.id, trip_idx, reason, "dropping trip");
                    }
                }
            }

            if !kept.trips.is_empty() {
                sanitized.plans.push(kept);
            }
        }
        sanitized
    }

    fn check_trip(
        &self,
        helicopter: &Helicopter,
        home: &Point,
        trip: &Trip,
        used_distance: f64,
    ) -> Result<f64, &'static str> {
        if trip.drops.is_empty() {
            return Err("no drops");
        }
        if !trip.pickups_match_drops() {
            return Err("pickups differ from drops");
        }
        if trip.has_negative() {
            return Err("negative quantity");
        }
        let trip_distance = self
            .trip_distance(home, trip)
            .map_err(|_| "unknown village")?;
        if trip_distance > helicopter.distance_capacity + EPSILON {
            return Err("trip distance over capacity");
        }
        if used_distance + trip_distance > self.d_max + EPSILON {
            return Err("cumulative distance over budget");
        }
        if self.trip_weight(trip) > helicopter.weight_capacity + EPSILON {
            return Err("weight over capacity");
        }
        Ok(trip_distance)
    }
}
