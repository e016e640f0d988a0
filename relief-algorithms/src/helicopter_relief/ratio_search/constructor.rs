use super::deadline::Deadline;
use super::demand::DemandCounters;
use relief_challenges::helicopter_relief::*;
use tracing::trace;

/// Remaining cumulative distance below which a helicopter stops flying.
const BUDGET_EPSILON: f64 = 1e-6;

/// A village chosen for the trip under construction.
struct Stop {
    village_idx: usize,
    drop: Drop,
    weight: f64,
    net_value: f64,
}

/// Greedy builder of multi-stop round trips for a fixed dry-food ratio. Deterministic for a
/// given problem and ratio.
pub struct TripConstructor<'a> {
    problem: &'a ProblemData,
    deadline: &'a Deadline<'a>,
    dry_ratio: f64,
    blended_food_weight: f64,
}

impl<'a> TripConstructor<'a> {
    pub fn new(problem: &'a ProblemData, dry_ratio: f64, deadline: &'a Deadline<'a>) -> Self {
        let blended_food_weight = dry_ratio * problem.packages.dry().weight
            + (1.0 - dry_ratio) * problem.packages.perishable().weight;
        Self {
            problem,
            deadline,
            dry_ratio,
            blended_food_weight,
        }
    }

    /// Runs one construction pass over the whole fleet with fresh demand counters.
    /// Helicopters that fly no trip are left out.
    pub fn build_solution(&self) -> Solution {
        let mut demand = DemandCounters::new(&self.problem.villages);
        let mut solution = Solution::new();
        for helicopter in &self.problem.helicopters {
            if self.deadline.expired() {
                break;
            }
            let plan = self.build_plan(helicopter, &mut demand);
            if !plan.trips.is_empty() {
                solution.plans.push(plan);
            }
        }
        solution
    }

    fn build_plan(&self, helicopter: &Helicopter, demand: &mut DemandCounters) -> HelicopterPlan {
        let mut plan = HelicopterPlan {
            helicopter_id: helicopter.id,
            trips: Vec::new(),
        };
        let home = match self.problem.home_of(helicopter) {
            Ok(home) => *home,
            Err(_) => return plan,
        };

        let mut budget = self.problem.d_max;
        while budget > BUDGET_EPSILON {
            if self.deadline.expired() {
                break;
            }
            let Some(first) = self.best_first_stop(helicopter, &home, budget, demand) else {
                break;
            };
            let mut stops = vec![first];
            while let Some(next) = self.best_next_stop(helicopter, &home, budget, &stops, demand) {
                stops.push(next);
            }

            let trip_distance = round_trip_distance(
                &home,
                stops
                    .iter()
                    .map(|stop| &self.problem.villages[stop.village_idx].coords),
            );
            for stop in &stops {
                demand.commit(stop.village_idx, &stop.drop);
            }
            trace!(
                helicopter_id = helicopter.id,
                stops = stops.len(),
                trip_distance,
                estimated_net = stops.iter().map(|stop| stop.net_value).sum::<f64>(),
                "trip built"
            );
            plan.trips.push(Trip::from_drops(
                stops.into_iter().map(|stop| stop.drop).collect(),
            ));
            budget -= trip_distance;
        }
        plan
    }

    /// Most profitable single-village round trip, if any has a positive net value.
    fn best_first_stop(
        &self,
        helicopter: &Helicopter,
        home: &Point,
        budget: f64,
        demand: &DemandCounters,
    ) -> Option<Stop> {
        let mut best: Option<Stop> = None;
        for (idx, village) in self.problem.villages.iter().enumerate() {
            if self.deadline.expired() {
                break;
            }
            if !demand.has_demand(idx) {
                continue;
            }
            let trip_distance = 2.0 * distance(home, &village.coords);
            if trip_distance > helicopter.distance_capacity || trip_distance > budget {
                continue;
            }
            if self.blended_food_weight < EPSILON {
                continue;
            }
            let Some((drop, weight)) = self.delivery_mix(
                idx,
                helicopter.weight_capacity,
                self.blended_food_weight,
                demand,
            ) else {
                continue;
            };

            let net_value = self.marginal_value(idx, &drop, demand) - helicopter.trip_cost(trip_distance);
            if net_value > best.as_ref().map_or(0.0, |stop| stop.net_value) {
                best = Some(Stop {
                    village_idx: idx,
                    drop,
                    weight,
                    net_value,
                });
            }
        }
        best
    }

    /// Most profitable village to append at the end of the route, if any adds positive net value.
    fn best_next_stop(
        &self,
        helicopter: &Helicopter,
        home: &Point,
        budget: f64,
        stops: &[Stop],
        demand: &DemandCounters,
    ) -> Option<Stop> {
        let villages = &self.problem.villages;
        let last = &villages[stops.last()?.village_idx].coords;
        let closing_leg = distance(last, home);
        let remaining_weight =
            helicopter.weight_capacity - stops.iter().map(|stop| stop.weight).sum::<f64>();

        let mut best: Option<Stop> = None;
        for (idx, village) in villages.iter().enumerate() {
            if self.deadline.expired() {
                break;
            }
            if !demand.has_demand(idx) || stops.iter().any(|stop| stop.village_idx == idx) {
                continue;
            }
            let distance_added =
                distance(last, &village.coords) + distance(&village.coords, home) - closing_leg;
            let new_route_distance = round_trip_distance(
                home,
                stops
                    .iter()
                    .map(|stop| &villages[stop.village_idx].coords)
                    .chain(std::iter::once(&village.coords)),
            );
            if new_route_distance > helicopter.distance_capacity || new_route_distance > budget {
                continue;
            }
            if remaining_weight <= EPSILON {
                continue;
            }
            let Some((drop, weight)) = self.delivery_mix(
                idx,
                remaining_weight,
                self.blended_food_weight + EPSILON,
                demand,
            ) else {
                continue;
            };
            if drop.total_units() == 0 {
                continue;
            }

            let net_value = self.marginal_value(idx, &drop, demand) - helicopter.alpha * distance_added;
            if net_value > best.as_ref().map_or(0.0, |stop| stop.net_value) {
                best = Some(Stop {
                    village_idx: idx,
                    drop,
                    weight,
                    net_value,
                });
            }
        }
        best
    }

    /// Splits the food that fits in `available_weight` by the dry ratio and tops up with
    /// other supplies. Returns the drop and its weight, or `None` when rounding overloads it.
    fn delivery_mix(
        &self,
        village_idx: usize,
        available_weight: f64,
        food_weight_divisor: f64,
        demand: &DemandCounters,
    ) -> Option<(Drop, f64)> {
        let packages = &self.problem.packages;
        let food = demand
            .food(village_idx)
            .min((available_weight / food_weight_divisor) as i64)
            .max(0);
        let dry_food = (food as f64 * self.dry_ratio) as i64;
        let perishable_food = food - dry_food;

        let food_weight = packages.load_weight(dry_food, perishable_food, 0);
        if food_weight > available_weight + EPSILON {
            return None;
        }

        let leftover = available_weight - food_weight;
        let other_weight = packages.other().weight;
        let other_supplies = if other_weight > EPSILON && leftover > EPSILON {
            demand
                .other(village_idx)
                .min((leftover / other_weight) as i64)
                .max(0)
        } else {
            0
        };

        let weight = food_weight + other_supplies as f64 * other_weight;
        if weight > available_weight + EPSILON {
            return None;
        }
        Some((
            Drop {
                village_id: self.problem.villages[village_idx].id,
                dry_food,
                perishable_food,
                other_supplies,
            },
            weight,
        ))
    }

    fn marginal_value(&self, village_idx: usize, drop: &Drop, demand: &DemandCounters) -> f64 {
        let village = &self.problem.villages[village_idx];
        delivery_value(
            village,
            &self.problem.packages,
            drop.dry_food,
            drop.perishable_food,
            drop.other_supplies,
            village.food_cap() - demand.food(village_idx),
            village.other_cap() - demand.other(village_idx),
        )
    }
}
