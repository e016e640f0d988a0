mod evaluation;
mod geometry;
mod sanitize;
mod value;

pub use evaluation::Evaluation;
pub use geometry::{distance, round_trip_distance, Point};
pub use value::{counted_units, delivery_value, CountedUnits};

use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Index;

/// Tolerance used by every feasibility comparison on distances and weights.
pub const EPSILON: f64 = 1e-9;

/// Food units a village can absorb per inhabitant (dry and perishable combined).
pub const FOOD_UNITS_PER_PERSON: i64 = 9;
/// Other-supply units a village can absorb per inhabitant.
pub const OTHER_UNITS_PER_PERSON: i64 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Dry = 0,
    Perishable = 1,
    Other = 2,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PackageInfo {
    pub weight: f64,
    pub value: f64,
}

/// The three package kinds in their fixed order `[dry, perishable, other]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Packages(pub [PackageInfo; 3]);

impl Packages {
    pub fn dry(&self) -> &PackageInfo {
        &self[PackageKind::Dry]
    }

    pub fn perishable(&self) -> &PackageInfo {
        &self[PackageKind::Perishable]
    }

    pub fn other(&self) -> &PackageInfo {
        &self[PackageKind::Other]
    }

    pub fn load_weight(&self, dry: i64, perishable: i64, other: i64) -> f64 {
        dry as f64 * self.dry().weight
            + perishable as f64 * self.perishable().weight
            + other as f64 * self.other().weight
    }
}

impl Index<PackageKind> for Packages {
    type Output = PackageInfo;

    fn index(&self, kind: PackageKind) -> &PackageInfo {
        &self.0[kind as usize]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Village {
    pub id: usize,
    pub population: u32,
    pub coords: Point,
}

impl Village {
    pub fn food_cap(&self) -> i64 {
        FOOD_UNITS_PER_PERSON * self.population as i64
    }

    pub fn other_cap(&self) -> i64 {
        OTHER_UNITS_PER_PERSON * self.population as i64
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Helicopter {
    pub id: usize,
    pub home_city_id: usize,
    pub weight_capacity: f64,
    pub distance_capacity: f64,
    pub fixed_cost: f64,
    pub alpha: f64,
}

impl Helicopter {
    pub fn trip_cost(&self, distance: f64) -> f64 {
        self.fixed_cost + self.alpha * distance
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drop {
    pub village_id: usize,
    pub dry_food: i64,
    pub perishable_food: i64,
    pub other_supplies: i64,
}

impl Drop {
    pub fn food(&self) -> i64 {
        self.dry_food + self.perishable_food
    }

    pub fn total_units(&self) -> i64 {
        self.dry_food + self.perishable_food + self.other_supplies
    }

    pub fn has_negative(&self) -> bool {
        self.dry_food < 0 || self.perishable_food < 0 || self.other_supplies < 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Trip {
    pub drops: Vec<Drop>,
    pub dry_food_pickup: i64,
    pub perishable_food_pickup: i64,
    pub other_supplies_pickup: i64,
}

impl Trip {
    /// Builds a trip whose pickups are the sums over `drops`.
    pub fn from_drops(drops: Vec<Drop>) -> Self {
        let (dry_food_pickup, perishable_food_pickup, other_supplies_pickup) =
            Self::drop_totals_of(&drops);
        Self {
            drops,
            dry_food_pickup,
            perishable_food_pickup,
            other_supplies_pickup,
        }
    }

    pub fn drop_totals(&self) -> (i64, i64, i64) {
        Self::drop_totals_of(&self.drops)
    }

    pub fn pickups_match_drops(&self) -> bool {
        self.drop_totals()
            == (
                self.dry_food_pickup,
                self.perishable_food_pickup,
                self.other_supplies_pickup,
            )
    }

    pub fn has_negative(&self) -> bool {
        self.dry_food_pickup < 0
            || self.perishable_food_pickup < 0
            || self.other_supplies_pickup < 0
            || self.drops.iter().any(Drop::has_negative)
    }

    fn drop_totals_of(drops: &[Drop]) -> (i64, i64, i64) {
        drops.iter().fold((0, 0, 0), |(dry, perishable, other), drop| {
            (
                dry + drop.dry_food,
                perishable + drop.perishable_food,
                other + drop.other_supplies,
            )
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct HelicopterPlan {
    pub helicopter_id: usize,
    pub trips: Vec<Trip>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Solution {
    pub plans: Vec<HelicopterPlan>,
}

impl Solution {
    pub fn new() -> Self {
        Self { plans: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn num_trips(&self) -> usize {
        self.plans.iter().map(|plan| plan.trips.len()).sum()
    }
}

/// Size of a randomly generated instance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub num_cities: usize,
    pub num_villages: usize,
    pub num_helicopters: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProblemData {
    pub cities: Vec<Point>,
    pub villages: Vec<Village>,
    pub helicopters: Vec<Helicopter>,
    pub packages: Packages,
    pub d_max: f64,
    pub time_limit_minutes: f64,
}

impl ProblemData {
    pub fn generate_instance(seed: &[u8; 32], track: &Track) -> Result<Self> {
        if track.num_cities == 0 {
            return Err(anyhow!("An instance needs at least one city"));
        }
        let mut rng = SmallRng::from_seed(*seed);
        let side = 1000.0;

        let cities: Vec<Point> = (0..track.num_cities)
            .map(|_| Point::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side)))
            .collect();

        // villages gather around cities so that most of them are reachable
        let villages: Vec<Village> = (1..=track.num_villages)
            .map(|id| {
                let anchor = cities[rng.gen_range(0..cities.len())];
                let coords = Point::new(
                    (anchor.x + rng.gen_range(-250.0..250.0)).clamp(0.0, side),
                    (anchor.y + rng.gen_range(-250.0..250.0)).clamp(0.0, side),
                );
                Village {
                    id,
                    population: rng.gen_range(5..=400),
                    coords,
                }
            })
            .collect();

        let helicopters: Vec<Helicopter> = (1..=track.num_helicopters)
            .map(|id| Helicopter {
                id,
                home_city_id: rng.gen_range(1..=cities.len()),
                weight_capacity: rng.gen_range(100.0..1500.0),
                distance_capacity: rng.gen_range(300.0..1200.0),
                fixed_cost: rng.gen_range(10.0..100.0),
                alpha: rng.gen_range(0.5..3.0),
            })
            .collect();

        let dry_value = rng.gen_range(5.0..15.0);
        let packages = Packages([
            PackageInfo {
                weight: rng.gen_range(0.5..1.5),
                value: dry_value,
            },
            PackageInfo {
                weight: rng.gen_range(1.0..3.0),
                value: dry_value * rng.gen_range(1.1..2.0),
            },
            PackageInfo {
                weight: rng.gen_range(1.0..5.0),
                value: rng.gen_range(2.0..20.0),
            },
        ]);

        let problem = ProblemData {
            cities,
            villages,
            helicopters,
            packages,
            d_max: rng.gen_range(2000.0..8000.0),
            time_limit_minutes: 1.0,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Structural checks on loaded input. The solver assumes they hold.
    pub fn validate(&self) -> Result<()> {
        if self.cities.is_empty() {
            return Err(anyhow!("Problem must contain at least one city"));
        }
        for (idx, village) in self.villages.iter().enumerate() {
            if village.id != idx + 1 {
                return Err(anyhow!(
                    "Village ids must be dense and 1-based: found id {} at position {}",
                    village.id,
                    idx + 1
                ));
            }
        }
        for (idx, helicopter) in self.helicopters.iter().enumerate() {
            if helicopter.id != idx + 1 {
                return Err(anyhow!(
                    "Helicopter ids must be dense and 1-based: found id {} at position {}",
                    helicopter.id,
                    idx + 1
                ));
            }
            if helicopter.home_city_id == 0 || helicopter.home_city_id > self.cities.len() {
                return Err(anyhow!(
                    "Helicopter {} has unknown home city {}",
                    helicopter.id,
                    helicopter.home_city_id
                ));
            }
            for (name, field) in [
                ("weight_capacity", helicopter.weight_capacity),
                ("distance_capacity", helicopter.distance_capacity),
                ("fixed_cost", helicopter.fixed_cost),
                ("alpha", helicopter.alpha),
            ] {
                if !field.is_finite() || field < 0.0 {
                    return Err(anyhow!(
                        "Helicopter {} has invalid {} ({})",
                        helicopter.id,
                        name,
                        field
                    ));
                }
            }
        }
        for (kind, package) in [
            PackageKind::Dry,
            PackageKind::Perishable,
            PackageKind::Other,
        ]
        .into_iter()
        .map(|kind| (kind, &self.packages[kind]))
        {
            if !package.weight.is_finite()
                || package.weight < 0.0
                || !package.value.is_finite()
                || package.value < 0.0
            {
                return Err(anyhow!("Package {:?} has invalid weight or value", kind));
            }
        }
        if !self.d_max.is_finite() || self.d_max < 0.0 {
            return Err(anyhow!("d_max must be finite and non-negative ({})", self.d_max));
        }
        if !self.time_limit_minutes.is_finite() || self.time_limit_minutes < 0.0 {
            return Err(anyhow!(
                "time_limit_minutes must be finite and non-negative ({})",
                self.time_limit_minutes
            ));
        }
        Ok(())
    }

    pub fn helicopter(&self, helicopter_id: usize) -> Result<&Helicopter> {
        helicopter_id
            .checked_sub(1)
            .and_then(|idx| self.helicopters.get(idx))
            .ok_or_else(|| anyhow!("Unknown helicopter id {}", helicopter_id))
    }

    pub fn village_index(&self, village_id: usize) -> Result<usize> {
        match village_id.checked_sub(1) {
            Some(idx) if idx < self.villages.len() => Ok(idx),
            _ => Err(anyhow!("Unknown village id {}", village_id)),
        }
    }

    pub fn home_of(&self, helicopter: &Helicopter) -> Result<&Point> {
        helicopter
            .home_city_id
            .checked_sub(1)
            .and_then(|idx| self.cities.get(idx))
            .ok_or_else(|| {
                anyhow!(
                    "Helicopter {} has unknown home city {}",
                    helicopter.id,
                    helicopter.home_city_id
                )
            })
    }

    /// Round-trip distance from `home` through every drop of `trip` in order.
    pub fn trip_distance(&self, home: &Point, trip: &Trip) -> Result<f64> {
        let stops = trip
            .drops
            .iter()
            .map(|drop| {
                self.village_index(drop.village_id)
                    .map(|idx| &self.villages[idx].coords)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(round_trip_distance(home, stops))
    }

    /// Weight loaded at the home city, taken from the trip's pickups.
    pub fn trip_weight(&self, trip: &Trip) -> f64 {
        self.packages.load_weight(
            trip.dry_food_pickup,
            trip.perishable_food_pickup,
            trip.other_supplies_pickup,
        )
    }

    /// Strict feasibility check. Unlike `sanitize_solution`, any violation is an error.
    pub fn verify_solution(&self, solution: &Solution) -> Result<()> {
        let mut seen_helicopters = HashSet::new();
        let mut food_delivered = vec![0i64; self.villages.len()];
        let mut other_delivered = vec![0i64; self.villages.len()];

        for plan in &solution.plans {
            let helicopter = self.helicopter(plan.helicopter_id)?;
            if !seen_helicopters.insert(helicopter.id) {
                return Err(anyhow!(
                    "Helicopter {} has more than one plan",
                    helicopter.id
                ));
            }
            let home = self.home_of(helicopter)?;
            let mut total_distance = 0.0;

            for (trip_idx, trip) in plan.trips.iter().enumerate() {
                if trip.drops.is_empty() {
                    return Err(anyhow!(
                        "Trip {} of helicopter {} has no drops",
                        trip_idx,
                        helicopter.id
                    ));
                }
                if trip.has_negative() {
                    return Err(anyhow!(
                        "Trip {} of helicopter {} contains a negative quantity",
                        trip_idx,
                        helicopter.id
                    ));
                }
                if !trip.pickups_match_drops() {
                    return Err(anyhow!(
                        "Trip {} of helicopter {} has pickups that differ from its drops",
                        trip_idx,
                        helicopter.id
                    ));
                }

                let trip_distance = self.trip_distance(home, trip)?;
                if trip_distance > helicopter.distance_capacity + EPSILON {
                    return Err(anyhow!(
                        "Trip {} of helicopter {} flies {} (capacity {})",
                        trip_idx,
                        helicopter.id,
                        trip_distance,
                        helicopter.distance_capacity
                    ));
                }
                total_distance += trip_distance;
                if total_distance > self.d_max + EPSILON {
                    return Err(anyhow!(
                        "Helicopter {} exceeds its distance budget {} at trip {}",
                        helicopter.id,
                        self.d_max,
                        trip_idx
                    ));
                }

                let trip_weight = self.trip_weight(trip);
                if trip_weight > helicopter.weight_capacity + EPSILON {
                    return Err(anyhow!(
                        "Trip {} of helicopter {} carries {} (capacity {})",
                        trip_idx,
                        helicopter.id,
                        trip_weight,
                        helicopter.weight_capacity
                    ));
                }

                for drop in &trip.drops {
                    let idx = self.village_index(drop.village_id)?;
                    food_delivered[idx] += drop.food();
                    other_delivered[idx] += drop.other_supplies;
                }
            }
        }

        for (idx, village) in self.villages.iter().enumerate() {
            if food_delivered[idx] > village.food_cap() {
                return Err(anyhow!(
                    "Village {} receives {} food units (cap {})",
                    village.id,
                    food_delivered[idx],
                    village.food_cap()
                ));
            }
            if other_delivered[idx] > village.other_cap() {
                return Err(anyhow!(
                    "Village {} receives {} other-supply units (cap {})",
                    village.id,
                    other_delivered[idx],
                    village.other_cap()
                ));
            }
        }
        Ok(())
    }
}
