use rand::{rngs::StdRng, SeedableRng};
use relief_algorithms::helicopter_relief::ratio_search::*;
use relief_challenges::helicopter_relief::*;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::time::Duration;

fn package(weight: f64, value: f64) -> PackageInfo {
    PackageInfo { weight, value }
}

fn helicopter(id: usize, weight_capacity: f64, distance_capacity: f64) -> Helicopter {
    Helicopter {
        id,
        home_city_id: 1,
        weight_capacity,
        distance_capacity,
        fixed_cost: 1.0,
        alpha: 0.1,
    }
}

fn village(id: usize, population: u32, x: f64, y: f64) -> Village {
    Village {
        id,
        population,
        coords: Point::new(x, y),
    }
}

fn problem(villages: Vec<Village>, helicopters: Vec<Helicopter>, d_max: f64) -> ProblemData {
    ProblemData {
        cities: vec![Point::new(0.0, 0.0)],
        villages,
        helicopters,
        packages: Packages([package(1.0, 2.0), package(1.0, 3.0), package(1.0, 1.0)]),
        d_max,
        time_limit_minutes: 1.0,
    }
}

fn hyperparameters(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn village_totals(solution: &Solution, village_id: usize) -> (i64, i64) {
    solution
        .plans
        .iter()
        .flat_map(|plan| plan.trips.iter())
        .flat_map(|trip| trip.drops.iter())
        .filter(|drop| drop.village_id == village_id)
        .fold((0, 0), |(food, other), drop| {
            (food + drop.food(), other + drop.other_supplies)
        })
}

#[test]
fn test_constructor_is_deterministic() {
    let problem = ProblemData::generate_instance(
        &[3u8; 32],
        &Track {
            num_cities: 2,
            num_villages: 30,
            num_helicopters: 3,
        },
    )
    .unwrap();
    let clock = ManualClock::new();
    let deadline = Deadline::new(&clock, Duration::from_secs(60));

    for ratio in [0.0, 0.35, 1.0] {
        let a = TripConstructor::new(&problem, ratio, &deadline).build_solution();
        let b = TripConstructor::new(&problem, ratio, &deadline).build_solution();
        assert_eq!(a, b);
        problem.verify_solution(&a).unwrap();
        assert_eq!(problem.sanitize_solution(&a), a);
    }
}

#[test]
fn test_constructor_extends_trips_with_more_stops() {
    // two neighbouring villages far from home: one trip visiting both beats two trips
    let problem = problem(
        vec![village(1, 2, 50.0, 0.0), village(2, 2, 50.0, 1.0)],
        vec![helicopter(1, 1000.0, 500.0)],
        500.0,
    );
    let clock = ManualClock::new();
    let deadline = Deadline::new(&clock, Duration::from_secs(60));
    let solution = TripConstructor::new(&problem, 0.5, &deadline).build_solution();

    assert_eq!(solution.plans.len(), 1);
    assert_eq!(solution.plans[0].trips.len(), 1);
    let trip = &solution.plans[0].trips[0];
    assert_eq!(trip.drops.len(), 2);
    assert!(trip.pickups_match_drops());
    for drop in &trip.drops {
        assert_eq!(drop.food(), 18);
        assert_eq!(drop.other_supplies, 2);
    }
}

#[test]
fn test_single_village_converges() {
    let problem = problem(
        vec![village(1, 10, 3.0, 4.0)],
        vec![helicopter(1, 1000.0, 1000.0)],
        1000.0,
    );
    let config = Config {
        seed: Some(11),
        ..Config::default()
    };
    let clock = ManualClock::new();
    let deadline = Deadline::new(&clock, Duration::from_secs(3600));
    let mut rng = StdRng::seed_from_u64(11);
    let report = Solver::solve(&problem, &config, &deadline, &mut rng).unwrap();

    assert_eq!(report.solution.plans.len(), 1);
    assert_eq!(report.solution.plans[0].trips.len(), 1);
    let trip = &report.solution.plans[0].trips[0];
    assert_eq!(trip.drops.len(), 1);

    let drop = trip.drops[0];
    assert_eq!(drop.village_id, 1);
    assert_eq!(drop.food(), 90);
    assert_eq!(drop.other_supplies, 10);
    // the first restart already scores dry = floor(90 * 0.1) = 9, later bests only lower it
    assert!(drop.perishable_food >= 81);
    assert!(drop.perishable_food > drop.dry_food);
    assert!(report.evaluation.score() > 0.0);
    problem.verify_solution(&report.solution).unwrap();
}

#[test]
fn test_satisfied_food_is_never_delivered_again() {
    // weight 46 fits all 45 food units but only one other unit on the first trip
    let problem = problem(
        vec![village(1, 5, 3.0, 4.0)],
        vec![helicopter(1, 46.0, 50.0), helicopter(2, 46.0, 50.0)],
        100.0,
    );
    let clock = ManualClock::new();
    let deadline = Deadline::new(&clock, Duration::from_secs(60));
    let solution = TripConstructor::new(&problem, 0.5, &deadline).build_solution();

    assert_eq!(solution.plans.len(), 1);
    let trips = &solution.plans[0].trips;
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].drops[0].food(), 45);
    assert_eq!(trips[0].drops[0].other_supplies, 1);
    assert_eq!(trips[1].drops[0].food(), 0);
    assert_eq!(trips[1].drops[0].other_supplies, 4);
    assert_eq!(village_totals(&solution, 1), (45, 5));

    let report = Solver::solve_with_clock(
        &problem,
        &hyperparameters(json!({ "seed": 5 })),
        &ManualClock::new(),
    )
    .unwrap();
    let (food, other) = village_totals(&report.solution, 1);
    assert!(food <= 45);
    assert!(other <= 5);
    problem.verify_solution(&report.solution).unwrap();
}

#[test]
fn test_zero_time_limit_returns_empty() {
    let mut problem = problem(
        vec![village(1, 10, 3.0, 4.0)],
        vec![helicopter(1, 1000.0, 1000.0)],
        1000.0,
    );
    problem.time_limit_minutes = 0.0;

    let report = Solver::solve_challenge_instance(&problem, &None).unwrap();
    assert!(report.solution.is_empty());
    assert_eq!(report.stats.restarts, 0);
    assert_eq!(report.evaluation.score(), 0.0);

    let saved = RefCell::new(None);
    solve_challenge(
        &problem,
        &|solution: &Solution| {
            *saved.borrow_mut() = Some(solution.clone());
            Ok::<_, anyhow::Error>(())
        },
        &None,
    )
    .unwrap();
    assert_eq!(saved.into_inner(), Some(Solution::new()));
}

#[test]
fn test_deadline_mid_search_keeps_valid_best() {
    let problem = ProblemData::generate_instance(
        &[9u8; 32],
        &Track {
            num_cities: 3,
            num_villages: 40,
            num_helicopters: 5,
        },
    )
    .unwrap();
    let config = Config {
        seed: Some(1),
        ..Config::default()
    };

    for readings in [1u64, 50, 500, 5_000] {
        let clock = ManualClock::ticking(Duration::from_micros(1));
        let deadline = Deadline::new(&clock, Duration::from_micros(readings));
        let mut rng = StdRng::seed_from_u64(1);
        let report = Solver::solve(&problem, &config, &deadline, &mut rng).unwrap();
        problem.verify_solution(&report.solution).unwrap();
        assert!(report.evaluation.score() >= 0.0);
        assert!(report.stats.restarts <= config.starting_ratios.len());
    }
}

#[test]
fn test_seeded_search_is_reproducible() {
    let problem = ProblemData::generate_instance(
        &[21u8; 32],
        &Track {
            num_cities: 2,
            num_villages: 20,
            num_helicopters: 3,
        },
    )
    .unwrap();
    let hyperparameters = hyperparameters(json!({ "seed": 1234, "max_no_improvement": 8 }));

    let a = Solver::solve_with_clock(&problem, &hyperparameters, &ManualClock::new()).unwrap();
    let b = Solver::solve_with_clock(&problem, &hyperparameters, &ManualClock::new()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.stats.restarts, 5);
    assert!(a.evaluation.score() >= 0.0);
    problem.verify_solution(&a.solution).unwrap();
}

#[test]
fn test_huge_time_limit_still_searches() {
    let mut problem = problem(
        vec![village(1, 10, 3.0, 4.0)],
        vec![helicopter(1, 1000.0, 1000.0)],
        1000.0,
    );
    problem.time_limit_minutes = 1e18;
    problem.validate().unwrap();

    let report = Solver::solve_with_clock(
        &problem,
        &hyperparameters(json!({ "seed": 3 })),
        &ManualClock::new(),
    )
    .unwrap();
    assert_eq!(report.stats.restarts, 5);
    assert_eq!(report.solution.plans.len(), 1);
    assert_eq!(report.solution.num_trips(), 1);
}

#[test]
fn test_inconsistent_hyperparameters_use_defaults() {
    let problem = problem(
        vec![village(1, 10, 3.0, 4.0)],
        vec![helicopter(1, 1000.0, 1000.0)],
        1000.0,
    );
    let report = Solver::solve_with_clock(
        &problem,
        &hyperparameters(json!({ "min_step": 0.5, "max_step": 0.1, "seed": 1 })),
        &ManualClock::new(),
    )
    .unwrap();
    assert_eq!(report.solution.num_trips(), 1);
    problem.verify_solution(&report.solution).unwrap();
}
