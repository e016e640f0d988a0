use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

pub fn distance(from: &Point, to: &Point) -> f64 {
    from.distance_to(to)
}

/// Length of the closed route `home -> stops... -> home`. An empty route has length zero.
pub fn round_trip_distance<'a, I>(home: &Point, stops: I) -> f64
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut total = 0.0;
    let mut current = home;
    for stop in stops {
        total += current.distance_to(stop);
        current = stop;
    }
    total + current.distance_to(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean() {
        assert_eq!(distance(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(&Point::new(1.0, 1.0), &Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_round_trip_distance() {
        let home = Point::new(0.0, 0.0);
        let stops = [Point::new(3.0, 0.0), Point::new(3.0, 4.0)];
        assert_eq!(round_trip_distance(&home, stops.iter()), 12.0);
        assert_eq!(round_trip_distance(&home, std::iter::empty()), 0.0);
    }
}
