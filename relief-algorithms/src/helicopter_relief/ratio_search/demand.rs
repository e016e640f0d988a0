use relief_challenges::helicopter_relief::{Drop, Village};

/// Remaining need per village for one construction pass, indexed by village position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandCounters {
    food: Vec<i64>,
    other: Vec<i64>,
}

impl DemandCounters {
    pub fn new(villages: &[Village]) -> Self {
        Self {
            food: villages.iter().map(Village::food_cap).collect(),
            other: villages.iter().map(Village::other_cap).collect(),
        }
    }

    pub fn food(&self, village_idx: usize) -> i64 {
        self.food[village_idx]
    }

    pub fn other(&self, village_idx: usize) -> i64 {
        self.other[village_idx]
    }

    pub fn has_demand(&self, village_idx: usize) -> bool {
        self.food[village_idx] > 0 || self.other[village_idx] > 0
    }

    pub fn commit(&mut self, village_idx: usize, drop: &Drop) {
        self.food[village_idx] = (self.food[village_idx] - drop.food()).max(0);
        self.other[village_idx] = (self.other[village_idx] - drop.other_supplies).max(0);
    }
}
