use super::{Packages, Village};

/// Units of value actually credited for one delivery after applying the village caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountedUnits {
    pub dry: i64,
    pub perishable: i64,
    pub other: i64,
}

/// Caps a delivery against what the village still needs. Perishable food fills the food
/// room before dry food is considered.
pub fn counted_units(
    village: &Village,
    dry: i64,
    perishable: i64,
    other: i64,
    counted_food: i64,
    counted_other: i64,
) -> CountedUnits {
    let food_room = (village.food_cap() - counted_food).max(0);
    let perishable = perishable.max(0).min(food_room);
    let dry = dry.max(0).min(food_room - perishable);

    let other_room = (village.other_cap() - counted_other).max(0);
    let other = other.max(0).min(other_room);

    CountedUnits {
        dry,
        perishable,
        other,
    }
}

pub fn delivery_value(
    village: &Village,
    packages: &Packages,
    dry: i64,
    perishable: i64,
    other: i64,
    counted_food: i64,
    counted_other: i64,
) -> f64 {
    let counted = counted_units(village, dry, perishable, other, counted_food, counted_other);
    counted.perishable as f64 * packages.perishable().value
        + counted.dry as f64 * packages.dry().value
        + counted.other as f64 * packages.other().value
}
