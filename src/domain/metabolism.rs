use crate::domain::{Gender, UnitSystem};
use chrono::{Datelike, NaiveDate};

const POUNDS_PER_KG: f64 = 2.20462;
const INCHES_PER_CM: f64 = 0.393701;

/// Harris-Benedict equation. Returns `(bmr, amr)` in calories per day, with
/// the AMR being the BMR scaled by the activity multiplier.
pub fn harris_benedict(
    age: f64,
    height_cm: f64,
    weight_kg: f64,
    activity: f64,
    gender: Gender,
) -> (f64, f64) {
    let (baseline, weight_factor, height_factor, age_factor) = match gender {
        Gender::Male => (88.362, 13.397, 4.799, 5.677),
        Gender::Female => (447.593, 9.247, 3.098, 4.330),
    };
    let bmr = baseline + weight_factor * weight_kg + height_factor * height_cm - age_factor * age;
    (bmr, bmr * activity)
}

pub fn age_in_years(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        years - 1
    } else {
        years
    }
}

pub fn to_pounds(kg: f64) -> f64 {
    kg * POUNDS_PER_KG
}

pub fn to_kg(pounds: f64) -> f64 {
    pounds / POUNDS_PER_KG
}

pub fn to_inches(cm: f64) -> f64 {
    cm * INCHES_PER_CM
}

pub fn to_cm(inches: f64) -> f64 {
    inches / INCHES_PER_CM
}

pub fn format_weight(unit_system: UnitSystem, kg: f64) -> String {
    match unit_system {
        UnitSystem::Metric => format!("{kg:.1} kg"),
        UnitSystem::Imperial => format!("{:.1} pounds", to_pounds(kg)),
    }
}

pub fn format_height(unit_system: UnitSystem, cm: f64) -> String {
    match unit_system {
        UnitSystem::Metric => format!("{cm:.1} cm"),
        UnitSystem::Imperial => format!("{:.1} inches", to_inches(cm)),
    }
}
