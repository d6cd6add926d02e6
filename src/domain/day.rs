use crate::domain::Entry;
use chrono::NaiveDate;
use serde::Serialize;

/// All entries filed under one date, with their calorie total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Day {
    pub entries: Vec<Entry>,
    pub used: u64,
    pub date: NaiveDate,
}

pub type Days = Vec<Day>;

impl Day {
    /// AMR snapshot of the first entry of the day.
    pub fn amr(&self) -> f64 {
        self.entries.first().map_or(0.0, |entry| entry.amr)
    }
}

pub fn build_day(entries: Vec<Entry>, date: NaiveDate) -> Day {
    let used = entries.iter().map(|entry| u64::from(entry.calories)).sum();
    Day {
        entries,
        used,
        date,
    }
}
