use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One food record filed under a calendar date. The metabolic rates are a
/// snapshot taken when the entry was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub created: DateTime<Local>,
    pub entry_date: String,
    pub calories: u32,
    pub food: String,
    pub bmr: f64,
    pub amr: f64,
}

/// Everything needed to record an entry; the store assigns id and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub entry_date: String,
    pub calories: u32,
    pub food: String,
    pub bmr: f64,
    pub amr: f64,
}

impl NewEntry {
    pub fn new(entry_date: impl Into<String>, calories: u32, food: impl Into<String>) -> Self {
        Self {
            entry_date: entry_date.into(),
            calories,
            food: food.into(),
            bmr: 0.0,
            amr: 0.0,
        }
    }

    pub fn with_rates(mut self, bmr: f64, amr: f64) -> Self {
        self.bmr = bmr;
        self.amr = amr;
        self
    }
}
