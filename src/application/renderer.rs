use crate::domain::{
    DateRange, Day, Entry, ImpEx, Profile, UnitSystem, Weight, format_date, format_height,
    format_weight, to_pounds,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

const RULE: &str = "-----------------------------------";

/// Profile plus the values derived from it for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub weight_kg: f64,
    pub age: i32,
    pub bmr: f64,
    pub amr: f64,
}

/// Turns command results into the text printed to the user.
pub trait Renderer {
    fn error(&self, err: &anyhow::Error) -> String;
    fn weight_history(&self, weights: &[Weight], profile: &Profile) -> Result<String>;
    fn add_weight(&self, kg: f64, profile: &Profile) -> Result<String>;
    fn profile(&self, summary: &ProfileSummary) -> Result<String>;
    fn days(&self, days: &[Day], range: &DateRange) -> Result<String>;
    fn add_entry(&self, entry: &Entry) -> Result<String>;
    fn clear_entries(&self, date: &str, removed: usize) -> Result<String>;
    fn clear_entry(&self, date: &str, entry: &Entry) -> Result<String>;
    fn import(&self, file: &Path, entries: usize, weights: usize) -> Result<String>;

    /// Exports are always JSON, whatever the output format.
    fn export(&self, data: &ImpEx) -> Result<String> {
        serde_json::to_string_pretty(data).context("could not marshal json")
    }
}

pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn error(&self, err: &anyhow::Error) -> String {
        format!("{err:#}")
    }

    fn weight_history(&self, weights: &[Weight], profile: &Profile) -> Result<String> {
        let mut out = String::from("Weight over time:\n");
        for weight in weights {
            writeln!(
                out,
                "\t{}: {}",
                format_date(weight.created.date_naive()),
                format_weight(profile.unit_system, weight.weight)
            )?;
        }
        Ok(out)
    }

    fn add_weight(&self, kg: f64, profile: &Profile) -> Result<String> {
        Ok(format!(
            "Set weight: {}",
            format_weight(profile.unit_system, kg)
        ))
    }

    fn profile(&self, summary: &ProfileSummary) -> Result<String> {
        let profile = &summary.profile;
        let unit = profile.unit_system;
        Ok(format!(
            "Current Config:\n\tWeight: {}\n\tHeight: {}\n\tActivity: {:.1}\n\tBirthday: {} ({})\n\tGender: {}\n\tUnit System: {}\n\tAMR (BMR): {:.0} ({:.0}) calories per day",
            format_weight(unit, summary.weight_kg),
            format_height(unit, profile.height),
            profile.activity,
            format_date(profile.birthday),
            summary.age,
            profile.gender,
            unit,
            summary.amr,
            summary.bmr,
        ))
    }

    fn days(&self, days: &[Day], range: &DateRange) -> Result<String> {
        let mut out = format!(
            "Data from {} to {}:\n{RULE}\n",
            format_date(range.from()),
            format_date(range.to())
        );
        if days.is_empty() {
            out.push_str("No entries have been found.");
            return Ok(out);
        }

        let mut total_amr = 0.0;
        let mut total_used = 0;
        for day in days {
            total_amr += day.amr();
            total_used += day.used;
            writeln!(out, "{}", format_date(day.date))?;
            for entry in &day.entries {
                writeln!(out, "\t{} {}", entry.calories, entry.food)?;
            }
            writeln!(out, "\t---------------------")?;
            writeln!(out, "\t{} / {:.0} calories", day.used, day.amr())?;
        }

        let balance = total_amr - total_used as f64;
        let label = if balance < 0.0 { "surplus" } else { "deficit" };
        write!(
            out,
            "{RULE}\n{} / {:.0} calories = {:.0} {}",
            total_used,
            total_amr,
            balance.abs(),
            label
        )?;
        Ok(out)
    }

    fn add_entry(&self, entry: &Entry) -> Result<String> {
        Ok(format!(
            "Added Entry for {} with {} calories ({})",
            entry.entry_date, entry.calories, entry.food
        ))
    }

    fn clear_entries(&self, date: &str, removed: usize) -> Result<String> {
        Ok(format!("Cleared all entries for {date} ({removed} removed)"))
    }

    fn clear_entry(&self, date: &str, entry: &Entry) -> Result<String> {
        Ok(format!(
            "Cleared entry {} {} for {date}",
            entry.calories, entry.food
        ))
    }

    fn import(&self, file: &Path, entries: usize, weights: usize) -> Result<String> {
        Ok(format!(
            "Imported data from {} with {entries} entries and {weights} weights",
            file.display()
        ))
    }
}

#[derive(Serialize)]
struct Message {
    success: bool,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeightPoint {
    created: DateTime<Local>,
    weight: f64,
    formatted: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    weight: String,
    height: String,
    activity: f64,
    birthday: String,
    age: i32,
    gender: String,
    unit_system: String,
    amr: f64,
    bmr: f64,
}

#[derive(Serialize)]
struct DaysView<'a> {
    from: NaiveDate,
    to: NaiveDate,
    days: &'a [Day],
}

pub struct JsonRenderer;

impl JsonRenderer {
    fn encode(value: &impl Serialize) -> Result<String> {
        serde_json::to_string(value).context("could not marshal json")
    }

    fn success(message: String) -> Result<String> {
        Self::encode(&Message {
            success: true,
            message,
        })
    }
}

impl Renderer for JsonRenderer {
    fn error(&self, err: &anyhow::Error) -> String {
        let message = Message {
            success: false,
            message: format!("{err:#}"),
        };
        Self::encode(&message).unwrap_or_else(|e| format!("could not print error, {e}"))
    }

    fn weight_history(&self, weights: &[Weight], profile: &Profile) -> Result<String> {
        let points: Vec<WeightPoint> = weights
            .iter()
            .map(|w| WeightPoint {
                created: w.created,
                weight: match profile.unit_system {
                    UnitSystem::Metric => w.weight,
                    UnitSystem::Imperial => to_pounds(w.weight),
                },
                formatted: format_weight(profile.unit_system, w.weight),
            })
            .collect();
        Self::encode(&points)
    }

    fn add_weight(&self, kg: f64, profile: &Profile) -> Result<String> {
        Self::success(format!(
            "Set weight: {}",
            format_weight(profile.unit_system, kg)
        ))
    }

    fn profile(&self, summary: &ProfileSummary) -> Result<String> {
        let profile = &summary.profile;
        Self::encode(&ProfileView {
            weight: format_weight(profile.unit_system, summary.weight_kg),
            height: format_height(profile.unit_system, profile.height),
            activity: profile.activity,
            birthday: format_date(profile.birthday),
            age: summary.age,
            gender: profile.gender.to_string(),
            unit_system: profile.unit_system.to_string(),
            amr: summary.amr,
            bmr: summary.bmr,
        })
    }

    fn days(&self, days: &[Day], range: &DateRange) -> Result<String> {
        Self::encode(&DaysView {
            from: range.from(),
            to: range.to(),
            days,
        })
    }

    fn add_entry(&self, entry: &Entry) -> Result<String> {
        Self::success(format!(
            "Added Entry for {} with {} calories ({})",
            entry.entry_date, entry.calories, entry.food
        ))
    }

    fn clear_entries(&self, date: &str, removed: usize) -> Result<String> {
        Self::success(format!("Cleared all entries for {date} ({removed} removed)"))
    }

    fn clear_entry(&self, date: &str, entry: &Entry) -> Result<String> {
        Self::success(format!(
            "Cleared entry {} {} for {date}",
            entry.calories, entry.food
        ))
    }

    fn import(&self, file: &Path, entries: usize, weights: usize) -> Result<String> {
        Self::success(format!(
            "Imported data from {} with {entries} entries and {weights} weights",
            file.display()
        ))
    }
}
