use crate::application::{ProfileSummary, Renderer};
use crate::domain::{
    DateRange, Gender, NewEntry, Profile, RangeSelection, UnitSystem, age_in_years, fetch_days,
    format_date, harris_benedict, parse_date, to_cm, to_kg,
};
use crate::infrastructure::{CalorieStorage, EntryStore};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use log::info;
use std::path::Path;
use std::sync::Arc;

const CONFIG_USAGE: &str = "usage: calories config --weight=0.0 --height=0.0 --activity=0.0 --birthday=01.01.1970 --gender=male --unit=metric";

/// Profile values as typed by the user, in their chosen unit system.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    pub weight: f64,
    pub height: f64,
    pub activity: f64,
    pub birthday: String,
    pub gender: Gender,
    pub unit_system: UnitSystem,
}

pub struct CaloriesApp {
    storage: Arc<dyn CalorieStorage>,
    renderer: Box<dyn Renderer>,
    today: NaiveDate,
}

impl CaloriesApp {
    pub fn new(storage: Arc<dyn CalorieStorage>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            storage,
            renderer,
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today", for reproducible ranges and ages.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn require_profile(&self) -> Result<Profile> {
        self.storage.fetch_profile()?.ok_or_else(|| {
            anyhow!(
                "no config has been set, please use: 'calories config --weight=0.0 --height=0.0 --activity=0.0 --birthday=01.01.1970 --gender=female --unit=metric' to set it"
            )
        })
    }

    fn entry_date(&self, date: Option<&str>) -> Result<String> {
        match date.filter(|d| !d.is_empty()) {
            Some(date) => Ok(format_date(parse_date(date)?)),
            None => Ok(format_date(self.today)),
        }
    }

    pub fn show_days(&self, selection: &RangeSelection) -> Result<String> {
        self.require_profile()?;
        let range = DateRange::select(selection, self.today)?;
        let days = fetch_days(self.storage.as_ref(), &range)?;
        self.renderer.days(&days, &range)
    }

    pub fn add_entry(&self, date: Option<&str>, calories: u32, food: &str) -> Result<String> {
        let profile = self.require_profile()?;
        let weight = self.storage.current_weight()?.ok_or_else(|| {
            anyhow!("no weight has been recorded yet, please use: 'calories weight WEIGHT'")
        })?;
        let entry_date = self.entry_date(date)?;

        let age = age_in_years(profile.birthday, self.today);
        let (bmr, amr) = harris_benedict(
            f64::from(age),
            profile.height,
            weight.weight,
            profile.activity,
            profile.gender,
        );
        let entry = self
            .storage
            .add_entry(&NewEntry::new(entry_date, calories, food).with_rates(bmr, amr))?;
        info!("added entry {} for {}", entry.id, entry.entry_date);
        self.renderer.add_entry(&entry)
    }

    /// Clear every entry of a date, or only the one at a 1-based `position`.
    pub fn clear(&self, date: Option<&str>, position: Option<usize>, yes: bool) -> Result<String> {
        self.require_profile()?;
        let entry_date = self.entry_date(date)?;

        match position {
            Some(position) => {
                let entries = self.storage.fetch_entries(&entry_date)?;
                if entries.is_empty() {
                    bail!(
                        "could not delete entry at position {position} for {entry_date}, there are no entries"
                    );
                }
                if position == 0 || position > entries.len() {
                    bail!(
                        "could not delete entry at position {position} for {entry_date}, value needs to be from 1 to {}",
                        entries.len()
                    );
                }
                let entry = &entries[position - 1];
                if !yes {
                    bail!(
                        "refusing to clear the entry {} {} for {entry_date} without --yes, the data will be lost",
                        entry.calories,
                        entry.food
                    );
                }
                self.storage.remove_entry(&entry_date, entry.id)?;
                info!("cleared entry {} for {entry_date}", entry.id);
                self.renderer.clear_entry(&entry_date, entry)
            }
            None => {
                if !yes {
                    bail!(
                        "refusing to clear all entries for {entry_date} without --yes, the data will be lost"
                    );
                }
                let removed = self.storage.remove_entries(&entry_date)?;
                info!("cleared {removed} entries for {entry_date}");
                self.renderer.clear_entries(&entry_date, removed)
            }
        }
    }

    /// Show the weight timeline, or record `weight` given in the profile's unit.
    pub fn weight(&self, weight: Option<f64>) -> Result<String> {
        let profile = self.require_profile()?;
        let Some(weight) = weight else {
            let weights = self.storage.fetch_weights()?;
            return self.renderer.weight_history(&weights, &profile);
        };

        if !weight.is_finite() || weight <= 0.0 {
            bail!("wrong format for weight: {weight} must be a positive decimal number");
        }
        let kg = match profile.unit_system {
            UnitSystem::Metric => weight,
            UnitSystem::Imperial => to_kg(weight),
        };
        self.storage
            .add_weight(kg)
            .with_context(|| format!("could not save weight: {weight:.1}"))?;
        self.renderer.add_weight(kg, &profile)
    }

    pub fn show_profile(&self) -> Result<String> {
        let profile = self
            .storage
            .fetch_profile()
            .context("could not fetch config")?
            .ok_or_else(|| anyhow!("no config has been set yet. {CONFIG_USAGE}"))?;
        let weight = self
            .storage
            .current_weight()
            .context("could not fetch current weight")?
            .ok_or_else(|| anyhow!("could not fetch current weight: weight was not set"))?;

        let age = age_in_years(profile.birthday, self.today);
        let (bmr, amr) = harris_benedict(
            f64::from(age),
            profile.height,
            weight.weight,
            profile.activity,
            profile.gender,
        );
        self.renderer.profile(&ProfileSummary {
            profile,
            weight_kg: weight.weight,
            age,
            bmr,
            amr,
        })
    }

    /// Store a new profile and record its weight. Replacing an existing
    /// profile needs `yes`.
    pub fn set_profile(&self, input: &ProfileInput, yes: bool) -> Result<String> {
        let values = [input.weight, input.height, input.activity];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            bail!(CONFIG_USAGE);
        }
        let birthday = parse_date(&input.birthday)
            .map_err(|e| anyhow!("wrong format for birthday: {e}"))?;
        if birthday > self.today {
            bail!("birthday {} lies in the future", input.birthday);
        }
        if !yes && self.storage.fetch_profile()?.is_some() {
            bail!("refusing to overwrite the existing config without --yes");
        }

        let (height, weight) = match input.unit_system {
            UnitSystem::Metric => (input.height, input.weight),
            UnitSystem::Imperial => (to_cm(input.height), to_kg(input.weight)),
        };
        let profile = Profile {
            height,
            activity: input.activity,
            birthday,
            gender: input.gender,
            unit_system: input.unit_system,
        };
        self.storage
            .set_profile(&profile)
            .context("could not update config")?;
        self.storage
            .add_weight(weight)
            .context("could not update weight")?;
        info!("stored new config");
        self.show_profile()
    }

    pub fn export(&self) -> Result<String> {
        self.require_profile()?;
        let data = self.storage.export()?;
        self.renderer.export(&data)
    }

    pub fn import(&self, file: &Path) -> Result<String> {
        let raw = std::fs::read_to_string(file)
            .with_context(|| format!("error reading file {}", file.display()))?;
        let data: crate::domain::ImpEx =
            serde_json::from_str(&raw).context("error parsing json")?;
        self.storage.import(&data)?;
        self.renderer
            .import(file, data.entries.len(), data.weights.len())
    }
}
