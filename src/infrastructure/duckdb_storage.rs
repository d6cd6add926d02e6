use crate::domain::{Entry, ImpEx, NewEntry, Profile, Weight};
use crate::infrastructure::storage::{CalorieStorage, EntryStore};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use duckdb::{Connection, OptionalExt, params};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "001_create_tables",
    include_str!("../../migrations/001_create_tables.sql"),
)];

type EntryRow = (i64, String, String, i64, String, f64, f64);
type WeightRow = (i64, String, f64);
type ProfileRow = (f64, f64, String, String, String);

pub struct DuckDbStorage {
    conn: Mutex<Connection>,
}

// Every access to the connection goes through the Mutex, so the storage can
// be shared with the day fetch workers.
unsafe impl Send for DuckDbStorage {}
unsafe impl Sync for DuckDbStorage {}

impl DuckDbStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let conn = Connection::open(db_path).with_context(|| {
            format!(
                "could not connect to database at {}, if you want to use a different database file, set CALORIES_DB or pass --db",
                db_path.display()
            )
        })?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("DuckDB connection lock poisoned"))
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )
        .context("Failed to create migrations table")?;

        let applied = applied_migrations(&conn)?;
        for &(version, name, sql) in MIGRATIONS {
            if applied.contains(&version) {
                continue;
            }
            conn.execute_batch(sql)
                .with_context(|| format!("Failed to apply migration {version}: {name}"))?;
            conn.execute(
                "INSERT INTO migrations (version, name) VALUES (?, ?)",
                params![version, name],
            )
            .with_context(|| format!("Failed to record migration {name} as applied"))?;
            info!("applied migration {name}");
        }
        Ok(())
    }
}

fn applied_migrations(conn: &Connection) -> Result<HashSet<i32>> {
    let mut stmt = conn
        .prepare("SELECT version FROM migrations ORDER BY version")
        .context("Failed to prepare migration query")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, i32>(0))?
        .collect::<duckdb::Result<HashSet<i32>>>()?;
    Ok(versions)
}

fn next_id(conn: &Connection, table: &str) -> Result<i64> {
    let id = conn
        .query_row(
            &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {table}"),
            [],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("Failed to allocate id in {table}"))?;
    Ok(id)
}

fn timestamp(created: &DateTime<Local>) -> String {
    created
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Local>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Failed to parse timestamp from database: {raw}"))?;
    Ok(parsed.with_timezone(&Local))
}

fn entry_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<EntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_entry(row: EntryRow) -> Result<Entry> {
    let (id, created, entry_date, calories, food, bmr, amr) = row;
    Ok(Entry {
        id,
        created: parse_timestamp(&created)?,
        entry_date,
        calories: u32::try_from(calories)
            .with_context(|| format!("calorie count of entry {id} out of range: {calories}"))?,
        food,
        bmr,
        amr,
    })
}

fn into_weight(row: WeightRow) -> Result<Weight> {
    let (id, created, weight) = row;
    Ok(Weight {
        id,
        created: parse_timestamp(&created)?,
        weight,
    })
}

fn into_profile(row: ProfileRow) -> Result<Profile> {
    let (height, activity, birthday, gender, unit_system) = row;
    Ok(Profile {
        height,
        activity,
        birthday: NaiveDate::parse_from_str(&birthday, BIRTHDAY_FORMAT)
            .context("Failed to parse birthday from database")?,
        gender: gender.parse().map_err(|e: String| anyhow!(e))?,
        unit_system: unit_system.parse().map_err(|e: String| anyhow!(e))?,
    })
}

fn write_profile(conn: &Connection, profile: &Profile) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO profile (id, height, activity, birthday, gender, unit_system) VALUES (1, ?, ?, ?, ?, ?)",
        params![
            profile.height,
            profile.activity,
            profile.birthday.format(BIRTHDAY_FORMAT).to_string(),
            profile.gender.to_string(),
            profile.unit_system.to_string(),
        ],
    )
    .context("could not update config")?;
    Ok(())
}

fn query_entries(conn: &Connection, sql: &str, date: Option<&str>) -> Result<Vec<Entry>> {
    let mut stmt = conn
        .prepare(sql)
        .context("Failed to prepare entry query")?;
    let rows = match date {
        Some(date) => stmt
            .query_map(params![date], entry_from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?,
        None => stmt
            .query_map([], entry_from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?,
    };
    rows.into_iter().map(into_entry).collect()
}

impl EntryStore for DuckDbStorage {
    fn fetch_entries(&self, entry_date: &str) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        query_entries(
            &conn,
            "SELECT id, created, entry_date, calories, food, bmr, amr FROM entries WHERE entry_date = ? ORDER BY id",
            Some(entry_date),
        )
        .with_context(|| format!("could not fetch entries for the given date: {entry_date}"))
    }
}

impl CalorieStorage for DuckDbStorage {
    fn set_profile(&self, profile: &Profile) -> Result<()> {
        let conn = self.conn()?;
        write_profile(&conn, profile)
    }

    fn fetch_profile(&self) -> Result<Option<Profile>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT height, activity, birthday, gender, unit_system FROM profile LIMIT 1",
                [],
                |row| -> duckdb::Result<ProfileRow> {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .context("could not retrieve config")?;
        row.map(into_profile).transpose()
    }

    fn add_weight(&self, kg: f64) -> Result<Weight> {
        let conn = self.conn()?;
        let weight = Weight {
            id: next_id(&conn, "weights")?,
            created: Local::now(),
            weight: kg,
        };
        conn.execute(
            "INSERT INTO weights (id, created, weight) VALUES (?, ?, ?)",
            params![weight.id, timestamp(&weight.created), weight.weight],
        )
        .with_context(|| format!("could not save weight: {kg:.1}"))?;
        debug!("stored weight {} ({kg:.1} kg)", weight.id);
        Ok(weight)
    }

    fn current_weight(&self) -> Result<Option<Weight>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, created, weight FROM weights ORDER BY created DESC, id DESC LIMIT 1",
                [],
                |row| -> duckdb::Result<WeightRow> { Ok((row.get(0)?, row.get(1)?, row.get(2)?)) },
            )
            .optional()
            .context("could not fetch current weight")?;
        row.map(into_weight).transpose()
    }

    fn fetch_weights(&self) -> Result<Vec<Weight>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, created, weight FROM weights ORDER BY created ASC, id ASC")
            .context("could not retrieve weight history")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<duckdb::Result<Vec<WeightRow>>>()?;
        rows.into_iter().map(into_weight).collect()
    }

    fn add_entry(&self, entry: &NewEntry) -> Result<Entry> {
        let conn = self.conn()?;
        let stored = Entry {
            id: next_id(&conn, "entries")?,
            created: Local::now(),
            entry_date: entry.entry_date.clone(),
            calories: entry.calories,
            food: entry.food.clone(),
            bmr: entry.bmr,
            amr: entry.amr,
        };
        conn.execute(
            "INSERT INTO entries (id, created, entry_date, calories, food, bmr, amr) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                stored.id,
                timestamp(&stored.created),
                stored.entry_date,
                i64::from(stored.calories),
                stored.food,
                stored.bmr,
                stored.amr,
            ],
        )
        .context("could not add entry")?;
        debug!("stored entry {} for {}", stored.id, stored.entry_date);
        Ok(stored)
    }

    fn fetch_all_entries(&self) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        query_entries(
            &conn,
            "SELECT id, created, entry_date, calories, food, bmr, amr FROM entries ORDER BY id",
            None,
        )
        .context("could not fetch all entries")
    }

    fn remove_entries(&self, entry_date: &str) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM entries WHERE entry_date = ?", params![entry_date])
            .with_context(|| format!("could not delete entries for {entry_date}"))?;
        Ok(removed)
    }

    fn remove_entry(&self, entry_date: &str, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM entries WHERE entry_date = ? AND id = ?",
                params![entry_date, id],
            )
            .with_context(|| format!("could not delete entry with id {id} on day {entry_date}"))?;
        if removed == 0 {
            bail!("could not delete entry with id {id} on day {entry_date}");
        }
        Ok(())
    }

    fn import(&self, data: &ImpEx) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .context("Failed to start import transaction")?;

        if let Some(profile) = &data.config {
            write_profile(&tx, profile).context("could not replace config")?;
        }
        for weight in &data.weights {
            tx.execute(
                "INSERT OR REPLACE INTO weights (id, created, weight) VALUES (?, ?, ?)",
                params![weight.id, timestamp(&weight.created), weight.weight],
            )
            .with_context(|| format!("could not insert/update weight with id {}", weight.id))?;
        }
        for entry in &data.entries {
            tx.execute(
                "INSERT OR REPLACE INTO entries (id, created, entry_date, calories, food, bmr, amr) VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    entry.id,
                    timestamp(&entry.created),
                    entry.entry_date,
                    i64::from(entry.calories),
                    entry.food,
                    entry.bmr,
                    entry.amr,
                ],
            )
            .with_context(|| format!("could not insert/update entry with id {}", entry.id))?;
        }

        tx.commit().context("Failed to commit import")?;
        info!(
            "imported {} entries and {} weights",
            data.entries.len(),
            data.weights.len()
        );
        Ok(())
    }

    fn export(&self) -> Result<ImpEx> {
        Ok(ImpEx {
            config: self.fetch_profile()?,
            entries: self.fetch_all_entries()?,
            weights: self.fetch_weights()?,
        })
    }
}
