use crate::domain::{DateRange, Days, build_day, format_date};
use crate::infrastructure::EntryStore;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use std::sync::Mutex;

/// Upper bound on store reads in flight during one range fetch. A history
/// window can span thousands of dates; this caps the fan-out regardless.
pub const MAX_CONCURRENT_FETCHES: usize = 20;

/// Fetch the entries of every date in `range`, concurrently with at most
/// [`MAX_CONCURRENT_FETCHES`] reads in flight, and aggregate them into Days
/// sorted by date. Dates without entries are left out.
///
/// The first store error fails the whole fetch and is returned unchanged;
/// no partial result is returned. All dispatched reads have finished by the
/// time this returns.
pub fn fetch_days<S>(store: &S, range: &DateRange) -> Result<Days>
where
    S: EntryStore + ?Sized,
{
    let dates: Vec<NaiveDate> = range.days().collect();
    let workers = dates.len().clamp(1, MAX_CONCURRENT_FETCHES);
    debug!(
        "fetching {} day(s) from {} to {} with {} worker(s)",
        dates.len(),
        range.from(),
        range.to(),
        workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("day-fetch-{i}"))
        .build()
        .context("Failed to start day fetch workers")?;

    let days = Mutex::new(Days::new());
    pool.install(|| {
        dates.par_iter().try_for_each(|&date| -> Result<()> {
            let entries = store.fetch_entries(&format_date(date))?;
            if entries.is_empty() {
                return Ok(());
            }
            let day = build_day(entries, date);
            days.lock()
                .map_err(|_| anyhow!("day accumulator lock poisoned"))?
                .push(day);
            Ok(())
        })
    })?;

    let mut days = days
        .into_inner()
        .map_err(|_| anyhow!("day accumulator lock poisoned"))?;
    days.sort_by_key(|day| day.date);
    debug!("fetched {} day(s) with entries", days.len());
    Ok(days)
}
