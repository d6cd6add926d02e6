use crate::domain::{Entry, ImpEx, NewEntry, Profile, Weight};
use anyhow::Result;

/// Read access to the entries filed under a single date.
///
/// Implementations are called from several worker threads at once (one call
/// per date), so they must not keep a shared cursor between calls.
pub trait EntryStore: Send + Sync {
    /// Entries for `entry_date` (formatted `dd.mm.yyyy`) in insertion order.
    fn fetch_entries(&self, entry_date: &str) -> Result<Vec<Entry>>;
}

/// Everything the commands persist: the profile, the weight timeline and
/// the food entries.
pub trait CalorieStorage: EntryStore {
    /// Replace the stored profile.
    fn set_profile(&self, profile: &Profile) -> Result<()>;

    fn fetch_profile(&self) -> Result<Option<Profile>>;

    /// Record a weight in kilograms, timestamped now.
    fn add_weight(&self, kg: f64) -> Result<Weight>;

    /// The most recently recorded weight.
    fn current_weight(&self) -> Result<Option<Weight>>;

    /// All weights, oldest first.
    fn fetch_weights(&self) -> Result<Vec<Weight>>;

    fn add_entry(&self, entry: &NewEntry) -> Result<Entry>;

    fn fetch_all_entries(&self) -> Result<Vec<Entry>>;

    /// Delete every entry of a date, returning how many were removed.
    fn remove_entries(&self, entry_date: &str) -> Result<usize>;

    fn remove_entry(&self, entry_date: &str, id: i64) -> Result<()>;

    /// Replace the profile and insert or overwrite weights and entries by id.
    fn import(&self, data: &ImpEx) -> Result<()>;

    fn export(&self) -> Result<ImpEx>;

}
