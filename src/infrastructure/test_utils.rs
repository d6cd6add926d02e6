/// Test utilities for DuckDB-based tests
///
/// `TestStorage` creates a fresh database file in a temporary directory for
/// each test and removes it when dropped, so tests never share state.
///
/// ```rust,ignore
/// use crate::infrastructure::test_utils::test_harness::TestStorage;
///
/// #[test]
/// fn my_test() {
///     let test_storage = TestStorage::with_profile();
///     test_storage.seed_entry("14.03.2024", 300, "eggs");
///     // ...
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::domain::{Entry, Gender, NewEntry, Profile, UnitSystem};
    use crate::infrastructure::{CalorieStorage, DuckDbStorage};
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    pub struct TestStorage {
        pub storage: Arc<DuckDbStorage>,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    impl TestStorage {
        /// Empty database, no profile
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let db_path = temp_dir.path().join("test.db");

            let storage =
                DuckDbStorage::new(&db_path).expect("Failed to initialize test DuckDB storage");

            Self {
                storage: Arc::new(storage),
                _temp_dir: temp_dir,
            }
        }

        /// Database with a metric male profile and a current weight of 80 kg
        pub fn with_profile() -> Self {
            let test_storage = Self::new();
            test_storage
                .storage
                .set_profile(&sample_profile())
                .expect("Failed to store profile");
            test_storage
                .storage
                .add_weight(80.0)
                .expect("Failed to store weight");
            test_storage
        }

        pub fn storage(&self) -> Arc<DuckDbStorage> {
            Arc::clone(&self.storage)
        }

        pub fn db_path(&self) -> PathBuf {
            self._temp_dir.path().join("test.db")
        }

        pub fn seed_entry(&self, date: &str, calories: u32, food: &str) -> Entry {
            self.storage
                .add_entry(&NewEntry::new(date, calories, food).with_rates(1800.0, 2200.0))
                .expect("Failed to store entry")
        }
    }

    pub fn sample_profile() -> Profile {
        Profile {
            height: 180.0,
            activity: 1.2,
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Male,
            unit_system: UnitSystem::Metric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::infrastructure::{CalorieStorage, EntryStore};

    #[test]
    fn harness_seeds_profile_and_weight() {
        let test_storage = TestStorage::with_profile();
        let storage = test_storage.storage();

        assert_eq!(storage.fetch_profile().unwrap(), Some(sample_profile()));
        assert_eq!(storage.current_weight().unwrap().unwrap().weight, 80.0);
        assert!(test_storage.db_path().exists());
    }

    #[test]
    fn harness_isolation() {
        let first = TestStorage::new();
        let second = TestStorage::new();

        first.seed_entry("14.03.2024", 300, "eggs");

        assert_eq!(first.storage().fetch_entries("14.03.2024").unwrap().len(), 1);
        assert!(second.storage().fetch_entries("14.03.2024").unwrap().is_empty());
    }
}
