//! Durable storage adapter for the ledger.
//!
//! The ledger persists as four independent JSON records inside one data
//! directory, so a failure writing one record never blocks or corrupts the
//! others. Writes are atomic (temp file, exclusive lock, sync, rename) and
//! reads take shared locks. A record that is missing or unparseable at load
//! time reverts to its default with a logged warning; startup never fails
//! because of a corrupt record.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The four independent logical records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record {
    Goals,
    Profile,
    Meals,
    Activities,
}

impl Record {
    /// File name of this record inside the data directory
    pub fn file_name(self) -> &'static str {
        match self {
            Record::Goals => "goals.json",
            Record::Profile => "profile.json",
            Record::Meals => "meals.json",
            Record::Activities => "activities.json",
        }
    }
}

/// Storage adapter over a data directory
#[derive(Clone, Debug)]
pub struct StorageDir {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl StorageDir {
    /// Create an adapter with no write quota
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    /// Limit the serialized size of the meal log
    ///
    /// Models the medium's quota; the meal log is the only record that
    /// embeds image data and is the only one checked against it.
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Path of a record file
    pub fn record_path(&self, record: Record) -> PathBuf {
        self.dir.join(record.file_name())
    }

    /// Load a record, falling back to its default on any failure
    ///
    /// Missing files are expected on first run; unreadable or unparseable
    /// files are logged and treated as absent so the other records still
    /// load independently.
    pub fn load<T: DeserializeOwned + Default>(&self, record: Record) -> T {
        let path = self.record_path(record);
        if !path.exists() {
            tracing::info!("No {} record found, using defaults", record.file_name());
            return T::default();
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}. Using defaults.", path, e);
                return T::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}. Using defaults.", path, e);
            return T::default();
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read_result {
            tracing::warn!("Failed to read {:?}: {}. Using defaults.", path, e);
            return T::default();
        }

        match serde_json::from_str::<T>(&contents) {
            Ok(value) => {
                tracing::debug!("Loaded {} record from {:?}", record.file_name(), path);
                value
            }
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Using defaults.", path, e);
                T::default()
            }
        }
    }

    /// Save a record atomically
    ///
    /// Writes to a locked temp file in the same directory, syncs, then
    /// renames over the record. The meal log is rejected with
    /// `Error::CapacityExceeded` before any bytes hit disk when it would
    /// exceed the configured quota.
    pub fn save<T: Serialize>(&self, record: Record, value: &T) -> Result<()> {
        let contents = serde_json::to_string(value)?;

        if record == Record::Meals {
            if let Some(quota) = self.quota_bytes {
                let needed = contents.len() as u64;
                if needed > quota {
                    return Err(Error::CapacityExceeded { needed, quota });
                }
            }
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.record_path(record);

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} record to {:?}", record.file_name(), path);
        Ok(())
    }
}

/// Default data directory under the platform's local data root
pub fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("nutrivision")
}

/// Write raw bytes to a record path, bypassing serialization (test helper)
#[doc(hidden)]
pub fn write_raw(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DailyGoals, MealEntry, UserProfile};

    fn sample_meal(id: &str) -> MealEntry {
        MealEntry {
            id: id.into(),
            timestamp: "2024-01-01 12:00".into(),
            image_ref: "data:image/jpeg;base64,abcd".into(),
            title: "Lunch".into(),
            description: String::new(),
            calories: 500.0,
            macros: vec![],
            micros: vec![],
            ingredients: vec![],
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path());

        let goals = DailyGoals {
            calories: 1800.0,
            ..DailyGoals::default()
        };
        storage.save(Record::Goals, &goals).unwrap();

        let loaded: DailyGoals = storage.load(Record::Goals);
        assert_eq!(loaded.calories, 1800.0);
        assert_eq!(loaded.protein, 120.0);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path());

        let profile: UserProfile = storage.load(Record::Profile);
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_corrupt_record_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path());

        write_raw(&storage.record_path(Record::Meals), b"{ not json").unwrap();

        let meals: Vec<MealEntry> = storage.load(Record::Meals);
        assert!(meals.is_empty());
    }

    #[test]
    fn test_corrupt_record_does_not_affect_others() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path());

        storage.save(Record::Goals, &DailyGoals::default()).unwrap();
        write_raw(&storage.record_path(Record::Meals), b"garbage").unwrap();

        let meals: Vec<MealEntry> = storage.load(Record::Meals);
        let goals: DailyGoals = storage.load(Record::Goals);
        assert!(meals.is_empty());
        assert_eq!(goals.calories, 2000.0);
    }

    #[test]
    fn test_meal_log_quota_exceeded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path()).with_quota(Some(16));

        let meals = vec![sample_meal("m1")];
        let err = storage.save(Record::Meals, &meals).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { .. }));

        // Nothing was written
        assert!(!storage.record_path(Record::Meals).exists());
    }

    #[test]
    fn test_quota_ignored_for_other_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path()).with_quota(Some(4));

        // Goals serialize well past 4 bytes but are not quota-checked
        storage.save(Record::Goals, &DailyGoals::default()).unwrap();
        assert!(storage.record_path(Record::Goals).exists());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path());

        storage.save(Record::Activities, &Vec::<crate::ActivityEntry>::new()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "activities.json")
            .collect();
        assert!(extras.is_empty(), "stray files: {:?}", extras);
    }
}
