//! The authoritative in-memory ledger and its persistence glue.
//!
//! `LedgerStore` owns the meal log, activity log, goals and profile. Every
//! mutation applies to memory first and then persists only the record it
//! touched. A quota rejection on the meal log is reported as a warning
//! outcome while memory stays authoritative; it never rolls back the
//! mutation and never touches the other records.

use crate::{
    ActivityEntry, DailyGoals, MealEntry, Record, Result, StorageDir, UserProfile,
};

/// Result of the persistence step of a mutation
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum PersistOutcome {
    /// The touched record was written to durable storage
    Persisted,
    /// The meal log exceeded the storage quota; the in-memory ledger is
    /// intact but this write was lost. Carries the user-facing warning.
    QuotaExceeded(String),
}

impl PersistOutcome {
    /// Warning text when the write was lost, `None` when it persisted
    pub fn warning(&self) -> Option<&str> {
        match self {
            PersistOutcome::Persisted => None,
            PersistOutcome::QuotaExceeded(msg) => Some(msg),
        }
    }
}

/// Authoritative ledger state plus the durable-storage adapter
#[derive(Debug)]
pub struct LedgerStore {
    storage: StorageDir,
    meals: Vec<MealEntry>,
    activities: Vec<ActivityEntry>,
    goals: DailyGoals,
    profile: UserProfile,
}

impl LedgerStore {
    /// Load all four records from storage, each independently
    /// fault-tolerant: a corrupt record reverts to its default without
    /// affecting the others.
    pub fn open(storage: StorageDir) -> Self {
        let meals: Vec<MealEntry> = storage.load(Record::Meals);
        let activities: Vec<ActivityEntry> = storage.load(Record::Activities);
        let goals: DailyGoals = storage.load(Record::Goals);
        let profile: UserProfile = storage.load(Record::Profile);

        tracing::info!(
            "Opened ledger: {} meals, {} activities",
            meals.len(),
            activities.len()
        );

        Self {
            storage,
            meals,
            activities,
            goals,
            profile,
        }
    }

    // ------------------------------------------------------------------
    // Read API
    // ------------------------------------------------------------------

    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    pub fn activities(&self) -> &[ActivityEntry] {
        &self.activities
    }

    pub fn goals(&self) -> &DailyGoals {
        &self.goals
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Look up a meal by id
    pub fn meal(&self, id: &str) -> Option<&MealEntry> {
        self.meals.iter().find(|m| m.id == id)
    }

    // ------------------------------------------------------------------
    // Meal mutations
    // ------------------------------------------------------------------

    /// Prepend a meal (newest-first) and persist the meal log
    pub fn add_meal(&mut self, entry: MealEntry) -> Result<PersistOutcome> {
        self.meals.insert(0, entry);
        self.persist_meals()
    }

    /// Remove a meal by id; a no-op (not an error) when the id is absent
    pub fn delete_meal(&mut self, id: &str) -> Result<PersistOutcome> {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != id);
        if self.meals.len() == before {
            tracing::debug!("delete_meal: no meal with id {}", id);
            return Ok(PersistOutcome::Persisted);
        }
        self.persist_meals()
    }

    /// Replace the meal matching `updated.id` in place
    ///
    /// Preserves the entry's position and its immutable `id`, `timestamp`
    /// and `image_ref`; coerces the editable numeric fields. A no-op when
    /// the id is absent.
    pub fn update_meal(&mut self, mut updated: MealEntry) -> Result<PersistOutcome> {
        let Some(existing) = self.meals.iter_mut().find(|m| m.id == updated.id) else {
            tracing::debug!("update_meal: no meal with id {}", updated.id);
            return Ok(PersistOutcome::Persisted);
        };

        updated.timestamp = existing.timestamp.clone();
        updated.image_ref = existing.image_ref.clone();
        updated.coerce_numeric_fields();
        *existing = updated;

        self.persist_meals()
    }

    // ------------------------------------------------------------------
    // Activity mutations (no update operation by design)
    // ------------------------------------------------------------------

    /// Prepend an activity (newest-first) and persist the activity log
    pub fn add_activity(&mut self, entry: ActivityEntry) -> Result<()> {
        self.activities.insert(0, entry);
        self.storage.save(Record::Activities, &self.activities)
    }

    /// Remove an activity by id; a no-op (not an error) when absent
    pub fn delete_activity(&mut self, id: &str) -> Result<()> {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        if self.activities.len() == before {
            tracing::debug!("delete_activity: no activity with id {}", id);
            return Ok(());
        }
        self.storage.save(Record::Activities, &self.activities)
    }

    // ------------------------------------------------------------------
    // Singleton mutations
    // ------------------------------------------------------------------

    /// Replace the daily goals (numeric input coerced) and persist
    pub fn set_goals(&mut self, goals: DailyGoals) -> Result<()> {
        self.goals = goals.coerced();
        self.storage.save(Record::Goals, &self.goals)
    }

    /// Replace the user profile (numeric input coerced) and persist
    pub fn set_profile(&mut self, profile: UserProfile) -> Result<()> {
        self.profile = profile.coerced();
        self.storage.save(Record::Profile, &self.profile)
    }

    // ------------------------------------------------------------------

    fn persist_meals(&self) -> Result<PersistOutcome> {
        match self.storage.save(Record::Meals, &self.meals) {
            Ok(()) => Ok(PersistOutcome::Persisted),
            Err(crate::Error::CapacityExceeded { needed, quota }) => {
                tracing::warn!(
                    "Meal log write lost: needs {} bytes, quota is {}. In-memory ledger kept.",
                    needed,
                    quota
                );
                Ok(PersistOutcome::QuotaExceeded(format!(
                    "Local storage is full ({} of {} bytes). Recent meals may not be saved.",
                    needed, quota
                )))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Intensity, Nutrient};

    fn sample_meal(id: &str, calories: f64) -> MealEntry {
        MealEntry {
            id: id.into(),
            timestamp: "2024-01-01 12:00".into(),
            image_ref: format!("data:{}", id),
            title: format!("Meal {}", id),
            description: String::new(),
            calories,
            macros: vec![Nutrient {
                name: "Proteína".into(),
                amount: 20.0,
                unit: "g".into(),
            }],
            micros: vec![],
            ingredients: vec![],
        }
    }

    fn sample_activity(id: &str) -> ActivityEntry {
        ActivityEntry {
            id: id.into(),
            name: "running".into(),
            duration_minutes: 30.0,
            intensity: Intensity::Vigorous,
            met_value: 8.0,
            calories_burned: 280,
            timestamp: "08:00".into(),
        }
    }

    fn open_temp_store(dir: &std::path::Path) -> LedgerStore {
        LedgerStore::open(StorageDir::new(dir))
    }

    #[test]
    fn test_add_meal_is_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_meal(sample_meal("m1", 400.0)).unwrap();
        store.add_meal(sample_meal("m2", 600.0)).unwrap();

        assert_eq!(store.meals()[0].id, "m2");
        assert_eq!(store.meals()[1].id, "m1");
    }

    #[test]
    fn test_add_then_delete_restores_prior_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_meal(sample_meal("m1", 400.0)).unwrap();
        let prior: Vec<String> = store.meals().iter().map(|m| m.id.clone()).collect();

        store.add_meal(sample_meal("m2", 600.0)).unwrap();
        store.delete_meal("m2").unwrap();

        let after: Vec<String> = store.meals().iter().map(|m| m.id.clone()).collect();
        assert_eq!(prior, after);
    }

    #[test]
    fn test_delete_absent_meal_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_meal(sample_meal("m1", 400.0)).unwrap();
        store.delete_meal("missing").unwrap();
        assert_eq!(store.meals().len(), 1);
    }

    #[test]
    fn test_update_meal_preserves_position_and_immutables() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_meal(sample_meal("m1", 400.0)).unwrap();
        store.add_meal(sample_meal("m2", 600.0)).unwrap();
        store.add_meal(sample_meal("m3", 800.0)).unwrap();

        let mut edited = sample_meal("m2", 999.0);
        edited.title = "Edited".into();
        edited.timestamp = "tampered".into();
        edited.image_ref = "tampered".into();
        store.update_meal(edited).unwrap();

        let m2 = &store.meals()[1];
        assert_eq!(m2.id, "m2");
        assert_eq!(m2.title, "Edited");
        assert_eq!(m2.calories, 999.0);
        // Immutable fields kept despite the tampered update
        assert_eq!(m2.timestamp, "2024-01-01 12:00");
        assert_eq!(m2.image_ref, "data:m2");
    }

    #[test]
    fn test_update_absent_meal_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_meal(sample_meal("m1", 400.0)).unwrap();
        store.update_meal(sample_meal("ghost", 1.0)).unwrap();
        assert_eq!(store.meals().len(), 1);
        assert_eq!(store.meals()[0].calories, 400.0);
    }

    #[test]
    fn test_delete_absent_activity_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store.add_activity(sample_activity("a1")).unwrap();
        store.delete_activity("missing").unwrap();
        assert_eq!(store.activities().len(), 1);
    }

    #[test]
    fn test_quota_warning_keeps_memory_authoritative() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path()).with_quota(Some(16));
        let mut store = LedgerStore::open(storage);

        let outcome = store.add_meal(sample_meal("m1", 400.0)).unwrap();
        assert!(outcome.warning().is_some());

        // The write was lost but the meal is still in memory
        assert_eq!(store.meals().len(), 1);
        assert!(!store
            .storage
            .record_path(Record::Meals)
            .exists());
    }

    #[test]
    fn test_quota_does_not_block_other_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = StorageDir::new(temp_dir.path()).with_quota(Some(16));
        let mut store = LedgerStore::open(storage);

        let _ = store.add_meal(sample_meal("m1", 400.0)).unwrap();
        store.add_activity(sample_activity("a1")).unwrap();

        // Activities persisted fine despite the meal-log quota rejection
        let reopened = open_temp_store(temp_dir.path());
        assert_eq!(reopened.activities().len(), 1);
        assert!(reopened.meals().is_empty());
    }

    #[test]
    fn test_goals_and_profile_coercion() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = open_temp_store(temp_dir.path());

        store
            .set_goals(DailyGoals {
                calories: f64::NAN,
                protein: -10.0,
                ..DailyGoals::default()
            })
            .unwrap();
        assert_eq!(store.goals().calories, 0.0);
        assert_eq!(store.goals().protein, 0.0);
        assert_eq!(store.goals().carbs, 250.0);

        store
            .set_profile(UserProfile {
                weight_kg: -70.0,
                height_cm: 175.0,
            })
            .unwrap();
        assert_eq!(store.profile().weight_kg, 0.0);
        assert_eq!(store.profile().height_cm, 175.0);
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut store = open_temp_store(temp_dir.path());
            store.add_meal(sample_meal("m1", 400.0)).unwrap();
            store.add_activity(sample_activity("a1")).unwrap();
            store
                .set_profile(UserProfile {
                    weight_kg: 70.0,
                    height_cm: 175.0,
                })
                .unwrap();
        }

        let store = open_temp_store(temp_dir.path());
        assert_eq!(store.meals().len(), 1);
        assert_eq!(store.activities().len(), 1);
        assert_eq!(store.profile().weight_kg, 70.0);
    }

    #[test]
    fn test_corrupt_meal_log_recovers_with_goals_intact() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut store = open_temp_store(temp_dir.path());
            store
                .set_goals(DailyGoals {
                    calories: 1800.0,
                    ..DailyGoals::default()
                })
                .unwrap();
        }

        let storage = StorageDir::new(temp_dir.path());
        crate::storage::write_raw(&storage.record_path(Record::Meals), b"{ broken").unwrap();

        let store = LedgerStore::open(storage);
        assert!(store.meals().is_empty());
        assert_eq!(store.goals().calories, 1800.0);
    }
}
