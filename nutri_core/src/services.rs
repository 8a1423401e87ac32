//! External collaborator seams and entry construction.
//!
//! The image analysis and MET lookup services live outside this system;
//! the core sees them only through these traits. Calls are one-shot with
//! no retry and no cancellation; a failure surfaces immediately to the
//! caller as `Error::Analysis`, except MET lookup where the documented
//! fallback is the resting equivalent.

use crate::derive::activity_calories;
use crate::ident::new_entry_id;
use crate::types::display_clock_time;
use crate::{ActivityEntry, Error, Intensity, MealAnalysis, Result, UserProfile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MET value of rest, used when the lookup service fails
pub const RESTING_MET: f64 = 1.0;

/// Image-understanding service: photo bytes in, nutrition estimate out
///
/// The result is treated as already schema-valid; the core applies no
/// semantic validation beyond numeric coercion on later edits.
pub trait MealAnalyzer {
    fn analyze(&self, image: &[u8], mime: &str) -> Result<MealAnalysis>;
}

/// Metabolic-equivalent lookup for an activity at a given intensity
pub trait MetLookup {
    fn lookup(&self, activity: &str, intensity: Intensity) -> Result<f64>;
}

/// A fixed MET value, for caller-supplied or test inputs
pub struct FixedMet(pub f64);

impl MetLookup for FixedMet {
    fn lookup(&self, _activity: &str, _intensity: Intensity) -> Result<f64> {
        Ok(self.0)
    }
}

/// Look up a MET value, falling back to the resting equivalent
///
/// Lookup failures and non-positive results never propagate; the calorie
/// computation downstream always terminates with a number.
pub fn met_or_resting(source: &dyn MetLookup, activity: &str, intensity: Intensity) -> f64 {
    match source.lookup(activity, intensity) {
        Ok(met) if met > 0.0 => met,
        Ok(met) => {
            tracing::warn!(
                "MET lookup for '{}' returned non-positive value {}. Using resting equivalent.",
                activity,
                met
            );
            RESTING_MET
        }
        Err(e) => {
            tracing::warn!(
                "MET lookup for '{}' failed: {}. Using resting equivalent.",
                activity,
                e
            );
            RESTING_MET
        }
    }
}

/// Validate inputs and build an activity entry
///
/// Rejects (rather than silently zeroing) a missing activity name, a
/// non-positive duration, or an unset profile weight; no partial entry is
/// created on failure.
pub fn build_activity(
    name: &str,
    duration_minutes: f64,
    intensity: Intensity,
    met: f64,
    profile: &UserProfile,
) -> Result<ActivityEntry> {
    if name.trim().is_empty() {
        return Err(Error::Validation("activity name is required".into()));
    }
    if !(duration_minutes > 0.0) {
        return Err(Error::Validation(
            "activity duration must be greater than zero minutes".into(),
        ));
    }
    if !(profile.weight_kg > 0.0) {
        return Err(Error::Validation(
            "set your profile weight before logging activities".into(),
        ));
    }

    Ok(ActivityEntry {
        id: new_entry_id(),
        name: name.trim().to_string(),
        duration_minutes,
        intensity,
        met_value: met,
        calories_burned: activity_calories(met, profile.weight_kg, duration_minutes),
        timestamp: display_clock_time(),
    })
}

/// Encode captured image bytes as a self-contained `data:` URL handle
///
/// The handle is opaque to the rest of the core; its only cost is size,
/// which is what trips the meal-log storage quota.
pub fn encode_image_ref(image: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(image))
}
