//! Core domain types for the NutriVision ledger.
//!
//! This module defines the fundamental types used throughout the system:
//! - Nutrients and ingredients as returned by image analysis
//! - Meal and activity log entries
//! - User profile and daily goals
//!
//! Nutrient names are free-text labels supplied by the analysis service,
//! not a closed enum; all categorical matching against them lives in the
//! `derive` module.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Nutrition Types
// ============================================================================

/// One macro- or micro-nutrient quantity
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// One identified food component of a meal
///
/// `percentage` estimates this component's share of the whole dish. It is
/// informational only and is not required to sum to 100 across a meal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Structured nutrition estimate returned by the image analysis service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealAnalysis {
    pub title: String,
    pub description: String,
    pub calories: f64,
    pub macros: Vec<Nutrient>,
    pub micros: Vec<Nutrient>,
    pub ingredients: Vec<Ingredient>,
}

// ============================================================================
// Ledger Entry Types
// ============================================================================

/// A logged meal
///
/// `id`, `timestamp` and `image_ref` are immutable after creation; every
/// other field is user-editable. `calories` is editable independently of
/// `macros` and is never recomputed from macro grams; the two may diverge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub timestamp: String,
    pub image_ref: String,
    pub title: String,
    pub description: String,
    pub calories: f64,
    pub macros: Vec<Nutrient>,
    pub micros: Vec<Nutrient>,
    pub ingredients: Vec<Ingredient>,
}

impl MealEntry {
    /// Build a ledger entry from an analysis result plus the immutable
    /// fields assigned at creation time.
    pub fn from_analysis(
        analysis: MealAnalysis,
        id: impl Into<String>,
        timestamp: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            image_ref: image_ref.into(),
            title: analysis.title,
            description: analysis.description,
            calories: coerce_non_negative(analysis.calories),
            macros: analysis.macros,
            micros: analysis.micros,
            ingredients: analysis.ingredients,
        }
    }

    /// Coerce every editable numeric field so malformed input from an
    /// editing surface becomes `0` instead of propagating NaN.
    pub fn coerce_numeric_fields(&mut self) {
        self.calories = coerce_non_negative(self.calories);
        for n in self.macros.iter_mut().chain(self.micros.iter_mut()) {
            n.amount = coerce_non_negative(n.amount);
        }
        for ing in &mut self.ingredients {
            ing.amount = coerce_non_negative(ing.amount);
            ing.percentage = ing.percentage.map(|p| coerce_non_negative(p).min(100.0));
        }
    }
}

/// Perceived effort level for an activity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    Moderate,
    Vigorous,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Light => write!(f, "light"),
            Intensity::Moderate => write!(f, "moderate"),
            Intensity::Vigorous => write!(f, "vigorous"),
        }
    }
}

impl FromStr for Intensity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Intensity::Light),
            "moderate" => Ok(Intensity::Moderate),
            "vigorous" => Ok(Intensity::Vigorous),
            other => Err(crate::Error::Validation(format!(
                "unknown intensity '{}' (expected light, moderate or vigorous)",
                other
            ))),
        }
    }
}

/// A logged physical activity
///
/// Immutable once created; the ledger supports add and delete only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub name: String,
    pub duration_minutes: f64,
    pub intensity: Intensity,
    pub met_value: f64,
    pub calories_burned: u32,
    pub timestamp: String,
}

// ============================================================================
// Singleton State Types
// ============================================================================

/// User body measurements used as calorie-burn inputs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl UserProfile {
    /// Copy with malformed numeric input coerced to zero
    pub fn coerced(&self) -> Self {
        Self {
            weight_kg: coerce_non_negative(self.weight_kg),
            height_cm: coerce_non_negative(self.height_cm),
        }
    }
}

/// Daily nutrition and activity targets (kcal for calories, grams for macros)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub burned_calories: f64,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 120.0,
            carbs: 250.0,
            fat: 60.0,
            burned_calories: 400.0,
        }
    }
}

impl DailyGoals {
    /// Copy with malformed numeric input coerced to zero
    pub fn coerced(&self) -> Self {
        Self {
            calories: coerce_non_negative(self.calories),
            protein: coerce_non_negative(self.protein),
            carbs: coerce_non_negative(self.carbs),
            fat: coerce_non_negative(self.fat),
            burned_calories: coerce_non_negative(self.burned_calories),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Map NaN, infinite and negative numeric input to `0.0`
pub fn coerce_non_negative(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Display-formatted creation timestamp for meal entries
pub fn display_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Display-formatted clock time for activity entries
pub fn display_clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_analysis() -> MealAnalysis {
        MealAnalysis {
            title: "Grilled chicken bowl".into(),
            description: "Chicken, rice and greens".into(),
            calories: 620.0,
            macros: vec![Nutrient {
                name: "Proteína".into(),
                amount: 42.0,
                unit: "g".into(),
            }],
            micros: vec![],
            ingredients: vec![Ingredient {
                name: "Rice".into(),
                amount: 150.0,
                unit: "g".into(),
                percentage: Some(40.0),
            }],
        }
    }

    #[test]
    fn test_from_analysis_keeps_immutable_fields() {
        let meal = MealEntry::from_analysis(sample_analysis(), "m1", "2024-01-01 12:00", "data:x");
        assert_eq!(meal.id, "m1");
        assert_eq!(meal.timestamp, "2024-01-01 12:00");
        assert_eq!(meal.image_ref, "data:x");
        assert_eq!(meal.calories, 620.0);
    }

    #[test]
    fn test_coerce_non_negative() {
        assert_eq!(coerce_non_negative(12.5), 12.5);
        assert_eq!(coerce_non_negative(0.0), 0.0);
        assert_eq!(coerce_non_negative(-3.0), 0.0);
        assert_eq!(coerce_non_negative(f64::NAN), 0.0);
        assert_eq!(coerce_non_negative(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_meal_numeric_coercion() {
        let mut meal = MealEntry::from_analysis(sample_analysis(), "m1", "t", "img");
        meal.calories = f64::NAN;
        meal.macros[0].amount = -5.0;
        meal.ingredients[0].percentage = Some(250.0);
        meal.coerce_numeric_fields();
        assert_eq!(meal.calories, 0.0);
        assert_eq!(meal.macros[0].amount, 0.0);
        assert_eq!(meal.ingredients[0].percentage, Some(100.0));
    }

    #[test]
    fn test_default_goals() {
        let goals = DailyGoals::default();
        assert_eq!(goals.calories, 2000.0);
        assert_eq!(goals.protein, 120.0);
        assert_eq!(goals.carbs, 250.0);
        assert_eq!(goals.fat, 60.0);
        assert_eq!(goals.burned_calories, 400.0);
    }

    #[test]
    fn test_intensity_parse() {
        assert_eq!("Moderate".parse::<Intensity>().unwrap(), Intensity::Moderate);
        assert!("extreme".parse::<Intensity>().is_err());
    }
}
