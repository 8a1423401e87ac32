//! Derivation engine: pure functions over the ledger.
//!
//! Everything here is computed on demand and never stored. Nutrient names
//! arrive as free-text labels from the analysis service (often Portuguese,
//! sometimes English), so classification works by case-insensitive
//! substring containment against small keyword-fragment tables rather than
//! a fixed vocabulary. Anything unmatched gets the 4 kcal/g default.

use crate::{ActivityEntry, MealEntry};
use once_cell::sync::Lazy;

/// Fragments identifying fat/lipid labels (9 kcal/g)
static FAT_FRAGMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["gord", "fat", "lipid"]);

/// Fragments identifying alcohol labels (7 kcal/g)
static ALCOHOL_FRAGMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["alco"]);

/// Fragments identifying protein labels
static PROTEIN_FRAGMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["prote"]);

/// Fragments identifying carbohydrate labels
static CARB_FRAGMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["carbo", "carb"]);

fn matches_any(name: &str, fragments: &[&str]) -> bool {
    let lower = name.to_lowercase();
    fragments.iter().any(|f| lower.contains(f))
}

/// Calorie density in kcal/g for a free-text nutrient label
///
/// Fat fragments map to 9, alcohol to 7, everything else (protein and
/// carbohydrate labels included) to 4.
pub fn calorie_density(name: &str) -> f64 {
    if matches_any(name, &FAT_FRAGMENTS) {
        9.0
    } else if matches_any(name, &ALCOHOL_FRAGMENTS) {
        7.0
    } else {
        4.0
    }
}

/// Share of a meal's total calories contributed by one macro, rounded
///
/// Defined as `0` when the meal total is zero or negative. Because total
/// calories are editable independently of macro grams, shares across a
/// meal's macros need not sum to 100.
pub fn macro_percentage(name: &str, grams: f64, total_calories: f64) -> i64 {
    if total_calories <= 0.0 {
        return 0;
    }
    (grams * calorie_density(name) / total_calories * 100.0).round() as i64
}

/// Macro categories tracked against daily goals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacroKind {
    Protein,
    Carbs,
    Fat,
}

impl MacroKind {
    fn fragments(self) -> &'static [&'static str] {
        match self {
            MacroKind::Protein => &PROTEIN_FRAGMENTS,
            MacroKind::Carbs => &CARB_FRAGMENTS,
            MacroKind::Fat => &FAT_FRAGMENTS,
        }
    }
}

/// Amount of the first macro in a meal whose label matches the category
///
/// A meal without a recognizably named macro contributes `0.0` to that
/// category's daily total; this is not an error.
pub fn macro_amount(meal: &MealEntry, kind: MacroKind) -> f64 {
    meal.macros
        .iter()
        .find(|m| matches_any(&m.name, kind.fragments()))
        .map(|m| m.amount)
        .unwrap_or(0.0)
}

/// Aggregated daily metrics derived from the ledger
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub burned: u32,
}

/// Sum a day's meals and activities into daily totals
pub fn daily_totals(meals: &[MealEntry], activities: &[ActivityEntry]) -> DailyTotals {
    let mut totals = DailyTotals::default();
    for meal in meals {
        totals.calories += meal.calories;
        totals.protein += macro_amount(meal, MacroKind::Protein);
        totals.carbs += macro_amount(meal, MacroKind::Carbs);
        totals.fat += macro_amount(meal, MacroKind::Fat);
    }
    totals.burned = activities.iter().map(|a| a.calories_burned).sum();
    totals
}

/// Net calorie balance: consumed minus burned, may be negative
pub fn net_calories(totals: &DailyTotals) -> f64 {
    totals.calories - f64::from(totals.burned)
}

/// Progress toward a goal as a percentage, `0` when the goal is unset
///
/// Not clamped: values over 100 indicate over-goal and are surfaced as-is.
pub fn goal_progress(current: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        current / goal * 100.0
    } else {
        0.0
    }
}

/// Visual fill for a progress bar, clamped to `[0, 100]`
///
/// Only the bar is clamped; numeric labels report `goal_progress` directly.
pub fn clamped_bar(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}

/// Estimated calories burned: `round(MET * weight * hours)`
///
/// Callers must validate `weight_kg > 0` first (see `services::build_activity`);
/// this function only does the arithmetic.
pub fn activity_calories(met: f64, weight_kg: f64, duration_minutes: f64) -> u32 {
    (met * weight_kg * (duration_minutes / 60.0)).round().max(0.0) as u32
}
