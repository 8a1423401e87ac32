//! Export projector: ledger snapshot to report sections.
//!
//! Produces the ordered section sequence an external document renderer
//! consumes. No layout, pagination or drawing here; only data shaping.
//! Summary metrics appear in a fixed order (burned, net calories, protein,
//! carbs, fat); activities and meals follow ledger order.

use crate::derive::{self, daily_totals, goal_progress, macro_percentage, net_calories};
use crate::{ActivityEntry, DailyGoals, Ingredient, Intensity, MealEntry};
use serde::Serialize;

/// One tracked metric with its goal and (unclamped) progress percentage
#[derive(Clone, Debug, Serialize)]
pub struct MetricLine {
    pub label: String,
    pub current: f64,
    pub goal: f64,
    pub unit: &'static str,
    pub percentage: i64,
}

/// One logged activity, flattened for rendering
#[derive(Clone, Debug, Serialize)]
pub struct ActivityLine {
    pub name: String,
    pub intensity: Intensity,
    pub duration_minutes: f64,
    pub met_value: f64,
    pub calories_burned: u32,
}

/// One macro with its share of the meal's calories
#[derive(Clone, Debug, Serialize)]
pub struct MacroLine {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub calorie_share: i64,
}

/// One meal block in ledger order
#[derive(Clone, Debug, Serialize)]
pub struct MealBlock {
    pub title: String,
    pub timestamp: String,
    pub calories: f64,
    pub macros: Vec<MacroLine>,
    pub ingredients: Vec<Ingredient>,
    pub image_ref: String,
}

/// Ordered report sections handed to the external document renderer
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportSection {
    Header {
        title: String,
        date: String,
    },
    DailySummary {
        metrics: Vec<MetricLine>,
        net_calories: f64,
    },
    Activities(Vec<ActivityLine>),
    Meal(MealBlock),
}

fn metric(label: &str, current: f64, goal: f64, unit: &'static str) -> MetricLine {
    MetricLine {
        label: label.into(),
        current,
        goal,
        unit,
        percentage: goal_progress(current, goal).round() as i64,
    }
}

/// Project the current ledger and its derived aggregates into sections
pub fn project_report(
    meals: &[MealEntry],
    activities: &[ActivityEntry],
    goals: &DailyGoals,
    date: &str,
) -> Vec<ReportSection> {
    let totals = daily_totals(meals, activities);
    let net = net_calories(&totals);

    let mut sections = vec![
        ReportSection::Header {
            title: "NutriVision Daily Report".into(),
            date: date.into(),
        },
        ReportSection::DailySummary {
            metrics: vec![
                metric(
                    "Calories burned",
                    f64::from(totals.burned),
                    goals.burned_calories,
                    "kcal",
                ),
                metric("Net calories", net, goals.calories, "kcal"),
                metric("Protein", totals.protein, goals.protein, "g"),
                metric("Carbs", totals.carbs, goals.carbs, "g"),
                metric("Fat", totals.fat, goals.fat, "g"),
            ],
            net_calories: net,
        },
    ];

    if !activities.is_empty() {
        sections.push(ReportSection::Activities(
            activities
                .iter()
                .map(|a| ActivityLine {
                    name: a.name.clone(),
                    intensity: a.intensity,
                    duration_minutes: a.duration_minutes,
                    met_value: a.met_value,
                    calories_burned: a.calories_burned,
                })
                .collect(),
        ));
    }

    for meal in meals {
        sections.push(ReportSection::Meal(MealBlock {
            title: meal.title.clone(),
            timestamp: meal.timestamp.clone(),
            calories: meal.calories,
            macros: meal
                .macros
                .iter()
                .map(|m| MacroLine {
                    name: m.name.clone(),
                    amount: m.amount,
                    unit: m.unit.clone(),
                    calorie_share: macro_percentage(&m.name, m.amount, meal.calories),
                })
                .collect(),
            ingredients: meal.ingredients.clone(),
            image_ref: meal.image_ref.clone(),
        }));
    }

    tracing::debug!(
        "Projected report: {} sections for {} meals, {} activities",
        sections.len(),
        meals.len(),
        activities.len()
    );
    sections
}

/// Progress-bar fill for a metric line, clamped for rendering only
pub fn metric_bar(line: &MetricLine) -> f64 {
    derive::clamped_bar(line.percentage as f64)
}
