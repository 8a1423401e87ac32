//! Share links and their resolution.
//!
//! A shared meal travels as a single `mealId` query parameter on an
//! external link. Resolution runs once at startup against the meal log
//! (which is loaded synchronously first) and yields one of three outcomes:
//! normal mode, a read-only shared view of one entry, or a not-found
//! condition the caller surfaces as a dismissible error with a way back to
//! normal mode. The resolver holds no state; leaving shared view is the
//! caller dropping its reference.

use crate::derive::{macro_amount, MacroKind};
use crate::MealEntry;

/// The recognized share query parameter
pub const SHARE_PARAM: &str = "mealId";

/// Outcome of resolving an inbound link against the meal log
#[derive(Clone, Debug)]
pub enum ShareResolution {
    /// No share parameter: normal interactive mode
    Normal,
    /// The referenced meal, for a read-only shared view
    Shared(MealEntry),
    /// The parameter was present but no meal matches this id
    NotFound(String),
}

/// Build the share link for a meal
pub fn share_link(base_url: &str, meal_id: &str) -> String {
    let base = base_url.trim_end_matches(['?', '&']);
    format!("{}?{}={}", base, SHARE_PARAM, meal_id)
}

/// Extract the shared meal id from a link, if present
pub fn meal_id_from_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == SHARE_PARAM && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolve an inbound link against the loaded meal log
pub fn resolve(url: &str, meals: &[MealEntry]) -> ShareResolution {
    match meal_id_from_url(url) {
        None => ShareResolution::Normal,
        Some(id) => match meals.iter().find(|m| m.id == id) {
            Some(meal) => {
                tracing::info!("Resolved shared meal {}", id);
                ShareResolution::Shared(meal.clone())
            }
            None => {
                tracing::warn!("Share reference {} has no matching meal", id);
                ShareResolution::NotFound(id)
            }
        },
    }
}

/// Human-readable share payload accompanying the link
pub fn share_summary(meal: &MealEntry, link: &str) -> String {
    let fmt_macro = |kind| {
        let amount = macro_amount(meal, kind);
        if amount > 0.0 {
            format!("{:.1}g", amount)
        } else {
            "n/a".into()
        }
    };

    let mut out = String::new();
    out.push_str(&format!("Meal: {}\n", meal.title));
    if !meal.description.is_empty() {
        out.push_str(&format!("Description: {}\n", meal.description));
    }
    if !meal.ingredients.is_empty() {
        out.push_str("\nIngredients:\n");
        for ing in &meal.ingredients {
            match ing.percentage {
                Some(p) => out.push_str(&format!(
                    "- {}: {}{} ({:.0}%)\n",
                    ing.name, ing.amount, ing.unit, p
                )),
                None => out.push_str(&format!("- {}: {}{}\n", ing.name, ing.amount, ing.unit)),
            }
        }
    }
    out.push_str(&format!("\nCalories: {:.0} kcal\n", meal.calories));
    out.push_str(&format!("Protein: {}\n", fmt_macro(MacroKind::Protein)));
    out.push_str(&format!("Carbs: {}\n", fmt_macro(MacroKind::Carbs)));
    out.push_str(&format!("Fat: {}\n", fmt_macro(MacroKind::Fat)));
    out.push_str(&format!("\nFull details: {}\n", link));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Nutrient;

    fn meal(id: &str) -> MealEntry {
        MealEntry {
            id: id.into(),
            timestamp: "t".into(),
            image_ref: "img".into(),
            title: "Feijoada".into(),
            description: "Black bean stew".into(),
            calories: 750.0,
            macros: vec![Nutrient {
                name: "Proteína".into(),
                amount: 38.0,
                unit: "g".into(),
            }],
            micros: vec![],
            ingredients: vec![],
        }
    }

    #[test]
    fn test_share_link_format() {
        assert_eq!(
            share_link("https://nutrivision.app/", "m1"),
            "https://nutrivision.app/?mealId=m1"
        );
    }

    #[test]
    fn test_meal_id_from_url() {
        assert_eq!(
            meal_id_from_url("https://x.app/?mealId=m1"),
            Some("m1".into())
        );
        assert_eq!(
            meal_id_from_url("https://x.app/?utm=z&mealId=m1#top"),
            Some("m1".into())
        );
        assert_eq!(meal_id_from_url("https://x.app/"), None);
        assert_eq!(meal_id_from_url("https://x.app/?mealId="), None);
        assert_eq!(meal_id_from_url("https://x.app/?other=m1"), None);
    }

    #[test]
    fn test_resolve_found() {
        let meals = vec![meal("m1"), meal("m2")];
        match resolve("https://x.app/?mealId=m1", &meals) {
            ShareResolution::Shared(m) => assert_eq!(m.id, "m1"),
            other => panic!("expected Shared, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let meals = vec![meal("m1")];
        match resolve("https://x.app/?mealId=m9", &meals) {
            ShareResolution::NotFound(id) => assert_eq!(id, "m9"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_absent_param_is_normal() {
        let meals = vec![meal("m1")];
        assert!(matches!(
            resolve("https://x.app/", &meals),
            ShareResolution::Normal
        ));
    }

    #[test]
    fn test_share_summary_contents() {
        let m = meal("m1");
        let link = share_link("https://x.app/", "m1");
        let text = share_summary(&m, &link);
        assert!(text.contains("Feijoada"));
        assert!(text.contains("750 kcal"));
        assert!(text.contains("Protein: 38.0g"));
        assert!(text.contains("mealId=m1"));
    }
}
