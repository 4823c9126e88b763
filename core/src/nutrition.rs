//! Nutrition arithmetic: energy expenditure, per-100 g scaling and aggregation.
//!
//! Everything here is pure. Inputs are not range-checked; callers validate
//! biometrics and quantities before they get this far.

use crate::models::{Food, FoodLogEntry, Gender, Macros, RecipeIngredient, User};

/// Basal metabolic rate in kcal/day (revised Harris-Benedict).
///
/// Weight in kg, height in cm, age in years.
#[must_use]
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let age = f64::from(age);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// `round(BMR × activity factor)` for the user's current biometrics.
#[must_use]
pub fn calculate_daily_calorie_goal(user: &User) -> i64 {
    let bmr = calculate_bmr(user.weight, user.height, user.age, user.gender);
    (bmr * user.activity_level.factor()).round() as i64
}

/// Nutrition for `grams` of a food stored per 100 g.
#[must_use]
pub fn scale(food: &Food, grams: f64) -> Macros {
    food.per_100g().scaled(grams / 100.0)
}

#[must_use]
pub fn sum_entries(entries: &[FoodLogEntry]) -> Macros {
    entries.iter().map(FoodLogEntry::macros).sum()
}

/// Whole-recipe totals: each ingredient's per-100 g values scaled by grams used.
#[must_use]
pub fn recipe_totals(ingredients: &[RecipeIngredient]) -> Macros {
    ingredients
        .iter()
        .map(|ing| scale(&ing.food, ing.grams))
        .sum()
}

/// Totals for one serving, or `None` when `servings < 1`.
#[must_use]
pub fn per_serving(totals: Macros, servings: u32) -> Option<Macros> {
    if servings < 1 {
        return None;
    }
    Some(totals.scaled(1.0 / f64::from(servings)))
}

/// Returns `(remaining_calories, progress_pct)` for a day.
///
/// Remaining goes negative once the goal is exceeded; progress is capped at 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calorie_progress(goal: i64, eaten: f64) -> (f64, f64) {
    let goal = goal as f64;
    let remaining = goal - eaten;
    let pct = if goal > 0.0 {
        (eaten / goal * 100.0).min(100.0)
    } else {
        0.0
    };
    (remaining, pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, MealType, NewFoodLogEntry};

    fn sample_user(gender: Gender, activity_level: ActivityLevel) -> User {
        User {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            age: 25,
            weight: 70.0,
            height: 175.0,
            gender,
            activity_level,
            daily_calorie_goal: 0,
        }
    }

    fn chicken() -> Food {
        Food {
            id: "3".to_string(),
            name: "Chicken Breast (cooked)".to_string(),
            calories: 165.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
            serving_size: 100.0,
        }
    }

    #[test]
    fn test_bmr_male() {
        // 88.362 + 937.79 + 839.825 - 141.925
        let bmr = calculate_bmr(70.0, 175.0, 25, Gender::Male);
        assert!((bmr - 1724.052).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_female() {
        // 447.593 + 554.82 + 511.17 - 129.9
        let bmr = calculate_bmr(60.0, 165.0, 30, Gender::Female);
        assert!((bmr - 1383.683).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_no_bounds_checking() {
        let bmr = calculate_bmr(0.0, 0.0, 0, Gender::Male);
        assert!((bmr - 88.362).abs() < 1e-9);
    }

    #[test]
    fn test_daily_goal_light_male() {
        let user = sample_user(Gender::Male, ActivityLevel::Light);
        // round(1724.052 * 1.375) = round(2370.5715)
        assert_eq!(calculate_daily_calorie_goal(&user), 2371);
    }

    #[test]
    fn test_daily_goal_every_level() {
        let expected = [
            (ActivityLevel::Sedentary, 2069),
            (ActivityLevel::Light, 2371),
            (ActivityLevel::Moderate, 2672),
            (ActivityLevel::Active, 2974),
            (ActivityLevel::Very, 3276),
        ];
        for (level, goal) in expected {
            let user = sample_user(Gender::Male, level);
            assert_eq!(calculate_daily_calorie_goal(&user), goal, "{level}");
        }
    }

    #[test]
    fn test_scale_food() {
        let m = scale(&chicken(), 150.0);
        assert!((m.calories - 247.5).abs() < 1e-9);
        assert!((m.protein - 46.5).abs() < 1e-9);
        assert!(m.carbs.abs() < f64::EPSILON);
        assert!((m.fat - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_sum_entries() {
        let make = |cal: f64| {
            NewFoodLogEntry {
                food_id: "x".to_string(),
                name: "x".to_string(),
                meal_type: MealType::Lunch,
                grams: 100.0,
                calories: cal,
                protein: 1.0,
                carbs: 2.0,
                fat: 3.0,
            }
            .into_entry("id".to_string(), "2024-06-15T10:00:00.000Z".to_string())
        };
        let total = sum_entries(&[make(100.0), make(250.0)]);
        assert!((total.calories - 350.0).abs() < 1e-9);
        assert!((total.fat - 6.0).abs() < 1e-9);
        assert_eq!(sum_entries(&[]), Macros::default());
    }

    #[test]
    fn test_recipe_totals() {
        let rice = Food {
            id: "4".to_string(),
            name: "Brown Rice (cooked)".to_string(),
            calories: 123.0,
            protein: 2.7,
            carbs: 25.6,
            fat: 1.0,
            serving_size: 195.0,
        };
        let ings = vec![
            RecipeIngredient {
                food: chicken(),
                grams: 200.0,
            },
            RecipeIngredient {
                food: rice,
                grams: 300.0,
            },
        ];
        let totals = recipe_totals(&ings);
        // 330 + 369
        assert!((totals.calories - 699.0).abs() < 1e-9);
        // 62 + 8.1
        assert!((totals.protein - 70.1).abs() < 1e-9);
        // 0 + 76.8
        assert!((totals.carbs - 76.8).abs() < 1e-9);
        // 7.2 + 3
        assert!((totals.fat - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_per_serving_divides_every_macro() {
        let totals = Macros {
            calories: 900.0,
            protein: 60.0,
            carbs: 90.0,
            fat: 30.0,
        };
        for servings in 1..=6 {
            let per = per_serving(totals, servings).unwrap();
            let s = f64::from(servings);
            assert!((per.calories - totals.calories / s).abs() < 1e-9);
            assert!((per.protein - totals.protein / s).abs() < 1e-9);
            assert!((per.carbs - totals.carbs / s).abs() < 1e-9);
            assert!((per.fat - totals.fat / s).abs() < 1e-9);
        }
    }

    #[test]
    fn test_per_serving_rejects_zero() {
        assert!(per_serving(Macros::default(), 0).is_none());
    }

    #[test]
    fn test_calorie_progress() {
        let (remaining, pct) = calorie_progress(2000, 500.0);
        assert!((remaining - 1500.0).abs() < f64::EPSILON);
        assert!((pct - 25.0).abs() < f64::EPSILON);

        let (remaining, pct) = calorie_progress(2000, 2500.0);
        assert!((remaining + 500.0).abs() < f64::EPSILON);
        assert!((pct - 100.0).abs() < f64::EPSILON);

        let (_, pct) = calorie_progress(0, 500.0);
        assert!(pct.abs() < f64::EPSILON);
    }
}
