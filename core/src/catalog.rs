//! Built-in food reference data and the mock barcode table.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::Food;
use crate::service::FoodLookupProvider;

/// Number of matches the food search shows.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Serving size given to manually entered foods.
pub const MANUAL_SERVING_G: f64 = 100.0;

struct CatalogFood {
    id: &'static str,
    name: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving_size: f64,
}

impl CatalogFood {
    fn to_food(&self) -> Food {
        Food {
            id: self.id.to_string(),
            name: self.name.to_string(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            serving_size: self.serving_size,
        }
    }
}

const fn food(
    id: &'static str,
    name: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving_size: f64,
) -> CatalogFood {
    CatalogFood {
        id,
        name,
        calories,
        protein,
        carbs,
        fat,
        serving_size,
    }
}

// Per 100 g; last column is the default serving in grams.
const FOOD_DATABASE: &[CatalogFood] = &[
    food("1", "Apple", 52.0, 0.3, 14.0, 0.2, 182.0),
    food("2", "Banana", 89.0, 1.1, 23.0, 0.3, 118.0),
    food("3", "Chicken Breast (cooked)", 165.0, 31.0, 0.0, 3.6, 100.0),
    food("4", "Brown Rice (cooked)", 123.0, 2.7, 25.6, 1.0, 195.0),
    food("5", "Salmon (cooked)", 206.0, 22.0, 0.0, 12.0, 100.0),
    food("6", "Broccoli (steamed)", 35.0, 2.4, 7.2, 0.4, 100.0),
    food("7", "Egg (large)", 155.0, 13.0, 1.1, 11.0, 50.0),
    food("8", "Almonds", 579.0, 21.0, 22.0, 49.0, 28.0),
    food("9", "Oats (uncooked)", 389.0, 16.9, 66.3, 6.9, 80.0),
    food("10", "Greek Yogurt (plain)", 59.0, 10.0, 3.6, 0.4, 170.0),
    food("11", "Quinoa (cooked)", 120.0, 4.1, 21.3, 1.9, 185.0),
    food("12", "Avocado", 160.0, 2.0, 9.0, 15.0, 200.0),
    food("13", "Sweet Potato (baked)", 90.0, 2.0, 21.0, 0.1, 180.0),
    food("14", "Tofu (firm)", 76.0, 8.0, 1.9, 4.8, 100.0),
    food("15", "Milk (whole)", 61.0, 3.2, 4.8, 3.3, 244.0),
    food("16", "Peanut Butter", 588.0, 25.0, 20.0, 50.0, 32.0),
    food("17", "White Bread", 265.0, 9.0, 49.0, 3.2, 25.0),
    food("18", "Pasta (cooked)", 131.0, 5.0, 25.0, 1.1, 140.0),
    food("19", "Olive Oil", 884.0, 0.0, 0.0, 100.0, 15.0),
    food("20", "Spinach (raw)", 23.0, 2.9, 3.6, 0.4, 30.0),
    food("21", "Beef (ground, 85% lean)", 217.0, 19.0, 0.0, 15.0, 100.0),
    food("22", "Lentils (cooked)", 116.0, 9.0, 20.0, 0.4, 198.0),
    food("23", "Cheddar Cheese", 404.0, 25.0, 1.3, 33.0, 28.0),
    food("24", "Blueberries", 57.0, 0.7, 14.0, 0.3, 148.0),
    food("25", "Carrots (raw)", 41.0, 0.9, 10.0, 0.2, 61.0),
    food("26", "Cucumber", 15.0, 0.7, 3.6, 0.1, 104.0),
    food("27", "Tomatoes", 18.0, 0.9, 3.9, 0.2, 123.0),
    food("28", "Onion", 40.0, 1.1, 9.3, 0.1, 110.0),
    food("29", "Bell Pepper (red)", 31.0, 1.0, 6.0, 0.3, 164.0),
    food("30", "Hummus", 166.0, 7.9, 14.3, 9.6, 30.0),
];

const BARCODE_DATABASE: &[(&str, CatalogFood)] = &[
    (
        "123456789012",
        food("31", "Protein Bar", 400.0, 20.0, 45.0, 18.0, 60.0),
    ),
    (
        "987654321098",
        food("10", "Greek Yogurt (plain)", 59.0, 10.0, 3.6, 0.4, 170.0),
    ),
    (
        "555555555555",
        food("9", "Oats (uncooked)", 389.0, 16.9, 66.3, 6.9, 80.0),
    ),
];

#[must_use]
pub fn all_foods() -> Vec<Food> {
    FOOD_DATABASE.iter().map(CatalogFood::to_food).collect()
}

/// Case-insensitive substring match on the food name, in catalog order.
///
/// An empty query matches nothing.
#[must_use]
pub fn search(query: &str, limit: usize) -> Vec<Food> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    FOOD_DATABASE
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .take(limit)
        .map(CatalogFood::to_food)
        .collect()
}

#[must_use]
pub fn lookup_barcode(code: &str) -> Option<Food> {
    let code = code.trim();
    BARCODE_DATABASE
        .iter()
        .find(|(barcode, _)| *barcode == code)
        .map(|(_, f)| f.to_food())
}

/// A one-off food entered by hand, nutrition per 100 g.
#[must_use]
pub fn manual_food(
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    now: DateTime<Utc>,
) -> Food {
    Food {
        id: format!("manual-{}", now.timestamp_millis()),
        name: name.to_string(),
        calories,
        protein,
        carbs,
        fat,
        serving_size: MANUAL_SERVING_G,
    }
}

/// [`FoodLookupProvider`] backed by the built-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl FoodLookupProvider for BuiltinCatalog {
    fn search(&self, query: &str) -> Result<Vec<Food>> {
        Ok(search(query, FOOD_DATABASE.len()))
    }

    fn lookup_barcode(&self, barcode: &str) -> Result<Option<Food>> {
        Ok(lookup_barcode(barcode))
    }
}
