use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// --- Profile enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => bail!("Invalid gender '{s}'. Must be one of: male, female"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    Very,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::Very,
    ];

    /// Multiplier applied to BMR to estimate total daily expenditure.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Very => 1.9,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::Very => "very",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::Light => "Lightly active (light exercise/sports 1-3 days/week)",
            ActivityLevel::Moderate => {
                "Moderately active (moderate exercise/sports 3-5 days/week)"
            }
            ActivityLevel::Active => "Very active (hard exercise/sports 6-7 days a week)",
            ActivityLevel::Very => "Extra active (very hard exercise/sports & physical job)",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid activity level '{s}'. Must be one of: sedentary, light, moderate, active, very"
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    /// Display order of meal groups in a day.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snacks),
            _ => bail!("Invalid meal type '{s}'. Must be one of: breakfast, lunch, dinner, snacks"),
        }
    }
}

// --- Nutrition values ---

/// Energy and macronutrients for some quantity of food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }

    /// Total grams of protein, carbs and fat.
    #[must_use]
    pub fn macro_grams(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::default(), Add::add)
    }
}

// --- Stored records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub age: u32,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    /// Cached at signup and on every profile save; stale in between.
    pub daily_calorie_goal: i64,
}

/// Signup form: a user before the calorie goal is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl NewUser {
    #[must_use]
    pub fn into_user(self, daily_calorie_goal: i64) -> User {
        User {
            name: self.name,
            email: self.email,
            age: self.age,
            weight: self.weight,
            height: self.height,
            gender: self.gender,
            activity_level: self.activity_level,
            daily_calorie_goal,
        }
    }
}

/// Reference food with nutrition per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Default serving in grams.
    pub serving_size: f64,
}

impl Food {
    #[must_use]
    pub fn per_100g(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub id: String,
    pub food_id: String,
    pub name: String,
    pub meal_type: MealType,
    pub grams: f64,
    // Scaled to `grams`, not per 100 g.
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// RFC 3339 in UTC, e.g. `2024-06-15T12:30:00.000Z`.
    pub timestamp: String,
}

impl FoodLogEntry {
    #[must_use]
    pub fn macros(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }

    /// Whether the entry was logged on `date` (UTC calendar day).
    #[must_use]
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.timestamp
            .starts_with(&date.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLogEntry {
    pub food_id: String,
    pub name: String,
    pub meal_type: MealType,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NewFoodLogEntry {
    #[must_use]
    pub fn into_entry(self, id: String, timestamp: String) -> FoodLogEntry {
        FoodLogEntry {
            id,
            food_id: self.food_id,
            name: self.name,
            meal_type: self.meal_type,
            grams: self.grams,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    /// Kilograms.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[serde(flatten)]
    pub food: Food,
    /// Grams of `food` used in the whole recipe.
    pub grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
    // Whole-recipe totals; never per serving.
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl Recipe {
    #[must_use]
    pub fn totals(&self) -> Macros {
        Macros {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fat: self.total_fat,
        }
    }

    /// Totals divided by servings, or `None` when servings is zero.
    #[must_use]
    pub fn per_serving(&self) -> Option<Macros> {
        crate::nutrition::per_serving(self.totals(), self.servings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl NewRecipe {
    /// Builds a recipe with totals aggregated from its ingredients.
    #[must_use]
    pub fn from_ingredients(
        name: String,
        servings: u32,
        ingredients: Vec<RecipeIngredient>,
    ) -> Self {
        let totals = crate::nutrition::recipe_totals(&ingredients);
        Self {
            name,
            servings,
            ingredients,
            total_calories: totals.calories,
            total_protein: totals.protein,
            total_carbs: totals.carbs,
            total_fat: totals.fat,
        }
    }

    #[must_use]
    pub fn into_recipe(self, id: String) -> Recipe {
        Recipe {
            id,
            name: self.name,
            servings: self.servings,
            ingredients: self.ingredients,
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fat: self.total_fat,
        }
    }
}

// --- Summaries ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    pub meals: Vec<MealGroup>,
    pub totals: Macros,
    pub goal: i64,
    pub remaining_calories: f64,
    pub progress_pct: f64,
}

impl DailySummary {
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.meals.iter().map(|m| m.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealGroup {
    pub meal_type: MealType,
    pub entries: Vec<FoodLogEntry>,
    pub subtotal: Macros,
}

/// One day of the calorie/macro trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDay {
    pub date: NaiveDate,
    /// Entries logged that day, counted before any rounding.
    pub entry_count: usize,
    pub calories: i64,
    pub goal: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

// --- Validation ---

/// Validate profile fields shared by signup and profile updates.
pub fn validate_profile(name: &str, email: &str, age: u32, weight: f64, height: f64) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Name must not be empty");
    }
    if email.trim().is_empty() {
        bail!("Email must not be empty");
    }
    if age == 0 {
        bail!("Age must be greater than 0");
    }
    if !(weight.is_finite() && weight > 0.0) {
        bail!("Weight must be greater than 0");
    }
    if !(height.is_finite() && height > 0.0) {
        bail!("Height must be greater than 0");
    }
    Ok(())
}

/// Validate food data: name must not be empty, nutrition values must not be negative.
pub fn validate_food_data(food: &Food) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    let fields = [
        ("calories", food.calories),
        ("protein", food.protein),
        ("carbs", food.carbs),
        ("fat", food.fat),
        ("servingSize", food.serving_size),
    ];
    for (label, value) in fields {
        if !value.is_finite() || value < 0.0 {
            bail!("{label} must not be negative");
        }
    }
    Ok(())
}

pub fn validate_grams(grams: f64) -> Result<()> {
    if !(grams.is_finite() && grams > 0.0) {
        bail!("Serving size must be greater than 0");
    }
    Ok(())
}

pub fn validate_weight(weight_kg: f64) -> Result<()> {
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        bail!("Weight must be greater than 0");
    }
    Ok(())
}

/// Validate a recipe before saving: name, at least one ingredient, servings >= 1.
pub fn validate_recipe(name: &str, servings: u32, ingredients: &[RecipeIngredient]) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Recipe name must not be empty");
    }
    if servings < 1 {
        bail!("Recipe servings must be at least 1");
    }
    if ingredients.is_empty() {
        bail!("Recipe must have at least one ingredient");
    }
    for ing in ingredients {
        validate_grams(ing.grams)?;
    }
    Ok(())
}
