use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::analysis::ImageAnalysisProvider;
use crate::catalog;
use crate::db::Database;
use crate::error::TrackerError;
use crate::models::{
    DailySummary, Food, FoodLogEntry, MealGroup, MealType, NewFoodLogEntry, NewRecipe, NewUser,
    ProgressDay, Recipe, RecipeIngredient, User, WeightEntry, validate_food_data, validate_grams,
    validate_profile, validate_recipe, validate_weight,
};
use crate::nutrition;

/// Source of reference foods for search and barcode scans.
///
/// The built-in catalog implements this; a remote food database can be
/// plugged in the same way.
pub trait FoodLookupProvider: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Food>>;
    fn lookup_barcode(&self, barcode: &str) -> Result<Option<Food>>;
}

pub struct TrackerService {
    db: Database,
}

impl TrackerService {
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Users ---

    pub fn find_user(&self, email: &str) -> Result<Option<User>> {
        self.db.find_user(email)
    }

    /// Validate a signup, derive its calorie goal and store it.
    pub fn register_user(&self, new_user: NewUser) -> Result<User> {
        validate_profile(
            &new_user.name,
            &new_user.email,
            new_user.age,
            new_user.weight,
            new_user.height,
        )?;
        let mut user = new_user.into_user(0);
        user.daily_calorie_goal = nutrition::calculate_daily_calorie_goal(&user);
        self.db.insert_user(&user)?;
        Ok(user)
    }

    /// Validate a profile edit, recompute the calorie goal and replace the stored user.
    pub fn save_profile(&self, user: &User) -> Result<User> {
        validate_profile(&user.name, &user.email, user.age, user.weight, user.height)?;
        let mut updated = user.clone();
        updated.daily_calorie_goal = nutrition::calculate_daily_calorie_goal(&updated);
        if !self.db.update_user(&updated)? {
            return Err(TrackerError::UserNotFound(updated.email).into());
        }
        Ok(updated)
    }

    pub fn current_user_email(&self) -> Result<Option<String>> {
        self.db.get_current_user_email()
    }

    pub fn set_current_user_email(&self, email: &str) -> Result<()> {
        self.db.set_current_user_email(email)
    }

    pub fn clear_current_user(&self) -> Result<bool> {
        self.db.clear_current_user()
    }

    // --- Food Log ---

    pub fn log_food(
        &self,
        email: &str,
        food: &Food,
        meal_type: MealType,
        grams: f64,
    ) -> Result<FoodLogEntry> {
        self.log_food_at(email, food, meal_type, grams, Utc::now())
    }

    /// Scale `food` to `grams` and append it to the user's log at `now`.
    pub fn log_food_at(
        &self,
        email: &str,
        food: &Food,
        meal_type: MealType,
        grams: f64,
        now: DateTime<Utc>,
    ) -> Result<FoodLogEntry> {
        validate_grams(grams)?;
        validate_food_data(food)?;
        let scaled = nutrition::scale(food, grams);
        let entry = NewFoodLogEntry {
            food_id: food.id.clone(),
            name: food.name.clone(),
            meal_type,
            grams,
            calories: scaled.calories,
            protein: scaled.protein,
            carbs: scaled.carbs,
            fat: scaled.fat,
        };
        let saved = self.db.add_food_log_entry(email, &entry, now)?;
        debug!(id = %saved.id, food = %saved.name, meal = %meal_type, "logged food");
        Ok(saved)
    }

    pub fn get_food_log_for_date(&self, email: &str, date: NaiveDate) -> Result<Vec<FoodLogEntry>> {
        self.db.get_food_log_for_date(email, date)
    }

    pub fn delete_food_log_entry(&self, email: &str, entry_id: &str) -> Result<bool> {
        self.db.delete_food_log_entry(email, entry_id)
    }

    pub fn get_food_logs_for_past_days(
        &self,
        email: &str,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, Vec<FoodLogEntry>>> {
        self.db.get_food_logs_for_past_days(email, days, today())
    }

    /// Entries for `date` grouped by meal, with totals against the user's goal.
    pub fn get_daily_summary(&self, user: &User, date: NaiveDate) -> Result<DailySummary> {
        let entries = self.db.get_food_log_for_date(&user.email, date)?;
        Ok(build_daily_summary(user, date, entries))
    }

    pub fn get_progress(&self, user: &User, days: u32) -> Result<Vec<ProgressDay>> {
        self.get_progress_until(user, days, today())
    }

    /// Per-day totals for the `days` days ending at `today`, oldest first.
    pub fn get_progress_until(
        &self,
        user: &User,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<ProgressDay>> {
        let by_date = self.db.get_food_logs_for_past_days(&user.email, days, today)?;
        Ok(by_date
            .into_iter()
            .map(|(date, entries)| {
                let totals = nutrition::sum_entries(&entries);
                #[allow(clippy::cast_possible_truncation)]
                let calories = totals.calories.round() as i64;
                ProgressDay {
                    date,
                    entry_count: entries.len(),
                    calories,
                    goal: user.daily_calorie_goal,
                    protein: totals.protein,
                    carbs: totals.carbs,
                    fat: totals.fat,
                }
            })
            .collect())
    }

    // --- Weight ---

    /// Record today's weight in kg, replacing an earlier reading from today.
    pub fn log_weight(&self, email: &str, weight_kg: f64) -> Result<WeightEntry> {
        validate_weight(weight_kg)?;
        self.db.add_weight_entry(email, weight_kg, today())
    }

    pub fn get_weight_history(&self, email: &str) -> Result<Vec<WeightEntry>> {
        self.db.get_weight_history(email)
    }

    // --- Recipes ---

    /// Validate, aggregate totals over the ingredients and save.
    pub fn create_recipe(
        &self,
        email: &str,
        name: &str,
        servings: u32,
        ingredients: Vec<RecipeIngredient>,
    ) -> Result<Recipe> {
        validate_recipe(name, servings, &ingredients)?;
        let recipe = NewRecipe::from_ingredients(name.trim().to_string(), servings, ingredients);
        self.db.save_recipe(email, &recipe)
    }

    pub fn get_recipes(&self, email: &str) -> Result<Vec<Recipe>> {
        self.db.get_recipes(email)
    }

    /// Find a recipe by exact id, then by case-insensitive name.
    pub fn find_recipe(&self, email: &str, name_or_id: &str) -> Result<Option<Recipe>> {
        let recipes = self.db.get_recipes(email)?;
        if let Some(r) = recipes.iter().find(|r| r.id == name_or_id) {
            return Ok(Some(r.clone()));
        }
        let lower = name_or_id.trim().to_lowercase();
        Ok(recipes.into_iter().find(|r| r.name.to_lowercase() == lower))
    }

    pub fn delete_recipe(&self, email: &str, recipe_id: &str) -> Result<bool> {
        self.db.delete_recipe(email, recipe_id)
    }

    // --- Food lookups ---

    /// Search through `provider`, keeping at most `limit` results.
    pub fn search_foods(
        &self,
        provider: &dyn FoodLookupProvider,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Food>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut foods = provider.search(query)?;
        foods.truncate(limit);
        Ok(foods)
    }

    pub fn barcode_lookup(
        &self,
        provider: &dyn FoodLookupProvider,
        code: &str,
    ) -> Result<Option<Food>> {
        provider.lookup_barcode(code.trim())
    }

    /// Build a hand-entered food (per 100 g). Calories must be positive.
    pub fn manual_food(
        &self,
        name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Result<Food> {
        let food = catalog::manual_food(name.trim(), calories, protein, carbs, fat, Utc::now());
        validate_food_data(&food)?;
        if food.calories <= 0.0 {
            bail!("Calories must be greater than 0");
        }
        Ok(food)
    }

    pub fn analyze_food_image(
        &self,
        provider: &dyn ImageAnalysisProvider,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Vec<Food>> {
        if image.is_empty() {
            bail!("Image is empty");
        }
        let foods = provider.analyze(image, mime_type)?;
        if foods.is_empty() {
            return Err(TrackerError::NoFoodDetected.into());
        }
        debug!(count = foods.len(), "image analysis detected foods");
        Ok(foods)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn build_daily_summary(user: &User, date: NaiveDate, entries: Vec<FoodLogEntry>) -> DailySummary {
    let totals = nutrition::sum_entries(&entries);
    let (remaining_calories, progress_pct) =
        nutrition::calorie_progress(user.daily_calorie_goal, totals.calories);

    let meals = MealType::ALL
        .into_iter()
        .map(|meal_type| {
            let group: Vec<FoodLogEntry> = entries
                .iter()
                .filter(|e| e.meal_type == meal_type)
                .cloned()
                .collect();
            MealGroup {
                meal_type,
                subtotal: nutrition::sum_entries(&group),
                entries: group,
            }
        })
        .collect();

    DailySummary {
        date: date.format("%Y-%m-%d").to_string(),
        meals,
        totals,
        goal: user.daily_calorie_goal,
        remaining_calories,
        progress_pct,
    }
}
