use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::TrackerError;
use crate::models::{
    FoodLogEntry, NewFoodLogEntry, NewRecipe, Recipe, User, WeightEntry,
};

const KEY_PREFIX: &str = "calorie-tracker";

/// Global list of signed-up users.
pub const USERS_KEY: &str = "calorie-tracker-users";
/// Email of the logged-in user, stored as a bare string.
pub const CURRENT_USER_KEY: &str = "calorie-tracker-currentUser";

/// Per-user collections. Each one lives under its own key as a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    FoodLogs,
    WeightHistory,
    Recipes,
}

impl Collection {
    fn name(self) -> &'static str {
        match self {
            Collection::FoodLogs => "foodLogs",
            Collection::WeightHistory => "weightHistory",
            Collection::Recipes => "recipes",
        }
    }
}

#[must_use]
pub fn user_key(collection: Collection, email: &str) -> String {
    format!("{KEY_PREFIX}-{}-{email}", collection.name())
}

/// ISO 8601 timestamp in UTC with millisecond precision (`...T12:00:00.000Z`).
#[must_use]
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Local key-value store with browser `localStorage` semantics.
///
/// Collections are read and written whole; there is no locking between the
/// read and the write of a mutation, so concurrent writers to one key are
/// last-write-wins.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS local_storage (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Key-value storage ---

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM local_storage WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        debug!(key, bytes = value.len(), "stored item");
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    /// A missing key reads as an empty collection.
    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse stored value for '{key}'")),
            None => Ok(Vec::new()),
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.set_item(key, &raw)
    }

    // --- Users ---

    pub fn get_users(&self) -> Result<Vec<User>> {
        self.read_list(USERS_KEY)
    }

    pub fn find_user(&self, email: &str) -> Result<Option<User>> {
        Ok(self.get_users()?.into_iter().find(|u| u.email == email))
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.get_users()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(TrackerError::UserAlreadyExists(user.email.clone()).into());
        }
        users.push(user.clone());
        self.write_list(USERS_KEY, &users)
    }

    /// Replace the stored user with the same email. Returns false if none matched.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let mut users = self.get_users()?;
        let Some(slot) = users.iter_mut().find(|u| u.email == user.email) else {
            return Ok(false);
        };
        *slot = user.clone();
        self.write_list(USERS_KEY, &users)?;
        Ok(true)
    }

    pub fn get_current_user_email(&self) -> Result<Option<String>> {
        self.get_item(CURRENT_USER_KEY)
    }

    pub fn set_current_user_email(&self, email: &str) -> Result<()> {
        self.set_item(CURRENT_USER_KEY, email)
    }

    pub fn clear_current_user(&self) -> Result<bool> {
        self.remove_item(CURRENT_USER_KEY)
    }

    // --- Food Log ---

    pub fn get_food_log(&self, email: &str) -> Result<Vec<FoodLogEntry>> {
        self.read_list(&user_key(Collection::FoodLogs, email))
    }

    /// Entries whose timestamp starts with `date` as `YYYY-MM-DD`.
    pub fn get_food_log_for_date(&self, email: &str, date: NaiveDate) -> Result<Vec<FoodLogEntry>> {
        Ok(self
            .get_food_log(email)?
            .into_iter()
            .filter(|e| e.is_on(date))
            .collect())
    }

    pub fn add_food_log_entry(
        &self,
        email: &str,
        entry: &NewFoodLogEntry,
        now: DateTime<Utc>,
    ) -> Result<FoodLogEntry> {
        let key = user_key(Collection::FoodLogs, email);
        let mut entries: Vec<FoodLogEntry> = self.read_list(&key)?;
        let new_entry = entry
            .clone()
            .into_entry(Uuid::new_v4().to_string(), format_timestamp(now));
        entries.push(new_entry.clone());
        self.write_list(&key, &entries)?;
        Ok(new_entry)
    }

    /// Remove an entry by id. Unknown ids are a no-op and return false.
    pub fn delete_food_log_entry(&self, email: &str, entry_id: &str) -> Result<bool> {
        let key = user_key(Collection::FoodLogs, email);
        let mut entries: Vec<FoodLogEntry> = self.read_list(&key)?;
        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_list(&key, &entries)?;
        Ok(true)
    }

    /// Entries for `today` and the `days - 1` days before it, keyed by date.
    ///
    /// Days without entries are present with an empty list.
    pub fn get_food_logs_for_past_days(
        &self,
        email: &str,
        days: u32,
        today: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Vec<FoodLogEntry>>> {
        let all = self.get_food_log(email)?;
        let mut by_date = BTreeMap::new();
        for i in 0..days {
            let date = today - chrono::Duration::days(i64::from(i));
            let entries: Vec<FoodLogEntry> =
                all.iter().filter(|e| e.is_on(date)).cloned().collect();
            by_date.insert(date, entries);
        }
        Ok(by_date)
    }

    // --- Weight History ---

    pub fn get_weight_history(&self, email: &str) -> Result<Vec<WeightEntry>> {
        let mut history: Vec<WeightEntry> =
            self.read_list(&user_key(Collection::WeightHistory, email))?;
        history.sort_by_key(|e| e.date);
        Ok(history)
    }

    /// Record `weight` for `today`, replacing any entry already on that date.
    pub fn add_weight_entry(
        &self,
        email: &str,
        weight: f64,
        today: NaiveDate,
    ) -> Result<WeightEntry> {
        let key = user_key(Collection::WeightHistory, email);
        let mut history: Vec<WeightEntry> = self.read_list(&key)?;
        let entry = WeightEntry {
            date: today,
            weight,
        };
        if let Some(existing) = history.iter_mut().find(|e| e.date == today) {
            *existing = entry.clone();
        } else {
            history.push(entry.clone());
        }
        history.sort_by_key(|e| e.date);
        self.write_list(&key, &history)?;
        Ok(entry)
    }

    // --- Recipes ---

    pub fn get_recipes(&self, email: &str) -> Result<Vec<Recipe>> {
        self.read_list(&user_key(Collection::Recipes, email))
    }

    /// Append a recipe under a fresh id. Totals are stored exactly as given.
    pub fn save_recipe(&self, email: &str, recipe: &NewRecipe) -> Result<Recipe> {
        let key = user_key(Collection::Recipes, email);
        let mut recipes: Vec<Recipe> = self.read_list(&key)?;
        let saved = recipe.clone().into_recipe(Uuid::new_v4().to_string());
        recipes.push(saved.clone());
        self.write_list(&key, &recipes)?;
        Ok(saved)
    }

    pub fn delete_recipe(&self, email: &str, recipe_id: &str) -> Result<bool> {
        let key = user_key(Collection::Recipes, email);
        let mut recipes: Vec<Recipe> = self.read_list(&key)?;
        let before = recipes.len();
        recipes.retain(|r| r.id != recipe_id);
        if recipes.len() == before {
            return Ok(false);
        }
        self.write_list(&key, &recipes)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Food, Gender, MealType, RecipeIngredient};
    use chrono::TimeZone;

    const EMAIL: &str = "sam@example.com";

    fn sample_user(email: &str) -> User {
        User {
            name: "Sam".to_string(),
            email: email.to_string(),
            age: 25,
            weight: 70.0,
            height: 175.0,
            gender: Gender::Male,
            activity_level: ActivityLevel::Light,
            daily_calorie_goal: 2371,
        }
    }

    fn sample_entry(name: &str, calories: f64) -> NewFoodLogEntry {
        NewFoodLogEntry {
            food_id: "1".to_string(),
            name: name.to_string(),
            meal_type: MealType::Breakfast,
            grams: 100.0,
            calories,
            protein: 1.0,
            carbs: 10.0,
            fat: 0.5,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_recipe() -> NewRecipe {
        let egg = Food {
            id: "7".to_string(),
            name: "Egg (large)".to_string(),
            calories: 155.0,
            protein: 13.0,
            carbs: 1.1,
            fat: 11.0,
            serving_size: 50.0,
        };
        NewRecipe::from_ingredients(
            "Omelette".to_string(),
            2,
            vec![RecipeIngredient {
                food: egg,
                grams: 150.0,
            }],
        )
    }

    #[test]
    fn test_item_set_get_remove() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_item("k").unwrap().is_none());

        db.set_item("k", "v1").unwrap();
        assert_eq!(db.get_item("k").unwrap().as_deref(), Some("v1"));

        db.set_item("k", "v2").unwrap();
        assert_eq!(db.get_item("k").unwrap().as_deref(), Some("v2"));

        assert!(db.remove_item("k").unwrap());
        assert!(db.get_item("k").unwrap().is_none());
        assert!(!db.remove_item("k").unwrap());
    }

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            user_key(Collection::FoodLogs, EMAIL),
            "calorie-tracker-foodLogs-sam@example.com"
        );
        assert_eq!(
            user_key(Collection::WeightHistory, EMAIL),
            "calorie-tracker-weightHistory-sam@example.com"
        );
        assert_eq!(
            user_key(Collection::Recipes, EMAIL),
            "calorie-tracker-recipes-sam@example.com"
        );
    }

    #[test]
    fn test_format_timestamp_matches_iso_string() {
        let ts = format_timestamp(at(2024, 6, 15, 9, 5));
        assert_eq!(ts, "2024-06-15T09:05:00.000Z");
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(&user_key(Collection::FoodLogs, EMAIL), "{not json")
            .unwrap();
        let err = db.get_food_log(EMAIL).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse stored value"));
    }

    #[test]
    fn test_insert_and_find_user() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&sample_user(EMAIL)).unwrap();

        let found = db.find_user(EMAIL).unwrap().unwrap();
        assert_eq!(found.name, "Sam");
        assert!(db.find_user("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_user() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&sample_user(EMAIL)).unwrap();
        let err = db.insert_user(&sample_user(EMAIL)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TrackerError>(),
            Some(&TrackerError::UserAlreadyExists(EMAIL.to_string()))
        );
        assert_eq!(db.get_users().unwrap().len(), 1);
    }

    #[test]
    fn test_update_user() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&sample_user(EMAIL)).unwrap();
        db.insert_user(&sample_user("other@example.com")).unwrap();

        let mut changed = sample_user(EMAIL);
        changed.weight = 72.5;
        assert!(db.update_user(&changed).unwrap());

        let users = db.get_users().unwrap();
        assert_eq!(users.len(), 2);
        assert!((users[0].weight - 72.5).abs() < f64::EPSILON);
        assert!((users[1].weight - 70.0).abs() < f64::EPSILON);

        assert!(!db.update_user(&sample_user("ghost@example.com")).unwrap());
    }

    #[test]
    fn test_current_user_pointer() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_current_user_email().unwrap().is_none());
        db.set_current_user_email(EMAIL).unwrap();
        assert_eq!(db.get_current_user_email().unwrap().as_deref(), Some(EMAIL));
        // The pointer is a bare string, not JSON.
        assert_eq!(db.get_item(CURRENT_USER_KEY).unwrap().as_deref(), Some(EMAIL));
        assert!(db.clear_current_user().unwrap());
        assert!(db.get_current_user_email().unwrap().is_none());
    }

    #[test]
    fn test_add_food_log_entry_assigns_id_and_timestamp() {
        let db = Database::open_in_memory().unwrap();
        let now = at(2024, 6, 15, 12, 30);
        let a = db
            .add_food_log_entry(EMAIL, &sample_entry("Apple", 94.6), now)
            .unwrap();
        let b = db
            .add_food_log_entry(EMAIL, &sample_entry("Apple", 94.6), now)
            .unwrap();

        assert_eq!(a.timestamp, "2024-06-15T12:30:00.000Z");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        // No dedup.
        assert_eq!(db.get_food_log(EMAIL).unwrap().len(), 2);
    }

    #[test]
    fn test_get_food_log_for_date() {
        let db = Database::open_in_memory().unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Oats", 311.0), at(2024, 6, 14, 8, 0))
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Apple", 94.6), at(2024, 6, 15, 8, 0))
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Salmon", 206.0), at(2024, 6, 15, 19, 0))
            .unwrap();

        let day = db.get_food_log_for_date(EMAIL, date(2024, 6, 15)).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].name, "Apple");
        assert_eq!(day[1].name, "Salmon");
        assert!(db
            .get_food_log_for_date(EMAIL, date(2024, 6, 16))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_food_log_day_boundary_is_utc() {
        let db = Database::open_in_memory().unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Midnight", 1.0), at(2024, 6, 15, 0, 0))
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Late", 2.0), at(2024, 6, 14, 23, 59))
            .unwrap();

        let day = db.get_food_log_for_date(EMAIL, date(2024, 6, 15)).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].name, "Midnight");
        let prev = db.get_food_log_for_date(EMAIL, date(2024, 6, 14)).unwrap();
        assert_eq!(prev.len(), 1);
        assert_eq!(prev[0].name, "Late");
    }

    #[test]
    fn test_food_logs_are_partitioned_by_user() {
        let db = Database::open_in_memory().unwrap();
        let now = at(2024, 6, 15, 12, 0);
        db.add_food_log_entry(EMAIL, &sample_entry("Mine", 1.0), now)
            .unwrap();
        db.add_food_log_entry("other@example.com", &sample_entry("Theirs", 2.0), now)
            .unwrap();

        let mine = db.get_food_log(EMAIL).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Mine");
    }

    #[test]
    fn test_delete_food_log_entry() {
        let db = Database::open_in_memory().unwrap();
        let now = at(2024, 6, 15, 12, 0);
        let a = db
            .add_food_log_entry(EMAIL, &sample_entry("A", 1.0), now)
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("B", 2.0), now)
            .unwrap();

        assert!(db.delete_food_log_entry(EMAIL, &a.id).unwrap());
        let remaining = db.get_food_log(EMAIL).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "B");

        // Second delete of the same id is a no-op.
        assert!(!db.delete_food_log_entry(EMAIL, &a.id).unwrap());
        assert_eq!(db.get_food_log(EMAIL).unwrap(), remaining);
    }

    #[test]
    fn test_delete_unknown_food_log_entry_is_noop() {
        let db = Database::open_in_memory().unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("A", 1.0), at(2024, 6, 15, 12, 0))
            .unwrap();
        let before = db.get_food_log(EMAIL).unwrap();

        assert!(!db.delete_food_log_entry(EMAIL, "does-not-exist").unwrap());
        assert_eq!(db.get_food_log(EMAIL).unwrap(), before);

        // Deleting from a user with no log at all does not create the key.
        assert!(!db
            .delete_food_log_entry("new@example.com", "x")
            .unwrap());
        assert!(db
            .get_item(&user_key(Collection::FoodLogs, "new@example.com"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_food_logs_for_past_days() {
        let db = Database::open_in_memory().unwrap();
        let today = date(2024, 6, 15);
        db.add_food_log_entry(EMAIL, &sample_entry("Today", 100.0), at(2024, 6, 15, 9, 0))
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Three ago", 200.0), at(2024, 6, 12, 9, 0))
            .unwrap();
        db.add_food_log_entry(EMAIL, &sample_entry("Too old", 300.0), at(2024, 6, 8, 9, 0))
            .unwrap();

        let by_date = db.get_food_logs_for_past_days(EMAIL, 7, today).unwrap();
        assert_eq!(by_date.len(), 7);
        assert_eq!(by_date.keys().next(), Some(&date(2024, 6, 9)));
        assert_eq!(by_date.keys().last(), Some(&today));

        for (d, entries) in &by_date {
            assert_eq!(entries, &db.get_food_log_for_date(EMAIL, *d).unwrap());
        }
        assert_eq!(by_date[&today].len(), 1);
        assert_eq!(by_date[&date(2024, 6, 12)][0].name, "Three ago");
        assert!(by_date[&date(2024, 6, 13)].is_empty());
    }

    #[test]
    fn test_food_logs_for_zero_days() {
        let db = Database::open_in_memory().unwrap();
        let by_date = db
            .get_food_logs_for_past_days(EMAIL, 0, date(2024, 6, 15))
            .unwrap();
        assert!(by_date.is_empty());
    }

    #[test]
    fn test_add_weight_entry_new_dates_sorted() {
        let db = Database::open_in_memory().unwrap();
        db.add_weight_entry(EMAIL, 80.0, date(2024, 6, 15)).unwrap();
        db.add_weight_entry(EMAIL, 81.0, date(2024, 6, 13)).unwrap();
        assert_eq!(db.get_weight_history(EMAIL).unwrap().len(), 2);

        db.add_weight_entry(EMAIL, 80.5, date(2024, 6, 14)).unwrap();
        let history = db.get_weight_history(EMAIL).unwrap();
        assert_eq!(history.len(), 3);
        let dates: Vec<NaiveDate> = history.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 6, 13), date(2024, 6, 14), date(2024, 6, 15)]
        );
    }

    #[test]
    fn test_add_weight_entry_same_day_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.add_weight_entry(EMAIL, 80.0, date(2024, 6, 14)).unwrap();
        db.add_weight_entry(EMAIL, 80.4, date(2024, 6, 15)).unwrap();
        db.add_weight_entry(EMAIL, 79.9, date(2024, 6, 15)).unwrap();

        let history = db.get_weight_history(EMAIL).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].date, date(2024, 6, 15));
        assert!((history[1].weight - 79.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_history_stored_as_date_strings() {
        let db = Database::open_in_memory().unwrap();
        db.add_weight_entry(EMAIL, 80.0, date(2024, 6, 15)).unwrap();
        let raw = db
            .get_item(&user_key(Collection::WeightHistory, EMAIL))
            .unwrap()
            .unwrap();
        assert_eq!(raw, r#"[{"date":"2024-06-15","weight":80.0}]"#);
    }

    #[test]
    fn test_save_and_list_recipe() {
        let db = Database::open_in_memory().unwrap();
        let new_recipe = sample_recipe();
        let saved = db.save_recipe(EMAIL, &new_recipe).unwrap();

        let recipes = db.get_recipes(EMAIL).unwrap();
        assert_eq!(recipes.len(), 1);
        let listed = &recipes[0];
        assert!(!listed.id.is_empty());
        assert_eq!(listed.id, saved.id);
        assert_eq!(listed, &new_recipe.into_recipe(saved.id.clone()));
    }

    #[test]
    fn test_save_recipe_keeps_totals_as_given() {
        let db = Database::open_in_memory().unwrap();
        let mut recipe = sample_recipe();
        recipe.total_calories = 1.0;
        let saved = db.save_recipe(EMAIL, &recipe).unwrap();
        assert!((saved.total_calories - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_recipe() {
        let db = Database::open_in_memory().unwrap();
        let a = db.save_recipe(EMAIL, &sample_recipe()).unwrap();
        let b = db.save_recipe(EMAIL, &sample_recipe()).unwrap();
        assert_ne!(a.id, b.id);

        assert!(db.delete_recipe(EMAIL, &a.id).unwrap());
        assert!(!db.delete_recipe(EMAIL, &a.id).unwrap());
        assert!(!db.delete_recipe(EMAIL, "missing").unwrap());

        let recipes = db.get_recipes(EMAIL).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, b.id);
    }

    #[test]
    fn test_writes_only_touched_partitions() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&sample_user(EMAIL)).unwrap();
        db.add_weight_entry(EMAIL, 80.0, date(2024, 6, 15)).unwrap();
        db.save_recipe(EMAIL, &sample_recipe()).unwrap();

        for key in [
            "calorie-tracker-recipes-sam@example.com",
            "calorie-tracker-users",
            "calorie-tracker-weightHistory-sam@example.com",
        ] {
            assert!(db.get_item(key).unwrap().is_some(), "missing {key}");
        }
        assert!(
            db.get_item("calorie-tracker-foodLogs-sam@example.com")
                .unwrap()
                .is_none()
        );
    }
}
