use anyhow::{Context, Result};
use std::path::Path;
use std::process;

use crate::config::Config;
use crate::gemini::{GeminiClient, mime_type_for};
use caltrack_core::catalog::{BuiltinCatalog, DEFAULT_SEARCH_LIMIT};
use caltrack_core::models::{Food, MealType};
use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

use super::helpers::{choose_food, choose_food_for, json_error, parse_serving, print_food_table};
use super::log_and_report;

pub(crate) fn cmd_search(svc: &TrackerService, query: &str, json: bool) -> Result<()> {
    let foods = svc.search_foods(&BuiltinCatalog, query, DEFAULT_SEARCH_LIMIT)?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No results found for '{query}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        let refs: Vec<&Food> = foods.iter().collect();
        print_food_table(&refs);
    }

    Ok(())
}

pub(crate) fn cmd_log(
    svc: &TrackerService,
    session: &Session,
    food_query: &str,
    serving: Option<&str>,
    meal: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let meal_type: MealType = meal.parse()?;
    let grams = serving.map(parse_serving).transpose()?;

    let foods = svc.search_foods(&BuiltinCatalog, food_query, DEFAULT_SEARCH_LIMIT)?;
    if foods.is_empty() {
        let message = format!("No food found for '{food_query}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }
    let food = choose_food_for(food_query, foods)?;

    log_and_report(svc, user, &food, grams, meal_type, json)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_manual(
    svc: &TrackerService,
    session: &Session,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving: Option<&str>,
    meal: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let meal_type: MealType = meal.parse()?;
    let grams = serving.map(parse_serving).transpose()?;
    let food = svc.manual_food(name, calories, protein, carbs, fat)?;

    log_and_report(svc, user, &food, grams, meal_type, json)
}

pub(crate) fn cmd_barcode(
    svc: &TrackerService,
    session: &Session,
    code: &str,
    serving: Option<&str>,
    meal: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let meal_type: MealType = meal.parse()?;
    let grams = serving.map(parse_serving).transpose()?;

    let Some(food) = svc.barcode_lookup(&BuiltinCatalog, code)? else {
        let message = format!("Barcode '{}' not found in our database", code.trim());
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    log_and_report(svc, user, &food, grams, meal_type, json)
}

/// Detect foods in a photo, pick one and log its estimated serving.
pub(crate) fn cmd_photo(
    svc: &TrackerService,
    session: &Session,
    image_path: &Path,
    serving: Option<&str>,
    meal: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let meal_type: MealType = meal.parse()?;
    let grams = serving.map(parse_serving).transpose()?;
    let mime_type = mime_type_for(image_path)?;
    let image = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image: {}", image_path.display()))?;

    let client = GeminiClient::new(Config::gemini_api_key()?, Config::gemini_model())?;
    if !json {
        eprintln!("Analyzing {}...", image_path.display());
    }
    let foods = tokio::task::block_in_place(|| svc.analyze_food_image(&client, &image, mime_type))?;

    let food = choose_food(foods)?;
    log_and_report(svc, user, &food, grams, meal_type, json)
}

pub(crate) fn cmd_delete(
    svc: &TrackerService,
    session: &Session,
    entry_id: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;

    if svc.delete_food_log_entry(&user.email, entry_id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": entry_id }));
        } else {
            println!("Deleted entry {entry_id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Entry {entry_id} not found")));
        } else {
            eprintln!("Entry {entry_id} not found");
        }
        process::exit(2);
    }
}
