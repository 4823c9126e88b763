mod account;
mod helpers;
mod log;
mod recipe;
mod summary;
mod weight;

use anyhow::Result;

use caltrack_core::models::{Food, MealType, User};
use caltrack_core::service::TrackerService;

pub(crate) use account::{
    ProfileChanges, cmd_login, cmd_logout, cmd_profile_show, cmd_profile_update, cmd_signup,
};
pub(crate) use log::{cmd_barcode, cmd_delete, cmd_log, cmd_manual, cmd_photo, cmd_search};
pub(crate) use recipe::{cmd_recipe_create, cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show};
pub(crate) use summary::{cmd_history, cmd_summary};
pub(crate) use weight::{cmd_weight_history, cmd_weight_log};

/// Log `food` for the user and print the new entry.
///
/// `grams` defaults to the food's serving size.
pub(super) fn log_and_report(
    svc: &TrackerService,
    user: &User,
    food: &Food,
    grams: Option<f64>,
    meal_type: MealType,
    json: bool,
) -> Result<()> {
    let grams = grams.unwrap_or(food.serving_size);
    let entry = svc.log_food(&user.email, food, meal_type, grams)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &entry.name;
        let cal = entry.calories;
        println!("Logged: {name} {grams:.0}g for {meal_type}, {cal:.0} kcal");
        println!(
            "  P:{:.1}g C:{:.1}g F:{:.1}g  [{}]",
            entry.protein, entry.carbs, entry.fat, entry.id
        );
    }

    Ok(())
}
