use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caltrack_core::catalog::{BuiltinCatalog, DEFAULT_SEARCH_LIMIT};
use caltrack_core::models::{Recipe, RecipeIngredient};
use caltrack_core::nutrition;
use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

use super::helpers::{choose_food_for, json_error, parse_ingredient, truncate};

fn resolve_ingredients(svc: &TrackerService, args: &[String]) -> Result<Vec<RecipeIngredient>> {
    let mut ingredients = Vec::with_capacity(args.len());
    for arg in args {
        let (query, grams) = parse_ingredient(arg)?;
        let foods = svc.search_foods(&BuiltinCatalog, &query, DEFAULT_SEARCH_LIMIT)?;
        if foods.is_empty() {
            bail!("No food found for ingredient '{query}'");
        }
        let food = choose_food_for(&query, foods)?;
        ingredients.push(RecipeIngredient { food, grams });
    }
    Ok(ingredients)
}

fn print_recipe(recipe: &Recipe) {
    println!("=== {} ===", recipe.name);
    println!("  Servings: {}  |  ID: {}\n", recipe.servings, recipe.id);

    println!("  INGREDIENTS:");
    for ing in &recipe.ingredients {
        let m = nutrition::scale(&ing.food, ing.grams);
        println!(
            "    {} {:.0}g, {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
            ing.food.name, ing.grams, m.calories, m.protein, m.carbs, m.fat
        );
    }

    let t = recipe.totals();
    println!("\n  TOTAL:");
    println!(
        "    {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        t.calories, t.protein, t.carbs, t.fat
    );

    if let Some(per) = recipe.per_serving() {
        println!("\n  PER SERVING:");
        println!(
            "    {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
            per.calories, per.protein, per.carbs, per.fat
        );
    }
}

pub(crate) fn cmd_recipe_create(
    svc: &TrackerService,
    session: &Session,
    name: &str,
    servings: u32,
    ingredient_args: &[String],
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let ingredients = resolve_ingredients(svc, ingredient_args)?;
    let recipe = svc.create_recipe(&user.email, name, servings, ingredients)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        println!("Saved recipe '{}'\n", recipe.name);
        print_recipe(&recipe);
    }

    Ok(())
}

pub(crate) fn cmd_recipe_list(svc: &TrackerService, session: &Session, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Servings")]
        servings: u32,
        #[tabled(rename = "Total kcal")]
        total: String,
        #[tabled(rename = "kcal/serving")]
        per_serving: String,
    }

    let user = session.require_user()?;
    let recipes = svc.get_recipes(&user.email)?;
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.clone(),
            name: truncate(&r.name, 30),
            servings: r.servings,
            total: format!("{:.0}", r.total_calories),
            per_serving: r
                .per_serving()
                .map_or_else(|| "-".to_string(), |m| format!("{:.0}", m.calories)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_recipe_show(
    svc: &TrackerService,
    session: &Session,
    name_or_id: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let Some(recipe) = svc.find_recipe(&user.email, name_or_id)? else {
        let message = format!("Recipe '{name_or_id}' not found");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        print_recipe(&recipe);
    }

    Ok(())
}

pub(crate) fn cmd_recipe_delete(
    svc: &TrackerService,
    session: &Session,
    recipe_id: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;

    if svc.delete_recipe(&user.email, recipe_id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": recipe_id }));
        } else {
            println!("Deleted recipe {recipe_id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Recipe {recipe_id} not found")));
        } else {
            eprintln!("Recipe {recipe_id} not found");
        }
        process::exit(2);
    }
}
