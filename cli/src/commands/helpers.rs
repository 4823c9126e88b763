use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caltrack_core::models::Food;

pub(crate) fn parse_serving(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed.parse().with_context(|| {
        format!("Invalid serving size: '{s}'. Use a number like '200' or '200g'")
    })?;
    if !(value.is_finite() && value > 0.0) {
        bail!("Serving size must be greater than 0");
    }
    Ok(value)
}

/// Split a recipe ingredient argument `"<food>=<grams>"`.
pub(crate) fn parse_ingredient(s: &str) -> Result<(String, f64)> {
    let Some((food, grams)) = s.rsplit_once('=') else {
        bail!("Invalid ingredient '{s}'. Use '<food>=<grams>', e.g. 'oats=80'");
    };
    let food = food.trim();
    if food.is_empty() {
        bail!("Invalid ingredient '{s}'. Food name is empty");
    }
    Ok((food.to_string(), parse_serving(grams)?))
}

/// Stored days are UTC calendar days, so "today" is the UTC date.
pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    let today = Utc::now().date_naive();
    match date_str {
        None => Ok(today),
        Some(s) => match s.as_str() {
            "today" => Ok(today),
            "yesterday" => Ok(today - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD, today or yesterday")
            }),
        },
    }
}

pub(crate) fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("\nSelect a food (1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let n: usize = line.trim().parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

/// Pick the food named exactly `query`, otherwise ask when there is more than one.
pub(crate) fn choose_food_for(query: &str, foods: Vec<Food>) -> Result<Food> {
    let query = query.trim();
    if let Some(idx) = foods.iter().position(|f| f.name.eq_ignore_ascii_case(query)) {
        let mut foods = foods;
        return Ok(foods.swap_remove(idx));
    }
    choose_food(foods)
}

/// Show `foods` and, if there is more than one, ask which to use.
pub(crate) fn choose_food(mut foods: Vec<Food>) -> Result<Food> {
    if foods.len() > 1 {
        let refs: Vec<&Food> = foods.iter().collect();
        print_food_table(&refs);
        let idx = prompt_choice(foods.len())?;
        return Ok(foods.swap_remove(idx));
    }
    foods.pop().context("No food to choose from")
}

pub(crate) fn print_food_table(foods: &[&Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "Serving")]
        serving: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .enumerate()
        .map(|(i, f)| FoodRow {
            idx: i + 1,
            id: truncate(&f.id, 20),
            name: truncate(&f.name, 35),
            calories: format!("{:.0}", f.calories),
            protein: format!("{:.1}", f.protein),
            carbs: format!("{:.1}", f.carbs),
            fat: format!("{:.1}", f.fat),
            serving: format!("{:.0}g", f.serving_size),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
