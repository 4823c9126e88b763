use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caltrack_core::models::{DailySummary, ProgressDay};
use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

use super::helpers::{no_neg_zero, parse_date};

const BAR_WIDTH: usize = 30;

fn progress_bar(pct: f64) -> String {
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn any_logged(progress: &[ProgressDay]) -> bool {
    progress.iter().any(|d| d.entry_count > 0)
}

fn print_summary(summary: &DailySummary) {
    let date = &summary.date;
    println!("=== {date} ===\n");

    for meal in &summary.meals {
        let meal_label = meal.meal_type.as_str().to_uppercase();
        let sub_cal = no_neg_zero(meal.subtotal.calories);
        println!("  {meal_label} ({sub_cal:.0} kcal)");
        if meal.entries.is_empty() {
            println!("    No items logged yet.");
        }
        for e in &meal.entries {
            println!(
                "    [{}] {} {:.0}g, {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
                e.id, e.name, e.grams, e.calories, e.protein, e.carbs, e.fat
            );
        }
        println!();
    }

    let t = &summary.totals;
    println!(
        "  TOTAL: {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        no_neg_zero(t.calories),
        no_neg_zero(t.protein),
        no_neg_zero(t.carbs),
        no_neg_zero(t.fat)
    );
    println!("  GOAL: {} kcal", summary.goal);
    let remaining = summary.remaining_calories;
    if remaining < 0.0 {
        println!("  OVER BY: {:.0} kcal", -remaining);
    } else {
        println!("  REMAINING: {:.0} kcal", no_neg_zero(remaining));
    }
    println!(
        "  {} {:.0}%",
        progress_bar(summary.progress_pct),
        summary.progress_pct
    );

    let macro_total = t.macro_grams();
    if macro_total > 0.0 {
        println!(
            "  MACROS: protein {:.0}% | carbs {:.0}% | fat {:.0}%",
            t.protein / macro_total * 100.0,
            t.carbs / macro_total * 100.0,
            t.fat / macro_total * 100.0
        );
    }
}

pub(crate) fn cmd_summary(
    svc: &TrackerService,
    session: &Session,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let date = parse_date(date)?;
    let summary = svc.get_daily_summary(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

pub(crate) fn cmd_history(
    svc: &TrackerService,
    session: &Session,
    days: u32,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Goal")]
        goal: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let user = session.require_user()?;
    let progress: Vec<ProgressDay> = svc.get_progress(user, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    if !any_logged(&progress) {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = progress
        .iter()
        .map(|d| HistoryRow {
            date: d.date.format("%a %b %d").to_string(),
            calories: d.calories.to_string(),
            goal: d.goal.to_string(),
            protein: format!("{:.0}g", no_neg_zero(d.protein)),
            carbs: format!("{:.0}g", no_neg_zero(d.carbs)),
            fat: format!("{:.0}g", no_neg_zero(d.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
