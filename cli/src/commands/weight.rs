use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

use super::helpers::no_neg_zero;

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

fn to_kg(value: f64, unit: &str) -> Result<f64> {
    if !(value.is_finite() && value > 0.0) {
        bail!("Weight must be greater than 0");
    }
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => Ok(no_neg_zero(value * KG_PER_LB)),
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

pub(crate) fn cmd_weight_log(
    svc: &TrackerService,
    session: &Session,
    value: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let user = session.require_user()?;
    let weight_kg = to_kg(value, unit)?;
    if !json && weight_kg.to_bits() != value.to_bits() {
        eprintln!("Converting {value:.1} lbs to {weight_kg:.2} kg");
    }

    let entry = svc.log_weight(&user.email, weight_kg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged {:.1} kg ({:.1} lbs) for {}",
            entry.weight,
            entry.weight * LBS_PER_KG,
            entry.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_history(svc: &TrackerService, session: &Session, json: bool) -> Result<()> {
    let user = session.require_user()?;
    let entries = svc.get_weight_history(&user.email)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No weight entries found. Use `caltrack weight log` to record your weight.");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight (kg)")]
        kg: String,
        #[tabled(rename = "Weight (lbs)")]
        lbs: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    let rows: Vec<WeightRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| WeightRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            kg: format!("{:.1}", e.weight),
            lbs: format!("{:.1}", e.weight * LBS_PER_KG),
            change: if i == 0 {
                String::new()
            } else {
                format!("{:+.1}", no_neg_zero(e.weight - entries[i - 1].weight))
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
