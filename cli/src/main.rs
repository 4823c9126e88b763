mod commands;
mod config;
mod gemini;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    ProfileChanges, cmd_barcode, cmd_delete, cmd_history, cmd_log, cmd_login, cmd_logout,
    cmd_manual, cmd_photo, cmd_profile_show, cmd_profile_update, cmd_recipe_create,
    cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show, cmd_search, cmd_signup, cmd_summary,
    cmd_weight_history, cmd_weight_log,
};
use crate::config::Config;
use caltrack_core::service::TrackerService;
use caltrack_core::session::Session;

#[derive(Parser)]
#[command(
    name = "caltrack",
    version,
    about = "A simple, local-first calorie tracker",
    long_about = "caltrack keeps a food diary, weight history and recipes per user.\n\
                  Daily calorie goals come from the revised Harris-Benedict equation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Gender: male or female
        #[arg(long)]
        gender: String,
        /// Activity level: sedentary, light, moderate, active, very
        #[arg(long, default_value = "moderate")]
        activity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log in as an existing user
    Login {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log out the current user
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or update the current user's profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Search the food catalog
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food entry by searching for it
    Log {
        /// Food name to search for
        food: String,
        /// Serving size in grams (e.g. "200" or "200g", default: the food's serving)
        serving: Option<String>,
        /// Meal type: breakfast, lunch, dinner, snacks
        #[arg(short, long, default_value = "lunch")]
        meal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food with nutrition values per 100g
    Manual {
        /// Food name
        name: String,
        /// Calories per 100g
        #[arg(long)]
        calories: f64,
        /// Protein per 100g
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbs per 100g
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat per 100g
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Serving size in grams (default: 100g)
        serving: Option<String>,
        /// Meal type: breakfast, lunch, dinner, snacks
        #[arg(short, long, default_value = "lunch")]
        meal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a food by barcode and log it
    Barcode {
        /// Barcode number
        code: String,
        /// Serving size in grams (default: the food's serving)
        serving: Option<String>,
        /// Meal type: breakfast, lunch, dinner, snacks
        #[arg(short, long, default_value = "lunch")]
        meal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect foods in a photo and log one (needs GEMINI_API_KEY)
    Photo {
        /// Path to a JPEG, PNG, WebP or HEIC image
        image: PathBuf,
        /// Serving size in grams (default: the estimated serving)
        serving: Option<String>,
        /// Meal type: breakfast, lunch, dinner, snacks
        #[arg(short, long, default_value = "lunch")]
        meal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily summary (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD, today or yesterday)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calories and macros for the last N days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food log entry by ID
    Delete {
        /// Entry ID to delete
        entry_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the current profile and goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields and recompute the daily goal
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log today's weight (replaces an entry already logged today)
    Log {
        /// Weight value (number)
        value: f64,
        /// Unit: kg or lbs
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight history, oldest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Create a recipe from catalog foods
    Create {
        /// Recipe name
        name: String,
        /// Number of servings this recipe makes
        #[arg(short, long, default_value = "1")]
        servings: u32,
        /// Ingredient as "<food>=<grams>", repeatable
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recipe details (ingredients + per-serving nutrition)
    Show {
        /// Recipe name or ID
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe by ID
    Delete {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db_path = config
        .db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let svc = TrackerService::new(db_path)?;
    let mut session = Session::restore(&svc);

    match cli.command {
        Commands::Signup {
            name,
            email,
            age,
            weight,
            height,
            gender,
            activity,
            json,
        } => cmd_signup(
            &svc,
            &mut session,
            &name,
            &email,
            age,
            weight,
            height,
            &gender,
            &activity,
            json,
        ),
        Commands::Login { email, json } => cmd_login(&svc, &mut session, &email, json),
        Commands::Logout { json } => cmd_logout(&svc, &mut session, json),
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&session, json),
            ProfileCommands::Update {
                name,
                age,
                weight,
                height,
                gender,
                activity,
                json,
            } => {
                let changes = ProfileChanges {
                    name,
                    age,
                    weight,
                    height,
                    gender,
                    activity,
                };
                cmd_profile_update(&svc, &mut session, changes, json)
            }
        },
        Commands::Search { query, json } => cmd_search(&svc, &query, json),
        Commands::Log {
            food,
            serving,
            meal,
            json,
        } => cmd_log(&svc, &session, &food, serving.as_deref(), &meal, json),
        Commands::Manual {
            name,
            calories,
            protein,
            carbs,
            fat,
            serving,
            meal,
            json,
        } => cmd_manual(
            &svc,
            &session,
            &name,
            calories,
            protein,
            carbs,
            fat,
            serving.as_deref(),
            &meal,
            json,
        ),
        Commands::Barcode {
            code,
            serving,
            meal,
            json,
        } => cmd_barcode(&svc, &session, &code, serving.as_deref(), &meal, json),
        Commands::Photo {
            image,
            serving,
            meal,
            json,
        } => cmd_photo(&svc, &session, &image, serving.as_deref(), &meal, json),
        Commands::Summary { date, json } => cmd_summary(&svc, &session, date, json),
        Commands::History { days, json } => cmd_history(&svc, &session, days, json),
        Commands::Delete { entry_id, json } => cmd_delete(&svc, &session, &entry_id, json),
        Commands::Weight { command } => match command {
            WeightCommands::Log { value, unit, json } => {
                cmd_weight_log(&svc, &session, value, &unit, json)
            }
            WeightCommands::History { json } => cmd_weight_history(&svc, &session, json),
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Create {
                name,
                servings,
                ingredients,
                json,
            } => cmd_recipe_create(&svc, &session, &name, servings, &ingredients, json),
            RecipeCommands::List { json } => cmd_recipe_list(&svc, &session, json),
            RecipeCommands::Show { recipe, json } => {
                cmd_recipe_show(&svc, &session, &recipe, json)
            }
            RecipeCommands::Delete { id, json } => cmd_recipe_delete(&svc, &session, &id, json),
        },
    }
}
