pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "greenpath",
    about = "Greenpath operator CLI",
    long_about = "Generate sustainability recommendations, compute footprints, price incentives, \
                  run migrations and inspect configuration.",
    after_help = "Examples:
  greenpath recommend --profile profile.json
  greenpath footprint --profile profile.toml
  greenpath incentives --category HVAC --cost 20000 --location California
  greenpath migrate"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Generate prioritized recommendations for a business profile")]
    Recommend {
        #[arg(long, help = "Path to a JSON or TOML business profile")]
        profile: PathBuf,
        #[arg(long, default_value = "cli", help = "User the recommendations are generated for")]
        user: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Compute the carbon footprint and energy costs for a business profile")]
    Footprint {
        #[arg(long, help = "Path to a JSON or TOML business profile")]
        profile: PathBuf,
        #[arg(long, help = "Facility floor area in square feet; adds a rooftop solar estimate")]
        facility_sqft: Option<f64>,
    },
    #[command(about = "List tax credits, rebates and loans a project qualifies for")]
    Incentives {
        #[arg(long, help = "Project category, e.g. \"HVAC\" or \"Renewable Energy\"")]
        category: String,
        #[arg(long, help = "Implementation cost in US dollars")]
        cost: f64,
        #[arg(long, default_value = "", help = "Business location; selects state programs")]
        location: String,
        #[arg(long, help = "Evaluate program expiry on this date (YYYY-MM-DD); defaults to today")]
        as_of: Option<NaiveDate>,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { profile, user, json } => {
            commands::recommend::run(&profile, &user, json)
        }
        Command::Footprint { profile, facility_sqft } => {
            commands::footprint::run(&profile, facility_sqft)
        }
        Command::Incentives { category, cost, location, as_of } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            commands::incentives::run(&category, cost, &location, as_of)
        }
        Command::Migrate => commands::migrate::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
