use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cityweather_core::{AppError, Config, ConfigError, Units};
use cityweather_services::{
    shared, AddOutcome, CityRecord, CityScreen, CityStore, CitySynchronizer, CityView, Confirmer,
    DeleteOutcome, Notifier, ScreenState,
};
use cityweather_weather::{CityId, OpenWeatherProvider};

#[derive(Parser)]
#[command(name = "cityweather")]
#[command(about = "Saved cities with current weather", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show saved cities with current weather
    List {
        #[arg(long)]
        json: bool,
    },
    /// Save a city by OpenWeatherMap id
    Add {
        id: u64,
        name: String,
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Remove a saved city
    Delete {
        id: u64,
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove every saved city
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
}

/// Asks on stdin unless `--yes` was given.
struct PromptConfirmer {
    assume_yes: bool,
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        // Reading stdin blocks; hand the worker back to the runtime meanwhile.
        tokio::task::block_in_place(|| prompt(title, message))
    }
}

fn prompt(title: &str, message: &str) -> bool {
    eprint!("{}: {} [y/N] ", title, message);
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("Notification: {}", message);
        eprintln!("{}", message);
    }
}

type Screen = CityScreen<PromptConfirmer, StderrNotifier>;

fn build_screen(config: &Config, assume_yes: bool) -> Result<Screen, AppError> {
    let data_dir = config.storage.effective_data_dir();
    std::fs::create_dir_all(data_dir)?;

    let store = CityStore::open(&config.storage.database_path())?;
    let provider =
        OpenWeatherProvider::new(&config.weather).map_err(|e| AppError::Service(e.to_string()))?;

    let sync = CitySynchronizer::new(shared(store), Arc::new(provider));
    Ok(CityScreen::new(sync, PromptConfirmer { assume_yes }, StderrNotifier))
}

fn print_cities(cities: &[CityView], units: Units) {
    if cities.is_empty() {
        println!("No saved cities");
        return;
    }

    for view in cities {
        let place = match &view.city.country {
            Some(country) => format!("{}, {}", view.city.name, country),
            None => view.city.name.clone(),
        };
        match &view.weather {
            Some(w) => println!(
                "{:>10}  {} {:<30} {:>7.1}{}",
                view.id(),
                w.icon.glyph(),
                place,
                w.temperature,
                units.symbol()
            ),
            None => println!("{:>10}  {} {:<30} {:>8}", view.id(), " ", place, "--"),
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let (config, _) = Config::load_validated(cli.config.as_deref())
        .map_err(|e| ConfigError::Invalid(format!("{:#}", e)))?;
    let units = config.weather.units;

    match cli.command {
        Commands::List { json } => {
            let screen = build_screen(&config, false)?;
            let state = screen.on_focus(ScreenState::new()).await;
            if json {
                let out =
                    serde_json::to_string_pretty(&state.cities).map_err(anyhow::Error::from)?;
                println!("{}", out);
            } else {
                print_cities(&state.cities, units);
            }
        }
        Commands::Add { id, name, country } => {
            let screen = build_screen(&config, false)?;
            let mut city = CityRecord::new(CityId(id), name);
            if let Some(country) = country {
                city = city.with_country(country);
            }
            let (state, outcome) = screen.add_city(ScreenState::new(), city).await;
            if let AddOutcome::Failed(_) = outcome {
                return Ok(ExitCode::FAILURE);
            }
            print_cities(&state.cities, units);
        }
        Commands::Delete { id, yes } => {
            let screen = build_screen(&config, yes)?;
            let (state, outcome) = screen.delete_city(ScreenState::new(), CityId(id)).await;
            match outcome {
                DeleteOutcome::Deleted => print_cities(&state.cities, units),
                DeleteOutcome::Failed(_) => return Ok(ExitCode::FAILURE),
                DeleteOutcome::Cancelled
                | DeleteOutcome::NothingToDelete
                | DeleteOutcome::Busy => {}
            }
        }
        Commands::Clear { yes } => {
            let screen = build_screen(&config, yes)?;
            let (_, outcome) = screen.clear_cities(ScreenState::new()).await;
            if let DeleteOutcome::Failed(_) = outcome {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cityweather_core::init()?;

    match run(cli).await {
        Ok(code) => Ok(code),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
