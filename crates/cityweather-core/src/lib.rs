pub mod config;
pub mod error;
pub mod screen_phase;

pub use config::{Config, StorageConfig, Units, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, DatabaseError, RusqliteErrorExt};
pub use screen_phase::ScreenPhase;

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("CityWeather core initialized");
    Ok(())
}
