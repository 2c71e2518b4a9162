//! Current-weather lookups for saved cities.
//!
//! Fetches condition and temperature per city from an OpenWeatherMap-compatible
//! API and maps condition codes to local icon keys.

pub mod icons;
pub mod provider;
pub mod types;

pub use icons::{map_icon, IconKey};
pub use provider::{OpenWeatherProvider, WeatherSource};
pub use types::*;
