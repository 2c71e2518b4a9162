use serde::{Deserialize, Serialize};

/// Local icon assets keyed by OpenWeatherMap condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconKey {
    ClearDay,
    ClearNight,
    FewCloudsDay,
    FewCloudsNight,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    RainDay,
    RainNight,
    Thunderstorm,
    Snow,
    Mist,
    /// Code the table doesn't know about
    #[default]
    Unknown,
}

impl IconKey {
    /// Convert an OpenWeatherMap icon code (`weather[0].icon`) to an IconKey
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_owm_code(code: &str) -> Self {
        match code.trim() {
            "01d" => Self::ClearDay,
            "01n" => Self::ClearNight,
            "02d" => Self::FewCloudsDay,
            "02n" => Self::FewCloudsNight,
            "03d" | "03n" => Self::ScatteredClouds,
            "04d" | "04n" => Self::BrokenClouds,
            "09d" | "09n" => Self::ShowerRain,
            "10d" => Self::RainDay,
            "10n" => Self::RainNight,
            "11d" | "11n" => Self::Thunderstorm,
            "13d" | "13n" => Self::Snow,
            "50d" | "50n" => Self::Mist,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearDay | Self::ClearNight => "Clear sky",
            Self::FewCloudsDay | Self::FewCloudsNight => "Few clouds",
            Self::ScatteredClouds => "Scattered clouds",
            Self::BrokenClouds => "Broken clouds",
            Self::ShowerRain => "Shower rain",
            Self::RainDay | Self::RainNight => "Rain",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Unknown => "Unknown",
        }
    }

    /// Asset name of the bundled icon
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::ClearDay => "weatherful_clear_day",
            Self::ClearNight => "weatherful_clear_night",
            Self::FewCloudsDay => "weatherful_few_clouds_day",
            Self::FewCloudsNight => "weatherful_few_clouds_night",
            Self::ScatteredClouds => "weatherful_scattered_clouds",
            Self::BrokenClouds => "weatherful_broken_clouds",
            Self::ShowerRain => "weatherful_shower_rain",
            Self::RainDay => "weatherful_rain_day",
            Self::RainNight => "weatherful_rain_night",
            Self::Thunderstorm => "weatherful_thunderstorm",
            Self::Snow => "weatherful_snow",
            Self::Mist => "weatherful_mist",
            Self::Unknown => "weatherful_unknown",
        }
    }

    /// Single-character glyph for terminal output
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::ClearDay => "☀",
            Self::ClearNight => "☾",
            Self::FewCloudsDay | Self::FewCloudsNight => "⛅",
            Self::ScatteredClouds | Self::BrokenClouds => "☁",
            Self::ShowerRain | Self::RainDay | Self::RainNight => "☂",
            Self::Thunderstorm => "⚡",
            Self::Snow => "❄",
            Self::Mist => "≡",
            Self::Unknown => "?",
        }
    }
}

/// Map a condition code to its icon, falling back to `IconKey::Unknown`.
pub fn map_icon(code: &str) -> IconKey {
    let icon = IconKey::from_owm_code(code);
    if icon == IconKey::Unknown {
        tracing::debug!("No icon mapped for condition code {:?}", code);
    }
    icon
}
