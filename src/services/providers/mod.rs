/// Weather data providers
///
/// The recommender never calls a provider itself. Handlers resolve the weather
/// first through [`resolve_weather`], which degrades to a fixed snapshot when
/// the provider fails so that suggestions are never blocked on weather.
use crate::{error::AppResult, models::Weather};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

pub const FALLBACK_TEMP: f64 = 28.0;
pub const FALLBACK_CONDITION: &str = "Clear";

/// Snapshot used whenever live weather is unavailable
pub fn fallback_weather() -> Weather {
    Weather::new(FALLBACK_TEMP, FALLBACK_CONDITION)
}

/// Source of current conditions for a named city
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current temperature (°C) and condition for `city`
    async fn current_weather(&self, city: &str) -> AppResult<Weather>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Current weather for `city`, or the fallback snapshot if the provider fails
pub async fn resolve_weather(provider: &dyn WeatherProvider, city: &str) -> Weather {
    match provider.current_weather(city).await {
        Ok(weather) => weather,
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                city = %city,
                error = %e,
                "Weather lookup failed, using fallback"
            );
            fallback_weather()
        }
    }
}

/// Emoji shown next to a condition name
pub fn condition_emoji(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" => "🌫️",
        _ => "🌤️",
    }
}

/// Always reports the same weather; used without an API key and in tests
#[derive(Debug, Clone)]
pub struct StaticWeatherProvider {
    weather: Weather,
}

impl StaticWeatherProvider {
    pub fn new(weather: Weather) -> Self {
        Self { weather }
    }
}

impl Default for StaticWeatherProvider {
    fn default() -> Self {
        Self::new(fallback_weather())
    }
}

#[async_trait::async_trait]
impl WeatherProvider for StaticWeatherProvider {
    async fn current_weather(&self, _city: &str) -> AppResult<Weather> {
        Ok(self.weather.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
