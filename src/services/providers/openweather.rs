/// OpenWeatherMap current-conditions provider
///
/// Calls `/weather?q={city}&units=metric` and keeps each city's answer in Redis
/// for ten minutes, which keeps well inside the free tier's call budget.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::Weather,
    services::providers::WeatherProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const WEATHER_CACHE_TTL: u64 = 600; // 10 minutes

#[derive(Debug, Deserialize)]
struct ApiWeatherResponse {
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    main: String,
}

#[derive(Clone)]
pub struct OpenWeatherProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl OpenWeatherProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    fn convert_api_response(response: ApiWeatherResponse) -> AppResult<Weather> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .map(|c| c.main)
            .ok_or_else(|| {
                AppError::ExternalApi("Weather response missing conditions".to_string())
            })?;

        Ok(Weather::new(response.main.temp, condition))
    }

    async fn fetch(&self, city: &str) -> AppResult<Weather> {
        let url = format!("{}/weather", self.api_url.trim_end_matches('/'));

        tracing::debug!(city = %city, "Fetching weather from OpenWeatherMap");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                city = %city,
                status = %status,
                body = %body,
                "Weather API request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Weather API returned status {}: {}",
                status, body
            )));
        }

        let api_response: ApiWeatherResponse = response.json().await?;
        let weather = Self::convert_api_response(api_response)?;

        tracing::info!(
            city = %city,
            temp = weather.temp,
            condition = %weather.condition,
            "Fetched current weather"
        );

        Ok(weather)
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> AppResult<Weather> {
        cached!(
            self.cache,
            CacheKey::Weather(city.to_string()),
            WEATHER_CACHE_TTL,
            self.fetch(city)
        )
    }

    fn name(&self) -> &'static str {
        "openweathermap"
    }
}
