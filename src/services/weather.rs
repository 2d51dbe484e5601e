use crate::cache::{forecast_cache_key, ForecastCache, MemoryForecastCache};
use crate::config::WeatherConfig;
use crate::error::{PlannerError, Result};
use crate::models::region::find_city;
use crate::models::{CityForecast, ForecastsByCity, WeatherCondition, WeatherForecast};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use time::macros::format_description;
use time::Date;

/// Provider of daily forecasts for a city
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_weather_forecast(
        &self,
        city_key: &str,
        start: Date,
        end: Date,
    ) -> Result<CityForecast>;
}

/// Open-Meteo daily forecast client. Cities are resolved to coordinates
/// through the static city registry.
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(OpenMeteoClient {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<u16>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f32>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f32>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f32>>,
}

impl OpenMeteoDaily {
    fn into_forecast(self, city_key: &str) -> CityForecast {
        let format = format_description!("[year]-[month]-[day]");
        let mut forecast = CityForecast::new();

        for (i, raw_date) in self.time.iter().enumerate() {
            let date = match Date::parse(raw_date, format) {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(
                        city = %city_key,
                        date = %raw_date,
                        error = %e,
                        "Skipping unparseable forecast date"
                    );
                    continue;
                }
            };
            let condition = self
                .weather_code
                .get(i)
                .copied()
                .flatten()
                .map(WeatherCondition::from_wmo_code)
                .unwrap_or(WeatherCondition::Cloudy);

            forecast.insert(
                date,
                WeatherForecast {
                    date,
                    condition,
                    temp_max_c: self.temperature_2m_max.get(i).copied().flatten(),
                    temp_min_c: self.temperature_2m_min.get(i).copied().flatten(),
                    precipitation_probability: self
                        .precipitation_probability_max
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|p| p.clamp(0.0, 100.0).round() as u8),
                },
            );
        }
        forecast
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_weather_forecast(
        &self,
        city_key: &str,
        start: Date,
        end: Date,
    ) -> Result<CityForecast> {
        let city = find_city(city_key).ok_or_else(|| {
            PlannerError::NotFound(format!("No coordinates for city '{}'", city_key))
        })?;
        let center = city.center();

        tracing::debug!(city = %city_key, start = %start, end = %end, "Open-Meteo request");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", center.lat.to_string()),
                ("longitude", center.lng.to_string()),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PlannerError::WeatherApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PlannerError::WeatherApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::WeatherApi(format!("Failed to parse response: {}", e)))?;

        Ok(body.daily.into_forecast(city_key))
    }
}

/// Serves forecasts from a cache, falling through to the wrapped source on
/// a miss. Failures are never cached.
pub struct CachedWeatherSource {
    inner: Arc<dyn WeatherSource>,
    cache: Arc<dyn ForecastCache>,
}

impl CachedWeatherSource {
    pub fn new(inner: Arc<dyn WeatherSource>, cache: Arc<dyn ForecastCache>) -> Self {
        CachedWeatherSource { inner, cache }
    }

    /// Open-Meteo behind an in-memory cache, both sized from config
    pub fn open_meteo(config: &WeatherConfig) -> Result<Self> {
        let client = OpenMeteoClient::new(config)?;
        let cache = MemoryForecastCache::new(config.cache_ttl_secs, config.cache_max_entries);
        tracing::info!(
            base_url = %config.base_url,
            ttl_secs = config.cache_ttl_secs,
            "Weather source ready"
        );
        Ok(Self::new(Arc::new(client), Arc::new(cache)))
    }

    pub fn cache(&self) -> &Arc<dyn ForecastCache> {
        &self.cache
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }
}

#[async_trait]
impl WeatherSource for CachedWeatherSource {
    async fn fetch_weather_forecast(
        &self,
        city_key: &str,
        start: Date,
        end: Date,
    ) -> Result<CityForecast> {
        let key = forecast_cache_key(city_key, start, end);
        if let Some(forecast) = self.cache.get_forecast(&key).await {
            return Ok(forecast);
        }
        let forecast = self.inner.fetch_weather_forecast(city_key, start, end).await?;
        self.cache.cache_forecast(&key, &forecast).await;
        Ok(forecast)
    }
}

/// One concurrent request per distinct city. A failed city is logged and
/// left out; the others are still returned.
pub async fn fetch_forecasts_for_cities(
    source: &dyn WeatherSource,
    city_keys: &[String],
    start: Date,
    end: Date,
) -> ForecastsByCity {
    let mut distinct: Vec<&str> = Vec::new();
    for key in city_keys {
        if !distinct.contains(&key.as_str()) {
            distinct.push(key);
        }
    }

    let results = join_all(distinct.iter().map(|city| async move {
        (*city, source.fetch_weather_forecast(city, start, end).await)
    }))
    .await;

    let mut forecasts = ForecastsByCity::new();
    for (city, result) in results {
        match result {
            Ok(forecast) => {
                forecasts.insert(city.to_string(), forecast);
            }
            Err(e) => {
                tracing::warn!(
                    city = %city,
                    error = %e,
                    "Weather fetch failed, continuing without forecast"
                );
            }
        }
    }
    forecasts
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_daily_block_parsing_tolerates_gaps() {
        let json = r#"{
            "daily": {
                "time": ["2026-04-01", "2026-04-02", "bad"],
                "weather_code": [61, null, 0],
                "temperature_2m_max": [18.5, 21.0, 20.0],
                "temperature_2m_min": [11.0, null, 9.0],
                "precipitation_probability_max": [85, 10, 0]
            }
        }"#;
        let response: OpenMeteoResponse = serde_json::from_str(json).unwrap();
        let forecast = response.daily.into_forecast("kyoto");

        assert_eq!(forecast.len(), 2);
        let first = &forecast[&date!(2026 - 04 - 01)];
        assert_eq!(first.condition, WeatherCondition::Rain);
        assert_eq!(first.precipitation_probability, Some(85));
        assert!(first.is_wet());

        let second = &forecast[&date!(2026 - 04 - 02)];
        assert_eq!(second.condition, WeatherCondition::Cloudy);
        assert_eq!(second.temp_min_c, None);
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_found() {
        let client = OpenMeteoClient::new(&WeatherConfig::default()).unwrap();
        let err = client
            .fetch_weather_forecast("atlantis", date!(2026 - 04 - 01), date!(2026 - 04 - 02))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_meteo_source_starts_with_empty_cache() {
        let source = CachedWeatherSource::open_meteo(&WeatherConfig::default()).unwrap();
        assert_eq!(source.cache().backend_name(), "memory");
        assert_eq!(source.cache().get_stats().await.entries, 0);
    }
}
