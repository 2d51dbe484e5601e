use async_trait::async_trait;
use itinerary_engine::config::GeneratorConfig;
use itinerary_engine::db::InMemoryLocationRepository;
use itinerary_engine::error::{PlannerError, Result};
use itinerary_engine::evaluation::synthetic_city_pool;
use itinerary_engine::models::{
    CityForecast, Interest, Location, LocationCategory, Pace, TripBuilderData, WeatherCondition,
    WeatherForecast,
};
use itinerary_engine::services::{ItineraryGenerator, WeatherSource};
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use time::{Date, Duration};

/// Connect to the test database, or `None` when DATABASE_URL is unset
#[allow(dead_code)]
pub async fn setup_test_db() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            println!("Skipping database test: DATABASE_URL not set");
            return None;
        }
    };

    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Remove all test data
#[allow(dead_code)]
pub async fn cleanup_test_db(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE locations")
        .execute(pool)
        .await
        .expect("Failed to clean up test database");
}

/// Create a test location with coordinates
#[allow(dead_code)]
pub fn create_test_location(
    id: &str,
    name: &str,
    city: &str,
    category: LocationCategory,
    lat: f64,
    lng: f64,
) -> Location {
    Location::new(id, name, city, "kansai", category)
        .with_coordinates(lat, lng)
        .with_rating(4.3)
        .with_duration(90)
}

/// Synthetic pools for several cities at once
#[allow(dead_code)]
pub fn city_pools(cities: &[(&str, usize)]) -> Vec<Location> {
    cities
        .iter()
        .flat_map(|(city, count)| synthetic_city_pool(city, *count))
        .collect()
}

#[allow(dead_code)]
pub fn trip_for(cities: &[&str], duration: i32, pace: Pace) -> TripBuilderData {
    TripBuilderData {
        duration: Some(duration),
        cities: cities.iter().map(|c| c.to_string()).collect(),
        style: Some(pace),
        interests: vec![Interest::Culture, Interest::Nature, Interest::Shopping],
        ..Default::default()
    }
}

/// Generator over a fixed in-memory snapshot
#[allow(dead_code)]
pub fn generator_with(
    locations: Vec<Location>,
    weather: Option<Arc<dyn WeatherSource>>,
) -> ItineraryGenerator {
    ItineraryGenerator::new(
        Arc::new(InMemoryLocationRepository::new(locations)),
        weather,
        GeneratorConfig::default(),
    )
}

/// Weather source returning the same condition every day, counting calls
#[allow(dead_code)]
pub struct MockWeatherSource {
    pub condition: WeatherCondition,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockWeatherSource {
    pub fn new(condition: WeatherCondition) -> Self {
        MockWeatherSource {
            condition,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn fetch_weather_forecast(
        &self,
        _city_key: &str,
        start: Date,
        end: Date,
    ) -> Result<CityForecast> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut forecast = CityForecast::new();
        let mut date = start;
        while date <= end {
            forecast.insert(
                date,
                WeatherForecast {
                    date,
                    condition: self.condition,
                    temp_max_c: Some(22.0),
                    temp_min_c: Some(14.0),
                    precipitation_probability: Some(if self.condition == WeatherCondition::Rain {
                        90
                    } else {
                        5
                    }),
                },
            );
            date = match date.checked_add(Duration::days(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(forecast)
    }
}

/// Weather source that fails for the listed cities and serves clear skies
/// for the rest
#[allow(dead_code)]
pub struct FailingWeatherSource {
    pub failing: Vec<String>,
    pub fallback: MockWeatherSource,
}

#[allow(dead_code)]
impl FailingWeatherSource {
    pub fn failing_for(cities: &[&str]) -> Self {
        FailingWeatherSource {
            failing: cities.iter().map(|c| c.to_string()).collect(),
            fallback: MockWeatherSource::new(WeatherCondition::Clear),
        }
    }
}

#[async_trait]
impl WeatherSource for FailingWeatherSource {
    async fn fetch_weather_forecast(
        &self,
        city_key: &str,
        start: Date,
        end: Date,
    ) -> Result<CityForecast> {
        if self.failing.iter().any(|c| c == city_key) {
            return Err(PlannerError::WeatherApi(format!(
                "HTTP 503: upstream unavailable for {}",
                city_key
            )));
        }
        self.fallback.fetch_weather_forecast(city_key, start, end).await
    }
}
