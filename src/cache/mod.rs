mod memory;

pub use memory::MemoryForecastCache;

use crate::models::CityForecast;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::Date;

/// Storage for per-city forecasts keyed by city and date range
#[async_trait]
pub trait ForecastCache: Send + Sync {
    async fn get_forecast(&self, key: &str) -> Option<CityForecast>;

    async fn cache_forecast(&self, key: &str, forecast: &CityForecast);

    /// Drop every entry, e.g. after the upstream source changed
    async fn invalidate_all(&self);

    async fn get_stats(&self) -> CacheStats;

    fn backend_name(&self) -> &'static str;
}

/// Cache key for one city's forecast over a date range
pub fn forecast_cache_key(city_key: &str, start: Date, end: Date) -> String {
    format!("weather:{}:{}:{}", city_key, start, end)
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups served from the cache
    pub hit_rate: f64,
    pub entries: u64,
}
