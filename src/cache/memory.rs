use crate::cache::{CacheStats, ForecastCache};
use crate::models::CityForecast;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory forecast cache backed by moka with TTL and bounded capacity.
/// All methods are `&self`; no locking needed.
pub struct MemoryForecastCache {
    forecasts: Cache<String, Arc<CityForecast>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryForecastCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let forecasts = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryForecastCache {
            forecasts,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ForecastCache for MemoryForecastCache {
    async fn get_forecast(&self, key: &str) -> Option<CityForecast> {
        match self.forecasts.get(key).await {
            Some(forecast) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Forecast cache hit");
                Some((*forecast).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Forecast cache miss");
                None
            }
        }
    }

    async fn cache_forecast(&self, key: &str, forecast: &CityForecast) {
        self.forecasts
            .insert(key.to_string(), Arc::new(forecast.clone()))
            .await;
        tracing::debug!(key = %key, days = forecast.len(), "Cached forecast");
    }

    async fn invalidate_all(&self) {
        self.forecasts.invalidate_all();
        self.forecasts.run_pending_tasks().await;
        tracing::info!("Forecast cache invalidated");
    }

    async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.forecasts.entry_count(),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
