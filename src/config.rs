use crate::constants::*;
use crate::error::{PlannerError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Only required by the Postgres location repository
    pub database_url: Option<String>,
    pub weather: WeatherConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_WEATHER_TIMEOUT_SECONDS,
            cache_ttl_secs: DEFAULT_WEATHER_CACHE_TTL_SECONDS,
            cache_max_entries: DEFAULT_WEATHER_CACHE_MAX_ENTRIES,
        }
    }
}

impl WeatherConfig {
    pub fn from_env() -> std::result::Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("WEATHER_API_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: env::var("WEATHER_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.timeout_secs.to_string())
                .parse()
                .map_err(|_| "Invalid WEATHER_TIMEOUT_SECS")?,
            cache_ttl_secs: env::var("WEATHER_CACHE_TTL")
                .unwrap_or_else(|_| defaults.cache_ttl_secs.to_string())
                .parse()
                .map_err(|_| "Invalid WEATHER_CACHE_TTL")?,
            cache_max_entries: env::var("WEATHER_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| defaults.cache_max_entries.to_string())
                .parse()
                .map_err(|_| "Invalid WEATHER_CACHE_MAX_ENTRIES")?,
        })
    }
}

/// Relative weight of each scoring factor. All weights must be non-negative
/// so that improving one factor never lowers the total score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub interest: f32,
    pub rating: f32,
    pub logistics: f32,
    pub budget: f32,
    pub accessibility: f32,
    pub diversity: f32,
    pub weather: f32,
    pub time_of_day: f32,
    pub group: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            interest: 30.0,
            rating: 15.0,
            logistics: 15.0,
            budget: 8.0,
            accessibility: 10.0,
            diversity: 10.0,
            weather: 8.0,
            time_of_day: 8.0,
            group: 6.0,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> std::result::Result<(), String> {
        let weights = [
            ("interest", self.interest),
            ("rating", self.rating),
            ("logistics", self.logistics),
            ("budget", self.budget),
            ("accessibility", self.accessibility),
            ("diversity", self.diversity),
            ("weather", self.weather),
            ("time_of_day", self.time_of_day),
            ("group", self.group),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!(
                    "Score weight '{}' must be a non-negative number, got {}",
                    name, weight
                ));
            }
        }
        Ok(())
    }

    /// Sum of all weights, the maximum attainable score.
    pub fn total(&self) -> f32 {
        self.interest
            + self.rating
            + self.logistics
            + self.budget
            + self.accessibility
            + self.diversity
            + self.weather
            + self.time_of_day
            + self.group
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Scoring weights for the nine location factors
    pub weights: ScoreWeights,

    /// Absolute cap on picker invocations per time slot
    pub max_attempts_per_slot: u32,

    /// Edge length (km) of the grid cells used for zone clustering
    pub zone_cell_size_km: f64,

    /// Number of runner-up names attached to each pick
    pub max_runner_ups: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            max_attempts_per_slot: 12,
            zone_cell_size_km: DEFAULT_ZONE_CELL_SIZE_KM,
            max_runner_ups: 3,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> std::result::Result<Self, String> {
        let defaults = Self::default();
        let default_weights = &defaults.weights;

        let weights = ScoreWeights {
            interest: env::var("ITINERARY_SCORE_WEIGHT_INTEREST")
                .unwrap_or_else(|_| default_weights.interest.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_INTEREST")?,
            rating: env::var("ITINERARY_SCORE_WEIGHT_RATING")
                .unwrap_or_else(|_| default_weights.rating.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_RATING")?,
            logistics: env::var("ITINERARY_SCORE_WEIGHT_LOGISTICS")
                .unwrap_or_else(|_| default_weights.logistics.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_LOGISTICS")?,
            budget: env::var("ITINERARY_SCORE_WEIGHT_BUDGET")
                .unwrap_or_else(|_| default_weights.budget.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_BUDGET")?,
            accessibility: env::var("ITINERARY_SCORE_WEIGHT_ACCESSIBILITY")
                .unwrap_or_else(|_| default_weights.accessibility.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_ACCESSIBILITY")?,
            diversity: env::var("ITINERARY_SCORE_WEIGHT_DIVERSITY")
                .unwrap_or_else(|_| default_weights.diversity.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_DIVERSITY")?,
            weather: env::var("ITINERARY_SCORE_WEIGHT_WEATHER")
                .unwrap_or_else(|_| default_weights.weather.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_WEATHER")?,
            time_of_day: env::var("ITINERARY_SCORE_WEIGHT_TIME_OF_DAY")
                .unwrap_or_else(|_| default_weights.time_of_day.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_TIME_OF_DAY")?,
            group: env::var("ITINERARY_SCORE_WEIGHT_GROUP")
                .unwrap_or_else(|_| default_weights.group.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_SCORE_WEIGHT_GROUP")?,
        };
        weights.validate()?;

        let zone_cell_size_km: f64 = env::var("ITINERARY_ZONE_CELL_SIZE_KM")
            .unwrap_or_else(|_| defaults.zone_cell_size_km.to_string())
            .parse()
            .map_err(|_| "Invalid ITINERARY_ZONE_CELL_SIZE_KM")?;

        if zone_cell_size_km <= 0.0 || zone_cell_size_km > 20.0 {
            return Err("ITINERARY_ZONE_CELL_SIZE_KM must be between 0 and 20 km".to_string());
        }

        Ok(Self {
            weights,
            max_attempts_per_slot: env::var("ITINERARY_MAX_ATTEMPTS_PER_SLOT")
                .unwrap_or_else(|_| defaults.max_attempts_per_slot.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_MAX_ATTEMPTS_PER_SLOT")?,
            zone_cell_size_km,
            max_runner_ups: env::var("ITINERARY_MAX_RUNNER_UPS")
                .unwrap_or_else(|_| defaults.max_runner_ups.to_string())
                .parse()
                .map_err(|_| "Invalid ITINERARY_MAX_RUNNER_UPS")?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL").ok(),
            weather: WeatherConfig::from_env().map_err(PlannerError::Config)?,
            generator: GeneratorConfig::from_env().map_err(PlannerError::Config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_weights_are_valid() {
        let weights = ScoreWeights::default();
        assert!(weights.validate().is_ok());
        assert_eq!(weights.total(), 110.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let weights = ScoreWeights {
            diversity: -1.0,
            ..ScoreWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.contains("diversity"), "unexpected error: {err}");
    }

    #[test]
    #[serial]
    fn generator_config_reads_env_overrides() {
        env::set_var("ITINERARY_SCORE_WEIGHT_INTEREST", "42.5");
        env::set_var("ITINERARY_MAX_ATTEMPTS_PER_SLOT", "20");

        let config = GeneratorConfig::from_env().unwrap();
        assert_eq!(config.weights.interest, 42.5);
        assert_eq!(config.max_attempts_per_slot, 20);
        assert_eq!(config.weights.rating, ScoreWeights::default().rating);

        env::remove_var("ITINERARY_SCORE_WEIGHT_INTEREST");
        env::remove_var("ITINERARY_MAX_ATTEMPTS_PER_SLOT");
    }

    #[test]
    #[serial]
    fn generator_config_rejects_invalid_cell_size() {
        env::set_var("ITINERARY_ZONE_CELL_SIZE_KM", "0");
        assert!(GeneratorConfig::from_env().is_err());
        env::remove_var("ITINERARY_ZONE_CELL_SIZE_KM");
    }

    #[test]
    #[serial]
    fn generator_config_rejects_unparseable_weight() {
        env::set_var("ITINERARY_SCORE_WEIGHT_GROUP", "lots");
        let err = GeneratorConfig::from_env().unwrap_err();
        assert_eq!(err, "Invalid ITINERARY_SCORE_WEIGHT_GROUP");
        env::remove_var("ITINERARY_SCORE_WEIGHT_GROUP");
    }

    #[test]
    #[serial]
    fn config_errors_surface_as_configuration_errors() {
        env::set_var("WEATHER_TIMEOUT_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, PlannerError::Config(ref msg) if msg == "Invalid WEATHER_TIMEOUT_SECS"));
        assert_eq!(err.to_string(), "Configuration error: Invalid WEATHER_TIMEOUT_SECS");
        env::remove_var("WEATHER_TIMEOUT_SECS");
    }
}
