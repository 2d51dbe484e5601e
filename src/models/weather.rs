use crate::constants::{HOT_DAY_THRESHOLD_C, WET_DAY_PRECIPITATION_PCT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use time::Date;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    HeavyRain,
    Snow,
    Storm,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code to a condition
    pub fn from_wmo_code(code: u16) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1 | 2 => WeatherCondition::PartlyCloudy,
            3 => WeatherCondition::Cloudy,
            45 | 48 => WeatherCondition::Fog,
            51..=63 | 80 | 81 => WeatherCondition::Rain,
            64..=67 | 82 => WeatherCondition::HeavyRain,
            71..=77 | 85 | 86 => WeatherCondition::Snow,
            95..=99 => WeatherCondition::Storm,
            _ => WeatherCondition::Cloudy,
        }
    }

    pub fn is_precipitation(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Rain
                | WeatherCondition::HeavyRain
                | WeatherCondition::Snow
                | WeatherCondition::Storm
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: Date,
    pub condition: WeatherCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<u8>,
}

impl WeatherForecast {
    pub fn new(date: Date, condition: WeatherCondition) -> Self {
        WeatherForecast {
            date,
            condition,
            temp_max_c: None,
            temp_min_c: None,
            precipitation_probability: None,
        }
    }

    /// Rain, snow or storms forecast, or a high chance of precipitation
    pub fn is_wet(&self) -> bool {
        self.condition.is_precipitation()
            || self
                .precipitation_probability
                .is_some_and(|p| p >= WET_DAY_PRECIPITATION_PCT)
    }

    pub fn is_hot(&self) -> bool {
        self.temp_max_c.is_some_and(|t| t >= HOT_DAY_THRESHOLD_C)
    }
}

/// Forecasts for one city keyed by date
pub type CityForecast = BTreeMap<Date, WeatherForecast>;

/// Forecasts for every city in a trip, keyed by normalized city key
pub type ForecastsByCity = HashMap<String, CityForecast>;
