mod activity_builder;
pub mod city_sequence;
mod day_planner;
pub mod day_trip;
pub mod geo_validator;
pub mod location_index;
pub mod location_picker;
pub mod scheduling_state;
pub mod scoring;
pub mod time_slots;
pub mod zones;

use crate::config::GeneratorConfig;
use crate::db::{LocationFilter, LocationRepository};
use crate::error::Result;
use crate::models::{normalize_key, ForecastsByCity, Itinerary, Location, TripBuilderData};
use crate::services::weather::{fetch_forecasts_for_cities, WeatherSource};
use std::sync::Arc;

use city_sequence::{resolve_city_seeds, resolve_total_days};
use day_planner::DayPlanner;
use day_trip::day_trip_cities_for;
use location_index::LocationIndex;
use scoring::{LocationScorer, WeightedScorer};

pub use activity_builder::{infer_meal_type, SAVED_TAG};
pub use day_planner::interest_sequence;

/// Turns a trip request into a day-by-day itinerary
pub struct ItineraryGenerator {
    locations: Arc<dyn LocationRepository>,
    weather: Option<Arc<dyn WeatherSource>>,
    config: GeneratorConfig,
    scorer: Box<dyn LocationScorer>,
}

impl ItineraryGenerator {
    pub fn new(
        locations: Arc<dyn LocationRepository>,
        weather: Option<Arc<dyn WeatherSource>>,
        config: GeneratorConfig,
    ) -> Self {
        let scorer = Box::new(WeightedScorer::new(config.weights.clone()));
        ItineraryGenerator {
            locations,
            weather,
            config,
            scorer,
        }
    }

    /// Replace the default weighted scorer
    pub fn with_scorer(mut self, scorer: Box<dyn LocationScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Fetch locations and forecasts for the trip, then plan it. Weather
    /// failures only cost that city its forecast; a location fetch failure
    /// fails the run.
    pub async fn generate_itinerary_from_trip(&self, trip: &TripBuilderData) -> Result<Itinerary> {
        let total_days = resolve_total_days(trip)?;
        let filter = location_filter_for(trip);

        tracing::info!(
            total_days,
            cities = ?filter.cities,
            pace = %trip.pace(),
            "Generating itinerary"
        );

        let locations = self.locations.fetch_all_locations(&filter).await?;
        tracing::debug!(count = locations.len(), "Fetched locations");

        let forecasts = match (&self.weather, trip.dates.start) {
            (Some(source), Some(start)) => {
                let index = LocationIndex::new(locations.clone());
                let city_keys: Vec<String> = resolve_city_seeds(trip, &index)
                    .into_iter()
                    .filter(|c| !c.is_placeholder())
                    .map(|c| c.key)
                    .collect();
                let mut keys = city_keys.clone();
                keys.extend(day_trip_cities_for(&city_keys));
                let end = trip
                    .dates
                    .end
                    .filter(|end| *end >= start)
                    .or_else(|| start.checked_add(time::Duration::days(i64::from(total_days) - 1)))
                    .unwrap_or(start);
                fetch_forecasts_for_cities(source.as_ref(), &keys, start, end).await
            }
            _ => ForecastsByCity::new(),
        };

        self.generate_itinerary(trip, locations, &forecasts)
    }

    /// Plan a trip against an already fetched snapshot. Deterministic for a
    /// given trip, snapshot and forecast set.
    pub fn generate_itinerary(
        &self,
        trip: &TripBuilderData,
        locations: Vec<Location>,
        forecasts: &ForecastsByCity,
    ) -> Result<Itinerary> {
        let total_days = resolve_total_days(trip)?;
        let index = LocationIndex::new(locations);
        let planner = DayPlanner::new(trip, &index, forecasts, &self.config, self.scorer.as_ref());
        Ok(planner.plan(total_days))
    }
}

/// Cities to fetch: the trip's own plus, for small selections, every
/// day-trip target reachable from them. Region-only trips fetch everything.
pub fn location_filter_for(trip: &TripBuilderData) -> LocationFilter {
    let mut cities: Vec<String> = Vec::new();
    for city in &trip.cities {
        let key = normalize_key(city);
        if !key.is_empty() && !cities.contains(&key) {
            cities.push(key);
        }
    }
    if cities.is_empty() {
        return LocationFilter::default();
    }
    if cities.len() <= crate::constants::DAY_TRIP_MAX_SELECTED_CITIES {
        let extra = day_trip_cities_for(&cities);
        cities.extend(extra);
    }
    LocationFilter {
        cities: Some(cities),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_widens_small_selections() {
        let trip = TripBuilderData {
            cities: vec!["Kyoto".to_string()],
            ..Default::default()
        };
        let cities = location_filter_for(&trip).cities.unwrap();
        assert_eq!(cities[0], "kyoto");
        assert!(cities.contains(&"nara".to_string()));
    }

    #[test]
    fn test_filter_keeps_large_selections() {
        let trip = TripBuilderData {
            cities: vec!["tokyo".into(), "kyoto".into(), "osaka".into()],
            ..Default::default()
        };
        assert_eq!(
            location_filter_for(&trip).cities.unwrap(),
            vec!["tokyo", "kyoto", "osaka"]
        );
    }

    #[test]
    fn test_region_only_fetches_everything() {
        let trip = TripBuilderData {
            regions: vec!["kansai".into()],
            ..Default::default()
        };
        assert!(location_filter_for(&trip).cities.is_none());
    }
}
