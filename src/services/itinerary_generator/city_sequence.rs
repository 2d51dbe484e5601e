use super::location_index::LocationIndex;
use crate::constants::DEFAULT_TOTAL_DAYS;
use crate::error::{PlannerError, Result};
use crate::models::region::DEFAULT_CITY_ROTATION;
use crate::models::{normalize_key, CityInfo, TripBuilderData};

/// One way of deriving the seed city list. Returns an empty list when it
/// cannot resolve anything so the next strategy gets a turn.
type SeedStrategy = fn(&TripBuilderData, &LocationIndex) -> Vec<CityInfo>;

/// Seed strategies in precedence order; the first non-empty result wins.
pub const SEED_STRATEGIES: &[(&str, SeedStrategy)] = &[
    ("explicit cities", seeds_from_explicit_cities),
    ("regions", seeds_from_regions),
    ("default rotation", seeds_from_default_rotation),
    ("first indexed city", seeds_from_first_indexed_city),
];

/// Ordered, deduplicated list of distinct cities the trip visits. Never empty:
/// falls back to a country-wide placeholder.
pub fn resolve_city_seeds(trip: &TripBuilderData, index: &LocationIndex) -> Vec<CityInfo> {
    for (name, strategy) in SEED_STRATEGIES {
        let seeds = strategy(trip, index);
        if !seeds.is_empty() {
            tracing::debug!(
                strategy = *name,
                cities = ?seeds.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
                "Resolved city seeds"
            );
            return seeds;
        }
    }

    tracing::warn!("No city could be resolved for trip, using placeholder");
    vec![CityInfo::placeholder()]
}

/// Repeat the seeds round-robin so there is exactly one city per day
pub fn expand_to_days(seeds: &[CityInfo], total_days: u32) -> Vec<CityInfo> {
    if seeds.is_empty() {
        return vec![CityInfo::placeholder(); total_days as usize];
    }
    (0..total_days as usize)
        .map(|day| seeds[day % seeds.len()].clone())
        .collect()
}

pub fn build_city_sequence(
    trip: &TripBuilderData,
    index: &LocationIndex,
    total_days: u32,
) -> Vec<CityInfo> {
    expand_to_days(&resolve_city_seeds(trip, index), total_days)
}

fn push_unique(seeds: &mut Vec<CityInfo>, city: CityInfo) {
    if !seeds.iter().any(|c| c.key == city.key) {
        seeds.push(city);
    }
}

fn seeds_from_explicit_cities(trip: &TripBuilderData, index: &LocationIndex) -> Vec<CityInfo> {
    let mut seeds = Vec::new();

    for raw in &trip.cities {
        let key = normalize_key(raw);
        if key.is_empty() {
            continue;
        }

        if index.has_locations(&key) {
            if let Some(city) = index.city_info(&key) {
                push_unique(&mut seeds, city);
            }
            continue;
        }

        let regional = index
            .region_of(&key)
            .and_then(|region| index.first_city_with_locations_in_region(&region))
            .and_then(|fallback| index.city_info(&fallback));

        match regional {
            Some(fallback) => {
                tracing::info!(
                    requested = %key,
                    fallback = %fallback.key,
                    "Requested city has no locations, using first city of its region"
                );
                push_unique(&mut seeds, fallback);
            }
            None => {
                // Kept as requested; its days come out empty.
                tracing::warn!(city = %key, "Requested city has no locations and no regional fallback");
                let city = index
                    .city_info(&key)
                    .unwrap_or_else(|| CityInfo::new(key.clone(), raw.trim(), None));
                push_unique(&mut seeds, city);
            }
        }
    }

    seeds
}

fn seeds_from_regions(trip: &TripBuilderData, index: &LocationIndex) -> Vec<CityInfo> {
    let mut seeds = Vec::new();
    for raw in &trip.regions {
        let region = normalize_key(raw);
        match index
            .first_city_with_locations_in_region(&region)
            .and_then(|key| index.city_info(&key))
        {
            Some(city) => push_unique(&mut seeds, city),
            None => tracing::warn!(region = %region, "Region has no city with locations"),
        }
    }
    seeds
}

fn seeds_from_default_rotation(_trip: &TripBuilderData, index: &LocationIndex) -> Vec<CityInfo> {
    let mut seeds = Vec::new();
    for key in DEFAULT_CITY_ROTATION {
        if index.has_locations(key) {
            if let Some(city) = index.city_info(key) {
                push_unique(&mut seeds, city);
            }
        }
    }
    seeds
}

fn seeds_from_first_indexed_city(_trip: &TripBuilderData, index: &LocationIndex) -> Vec<CityInfo> {
    index
        .first_city()
        .and_then(|key| index.city_info(key))
        .into_iter()
        .collect()
}

/// One way of deriving the trip length; `Ok(None)` passes to the next.
type DurationStrategy = fn(&TripBuilderData) -> Result<Option<u32>>;

const DURATION_STRATEGIES: &[DurationStrategy] = &[days_from_duration, days_from_date_range];

/// Total days: explicit positive duration, then the inclusive date range,
/// then [`DEFAULT_TOTAL_DAYS`]. An end date before the start is an error.
pub fn resolve_total_days(trip: &TripBuilderData) -> Result<u32> {
    for strategy in DURATION_STRATEGIES {
        if let Some(days) = strategy(trip)? {
            return Ok(days);
        }
    }
    Ok(DEFAULT_TOTAL_DAYS)
}

fn days_from_duration(trip: &TripBuilderData) -> Result<Option<u32>> {
    Ok(trip
        .duration
        .filter(|&d| d > 0)
        .and_then(|d| u32::try_from(d).ok()))
}

fn days_from_date_range(trip: &TripBuilderData) -> Result<Option<u32>> {
    let (Some(start), Some(end)) = (trip.dates.start, trip.dates.end) else {
        return Ok(None);
    };
    if end < start {
        return Err(PlannerError::InvalidInput(format!(
            "Trip end date {} is before start date {}",
            end, start
        )));
    }
    let days = (end - start).whole_days() + 1;
    u32::try_from(days)
        .map(Some)
        .map_err(|_| PlannerError::InvalidInput(format!("Trip spans too many days: {}", days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, LocationCategory};
    use time::macros::date;

    fn loc(id: &str, city: &str, region: &str) -> Location {
        Location::new(id, id, city, region, LocationCategory::Temple)
    }

    fn index() -> LocationIndex {
        LocationIndex::new(vec![
            loc("o1", "osaka", "kansai"),
            loc("k1", "kyoto", "kansai"),
            loc("h1", "hiroshima", "chugoku"),
        ])
    }

    fn keys(cities: &[CityInfo]) -> Vec<&str> {
        cities.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_explicit_cities_dedup_and_normalize() {
        let trip = TripBuilderData {
            cities: vec!["Kyoto".into(), "kyoto ".into(), "Hiroshima".into()],
            ..Default::default()
        };
        assert_eq!(keys(&resolve_city_seeds(&trip, &index())), vec!["kyoto", "hiroshima"]);
    }

    #[test]
    fn test_explicit_city_falls_back_to_region() {
        let trip = TripBuilderData {
            cities: vec!["nara".into()],
            ..Default::default()
        };
        assert_eq!(keys(&resolve_city_seeds(&trip, &index())), vec!["kyoto"]);
    }

    #[test]
    fn test_explicit_city_without_fallback_is_kept() {
        let trip = TripBuilderData {
            cities: vec!["sapporo".into()],
            ..Default::default()
        };
        let seeds = resolve_city_seeds(&trip, &index());
        assert_eq!(keys(&seeds), vec!["sapporo"]);
        assert_eq!(seeds[0].label, "Sapporo");
    }

    #[test]
    fn test_regions_then_default_rotation() {
        let trip = TripBuilderData {
            regions: vec!["chugoku".into(), "kyushu".into()],
            ..Default::default()
        };
        assert_eq!(keys(&resolve_city_seeds(&trip, &index())), vec!["hiroshima"]);

        let empty = TripBuilderData::default();
        assert_eq!(keys(&resolve_city_seeds(&empty, &index())), vec!["kyoto", "osaka"]);
    }

    #[test]
    fn test_first_indexed_city_then_placeholder() {
        let index = LocationIndex::new(vec![loc("f1", "fukuoka", "kyushu")]);
        let trip = TripBuilderData::default();
        assert_eq!(keys(&resolve_city_seeds(&trip, &index)), vec!["fukuoka"]);

        let seeds = resolve_city_seeds(&trip, &LocationIndex::new(Vec::new()));
        assert_eq!(seeds.len(), 1);
        assert!(seeds[0].is_placeholder());
    }

    #[test]
    fn test_expand_round_robin() {
        let seeds = vec![
            CityInfo::new("kyoto", "Kyoto", None),
            CityInfo::new("osaka", "Osaka", None),
        ];
        let days = expand_to_days(&seeds, 5);
        assert_eq!(keys(&days), vec!["kyoto", "osaka", "kyoto", "osaka", "kyoto"]);
        assert!(expand_to_days(&seeds, 0).is_empty());
    }

    #[test]
    fn test_total_days_chain() {
        let mut trip = TripBuilderData {
            duration: Some(4),
            ..Default::default()
        };
        assert_eq!(resolve_total_days(&trip).unwrap(), 4);

        trip.duration = Some(0);
        trip.dates.start = Some(date!(2026 - 04 - 01));
        trip.dates.end = Some(date!(2026 - 04 - 05));
        assert_eq!(resolve_total_days(&trip).unwrap(), 5);

        trip.duration = Some(-3);
        trip.dates.end = None;
        assert_eq!(resolve_total_days(&trip).unwrap(), DEFAULT_TOTAL_DAYS);
    }

    #[test]
    fn test_inverted_date_range_is_invalid() {
        let trip = TripBuilderData {
            dates: crate::models::TripDates {
                start: Some(date!(2026 - 04 - 05)),
                end: Some(date!(2026 - 04 - 01)),
            },
            ..Default::default()
        };
        assert!(matches!(
            resolve_total_days(&trip),
            Err(PlannerError::InvalidInput(_))
        ));
    }
}
