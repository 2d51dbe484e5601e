use crate::constants::{
    DAYS_PER_DAY_TRIP, DAY_TRIP_MAX_SELECTED_CITIES, DAY_TRIP_MIN_CONSECUTIVE_DAYS, MAX_DAY_TRIPS,
};

/// A city reachable from a base city and back within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTripTarget {
    pub city_key: &'static str,
    /// One-way travel time
    pub travel_minutes: u32,
}

const fn target(city_key: &'static str, travel_minutes: u32) -> DayTripTarget {
    DayTripTarget {
        city_key,
        travel_minutes,
    }
}

/// Day-trip targets per base city, in order of preference
const DAY_TRIPS: &[(&str, &[DayTripTarget])] = &[
    ("kyoto", &[target("nara", 45), target("osaka", 30), target("kobe", 60), target("himeji", 90)]),
    ("osaka", &[target("nara", 40), target("kobe", 25), target("kyoto", 30), target("himeji", 60)]),
    ("kobe", &[target("himeji", 40), target("osaka", 25), target("kyoto", 50)]),
    ("nara", &[target("kyoto", 45), target("osaka", 40)]),
    ("tokyo", &[target("yokohama", 30), target("kamakura", 60), target("hakone", 90), target("nikko", 120)]),
    ("yokohama", &[target("kamakura", 30), target("tokyo", 30), target("hakone", 75)]),
    ("hiroshima", &[target("miyajima", 45), target("okayama", 40)]),
    ("okayama", &[target("himeji", 25), target("hiroshima", 40)]),
    ("kanazawa", &[target("takayama", 135)]),
    ("nagoya", &[target("takayama", 150), target("kyoto", 35)]),
    ("fukuoka", &[target("nagasaki", 120)]),
    ("sapporo", &[target("otaru", 40)]),
];

/// A committed day-trip decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTripConfig {
    pub base_city: String,
    pub target_city: String,
    pub travel_minutes: u32,
}

/// Current state of a stay in one city
#[derive(Debug, Clone, Copy)]
pub struct DayTripQuery<'a> {
    pub current_city_key: &'a str,
    /// Distinct cities the trip selected
    pub selected_city_count: usize,
    pub consecutive_days_in_city: u32,
    /// Unused non-food locations left in the current city
    pub unused_location_count: usize,
    pub target_activities_per_day: usize,
}

pub fn day_trip_targets(base_city_key: &str) -> &'static [DayTripTarget] {
    DAY_TRIPS
        .iter()
        .find(|(base, _)| *base == base_city_key)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Every day-trip target reachable from any of the given cities, deduplicated
/// in preference order
pub fn day_trip_cities_for(base_city_keys: &[String]) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for base in base_city_keys {
        for t in day_trip_targets(base) {
            if !base_city_keys.iter().any(|b| b == t.city_key)
                && !cities.iter().any(|c| c == t.city_key)
            {
                cities.push(t.city_key.to_string());
            }
        }
    }
    cities
}

/// Most day trips allowed in a trip of `total_days`
pub fn max_day_trips(total_days: u32) -> u32 {
    MAX_DAY_TRIPS.min((total_days + DAYS_PER_DAY_TRIP - 1) / DAYS_PER_DAY_TRIP)
}

/// Suggest a day trip when a small city selection is running out of fresh
/// locations. `is_viable` vets each target in preference order; the first
/// that passes is returned.
pub fn should_suggest_day_trip(
    query: &DayTripQuery<'_>,
    is_viable: impl Fn(&str) -> bool,
) -> Option<DayTripConfig> {
    if query.selected_city_count > DAY_TRIP_MAX_SELECTED_CITIES
        || query.consecutive_days_in_city < DAY_TRIP_MIN_CONSECUTIVE_DAYS
        || query.unused_location_count >= query.target_activities_per_day * 2
    {
        return None;
    }

    let chosen = day_trip_targets(query.current_city_key)
        .iter()
        .find(|t| is_viable(t.city_key))?;

    tracing::info!(
        base = %query.current_city_key,
        destination = %chosen.city_key,
        unused = query.unused_location_count,
        consecutive_days = query.consecutive_days_in_city,
        "Suggesting day trip"
    );

    Some(DayTripConfig {
        base_city: query.current_city_key.to_string(),
        target_city: chosen.city_key.to_string(),
        travel_minutes: chosen.travel_minutes,
    })
}
