//! Stable engine-wide constants.
//!
//! Values here are structural invariants of the scheduling algorithm and
//! default fallbacks for env-var-based configuration. They should rarely
//! change. For scoring weights and other tuning knobs see
//! [`GeneratorConfig`](crate::config::GeneratorConfig) instead.

// --- Trip length ---

/// Number of days planned when the trip carries no usable duration or dates.
pub const DEFAULT_TOTAL_DAYS: u32 = 7;

// --- Slot filling ---

/// Non-first activities may overrun the remaining slot budget by this factor.
pub const SLOT_OVERRUN_FACTOR: f64 = 1.1;
/// A slot stops filling after this many picker failures in a row.
pub const MAX_CONSECUTIVE_PICK_FAILURES: u32 = 3;
/// A slot with at least one activity stops once remaining time drops below
/// this fraction of its budget.
pub const SLOT_MIN_REMAINING_RATIO: f64 = 0.2;
/// Saved locations overflow to the least-loaded slot when placing them would
/// push the preferred slot beyond this fraction of its budget.
pub const SAVED_SLOT_OVERFLOW_RATIO: f64 = 0.8;

// --- Day trips ---

/// Absolute ceiling on day trips in one itinerary.
pub const MAX_DAY_TRIPS: u32 = 4;
/// One day trip is allowed per this many trip days (rounded up).
pub const DAYS_PER_DAY_TRIP: u32 = 4;
/// Day trips are only considered when the trip selects at most this many cities.
pub const DAY_TRIP_MAX_SELECTED_CITIES: usize = 2;
/// Minimum consecutive days in a city before a day trip is considered.
pub const DAY_TRIP_MIN_CONSECUTIVE_DAYS: u32 = 2;
/// A day-trip target needs at least this many unused locations.
pub const DAY_TRIP_MIN_TARGET_LOCATIONS: usize = 3;
/// Slot budgets shortened by day-trip travel never drop below this (minutes).
pub const DAY_TRIP_MIN_SLOT_MINUTES: u32 = 60;

// --- Zones ---

/// A zone needs this many locations to be used as a primary filter.
pub const MIN_ZONE_SIZE: usize = 3;
/// Cities with fewer coordinate-bearing locations are not clustered.
pub const MIN_LOCATIONS_FOR_ZONES: usize = 6;
/// Default walkable grid cell edge (km).
pub const DEFAULT_ZONE_CELL_SIZE_KM: f64 = 1.5;

// --- Geo validation ---

/// Default radius (km) around a city's reference point for unregistered cities.
pub const DEFAULT_CITY_VALIDATION_RADIUS_KM: f64 = 40.0;

// --- Scoring ---

/// Contribution of a factor whose underlying data is unknown.
pub const NEUTRAL_FACTOR_SCORE: f32 = 0.5;
/// Daily high (°C) above which outdoor categories are penalized.
pub const HOT_DAY_THRESHOLD_C: f32 = 32.0;
/// Precipitation probability (%) from which a day counts as wet.
pub const WET_DAY_PRECIPITATION_PCT: u8 = 60;

// --- Durations ---

/// Visit duration (minutes) used when nothing else is known.
pub const DEFAULT_VISIT_MINUTES: u32 = 90;

// --- Weather client defaults (used when env vars are absent) ---

/// Default forecast API base URL. Overridden by `WEATHER_API_BASE_URL`.
pub const DEFAULT_WEATHER_API_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
/// Default request timeout. Overridden by `WEATHER_TIMEOUT_SECS`.
pub const DEFAULT_WEATHER_TIMEOUT_SECONDS: u64 = 10;
/// Default forecast cache TTL: 3 hours. Overridden by `WEATHER_CACHE_TTL`.
pub const DEFAULT_WEATHER_CACHE_TTL_SECONDS: u64 = 10_800;
/// Default forecast cache capacity. Overridden by `WEATHER_CACHE_MAX_ENTRIES`.
pub const DEFAULT_WEATHER_CACHE_MAX_ENTRIES: u64 = 500;
