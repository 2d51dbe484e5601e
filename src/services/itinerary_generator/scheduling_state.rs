use crate::models::Location;
use std::collections::{HashMap, HashSet};

/// Mutable bookkeeping for one generation run. Owned by the generator;
/// the picker and scorer only read it.
#[derive(Debug, Default)]
pub struct SchedulingState {
    used_ids: HashSet<String>,
    used_names: HashSet<String>,
    day_trip_count: u32,
    /// Zone ids already given a day, per city
    used_zones: HashMap<String, HashSet<String>>,
}

impl SchedulingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the location, or another row with the same normalized name,
    /// is already in the itinerary
    pub fn is_used(&self, location: &Location) -> bool {
        self.used_ids.contains(&location.id) || self.used_names.contains(&location.normalized_name())
    }

    /// Record a location as scheduled. Returns `false` and leaves the state
    /// untouched when it would repeat an id or normalized name.
    pub fn commit(&mut self, location: &Location) -> bool {
        let name = location.normalized_name();
        if self.used_ids.contains(&location.id) || self.used_names.contains(&name) {
            tracing::warn!(
                id = %location.id,
                name = %location.name,
                "Duplicate location reached commit, skipping"
            );
            return false;
        }
        self.used_ids.insert(location.id.clone());
        if !name.is_empty() {
            self.used_names.insert(name);
        }
        true
    }

    pub fn day_trip_count(&self) -> u32 {
        self.day_trip_count
    }

    pub fn record_day_trip(&mut self) {
        self.day_trip_count += 1;
    }

    pub fn used_zones(&self, city_key: &str) -> HashSet<String> {
        self.used_zones.get(city_key).cloned().unwrap_or_default()
    }

    pub fn mark_zone_used(&mut self, city_key: &str, zone_id: &str) {
        self.used_zones
            .entry(city_key.to_string())
            .or_default()
            .insert(zone_id.to_string());
    }
}
