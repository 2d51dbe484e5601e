use crate::models::region;
use crate::models::{normalize_key, CityInfo, Location};
use std::collections::HashMap;

/// Per-run lookup tables over a location snapshot and the static city/region
/// registry. Built once per generation call; never mutated afterwards.
#[derive(Debug, Default)]
pub struct LocationIndex {
    locations: Vec<Location>,
    by_id: HashMap<String, usize>,
    by_city: HashMap<String, Vec<usize>>,
    /// City keys in first-seen order
    city_order: Vec<String>,
    /// Observed label and region for cities missing from the registry
    observed: HashMap<String, (String, String)>,
}

impl LocationIndex {
    pub fn new(locations: Vec<Location>) -> Self {
        let mut index = LocationIndex::default();

        for location in locations {
            if index.by_id.contains_key(&location.id) {
                tracing::warn!(
                    id = %location.id,
                    name = %location.name,
                    "Duplicate location id in snapshot, keeping first row"
                );
                continue;
            }

            let city_key = normalize_key(&location.city);
            if city_key.is_empty() {
                tracing::debug!(id = %location.id, "Location has no city, not indexed by city");
            } else {
                if !index.by_city.contains_key(&city_key) {
                    index.city_order.push(city_key.clone());
                    index.observed.insert(
                        city_key.clone(),
                        (location.city.trim().to_string(), normalize_key(&location.region)),
                    );
                }
                index
                    .by_city
                    .entry(city_key)
                    .or_default()
                    .push(index.locations.len());
            }

            index
                .by_id
                .insert(location.id.clone(), index.locations.len());
            index.locations.push(location);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.by_id.get(id).map(|&i| &self.locations[i])
    }

    /// Locations of a city in snapshot order
    pub fn locations_in(&self, city_key: &str) -> Vec<&Location> {
        self.by_city
            .get(city_key)
            .map(|indices| indices.iter().map(|&i| &self.locations[i]).collect())
            .unwrap_or_default()
    }

    pub fn location_count(&self, city_key: &str) -> usize {
        self.by_city.get(city_key).map_or(0, Vec::len)
    }

    pub fn has_locations(&self, city_key: &str) -> bool {
        self.location_count(city_key) > 0
    }

    /// First city appearing in the snapshot
    pub fn first_city(&self) -> Option<&str> {
        self.city_order.first().map(String::as_str)
    }

    pub fn region_of(&self, city_key: &str) -> Option<String> {
        if let Some(def) = region::find_city(city_key) {
            return Some(def.region.to_string());
        }
        self.observed
            .get(city_key)
            .map(|(_, region)| region.clone())
            .filter(|r| !r.is_empty())
    }

    /// Resolve a city from the registry, then from observed locations
    pub fn city_info(&self, city_key: &str) -> Option<CityInfo> {
        if let Some(def) = region::find_city(city_key) {
            return Some(CityInfo::new(
                def.key,
                def.label,
                Some(def.region.to_string()),
            ));
        }
        self.observed.get(city_key).map(|(label, _)| {
            CityInfo::new(city_key, label.clone(), self.region_of(city_key))
        })
    }

    /// Cities of a region: registry order first, then cities only seen in
    /// the snapshot in first-seen order
    pub fn cities_in_region(&self, region_key: &str) -> Vec<String> {
        let mut cities: Vec<String> = region::find_region(region_key)
            .map(|r| r.cities.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        for city in &self.city_order {
            if cities.contains(city) || region::find_city(city).is_some() {
                continue;
            }
            if self.region_of(city).as_deref() == Some(region_key) {
                cities.push(city.clone());
            }
        }
        cities
    }

    /// First city of the region that has indexed locations
    pub fn first_city_with_locations_in_region(&self, region_key: &str) -> Option<String> {
        self.cities_in_region(region_key)
            .into_iter()
            .find(|c| self.has_locations(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationCategory;

    fn snapshot() -> Vec<Location> {
        vec![
            Location::new("k1", "Kinkaku-ji", "Kyoto", "Kansai", LocationCategory::Temple),
            Location::new("o1", "Osaka Castle", "osaka", "kansai", LocationCategory::Castle),
            Location::new("k2", "Nishiki Market", "kyoto", "kansai", LocationCategory::Market),
            Location::new("u1", "Uji Bridge", "Uji", "Kansai", LocationCategory::Landmark),
            Location::new("k1", "Duplicate", "kyoto", "kansai", LocationCategory::Park),
        ]
    }

    #[test]
    fn test_groups_by_normalized_city_in_input_order() {
        let index = LocationIndex::new(snapshot());
        assert_eq!(index.len(), 4);
        let kyoto: Vec<&str> = index.locations_in("kyoto").iter().map(|l| l.id.as_str()).collect();
        assert_eq!(kyoto, vec!["k1", "k2"]);
        assert_eq!(index.first_city(), Some("kyoto"));
        assert_eq!(index.get("k1").map(|l| l.name.as_str()), Some("Kinkaku-ji"));
        assert!(index.locations_in("nara").is_empty());
    }

    #[test]
    fn test_city_info_prefers_registry() {
        let index = LocationIndex::new(snapshot());
        let kyoto = index.city_info("kyoto").unwrap();
        assert_eq!(kyoto.label, "Kyoto");
        assert_eq!(kyoto.region.as_deref(), Some("kansai"));

        let uji = index.city_info("uji").unwrap();
        assert_eq!(uji.label, "Uji");
        assert_eq!(uji.region.as_deref(), Some("kansai"));

        assert!(index.city_info("atlantis").is_none());
        assert!(index.city_info("nara").is_some());
    }

    #[test]
    fn test_cities_in_region_appends_observed_cities() {
        let index = LocationIndex::new(snapshot());
        let cities = index.cities_in_region("kansai");
        assert_eq!(&cities[..5], &["kyoto", "osaka", "nara", "kobe", "himeji"]);
        assert_eq!(cities.last().map(String::as_str), Some("uji"));
        assert_eq!(
            index.first_city_with_locations_in_region("kansai").as_deref(),
            Some("kyoto")
        );
        assert_eq!(index.first_city_with_locations_in_region("kanto"), None);
    }
}
