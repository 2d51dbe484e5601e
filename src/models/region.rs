use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// A city in the static registry
#[derive(Debug, Clone, Copy)]
pub struct CityDef {
    pub key: &'static str,
    pub label: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lng: f64,
    /// Radius (km) around the center within which a location plausibly belongs to the city
    pub radius_km: f64,
}

impl CityDef {
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A region and its cities in recommendation order
#[derive(Debug, Clone, Copy)]
pub struct RegionDef {
    pub key: &'static str,
    pub label: &'static str,
    pub cities: &'static [&'static str],
}

pub const CITIES: &[CityDef] = &[
    CityDef { key: "tokyo", label: "Tokyo", region: "kanto", lat: 35.6762, lng: 139.6503, radius_km: 45.0 },
    CityDef { key: "yokohama", label: "Yokohama", region: "kanto", lat: 35.4437, lng: 139.6380, radius_km: 25.0 },
    CityDef { key: "kamakura", label: "Kamakura", region: "kanto", lat: 35.3192, lng: 139.5467, radius_km: 12.0 },
    CityDef { key: "nikko", label: "Nikko", region: "kanto", lat: 36.7199, lng: 139.6982, radius_km: 30.0 },
    CityDef { key: "hakone", label: "Hakone", region: "kanto", lat: 35.2324, lng: 139.1069, radius_km: 20.0 },
    CityDef { key: "kyoto", label: "Kyoto", region: "kansai", lat: 35.0116, lng: 135.7681, radius_km: 25.0 },
    CityDef { key: "osaka", label: "Osaka", region: "kansai", lat: 34.6937, lng: 135.5023, radius_km: 25.0 },
    CityDef { key: "nara", label: "Nara", region: "kansai", lat: 34.6851, lng: 135.8048, radius_km: 20.0 },
    CityDef { key: "kobe", label: "Kobe", region: "kansai", lat: 34.6901, lng: 135.1956, radius_km: 20.0 },
    CityDef { key: "himeji", label: "Himeji", region: "kansai", lat: 34.8151, lng: 134.6854, radius_km: 15.0 },
    CityDef { key: "kanazawa", label: "Kanazawa", region: "chubu", lat: 36.5613, lng: 136.6562, radius_km: 20.0 },
    CityDef { key: "takayama", label: "Takayama", region: "chubu", lat: 36.1461, lng: 137.2522, radius_km: 20.0 },
    CityDef { key: "nagoya", label: "Nagoya", region: "chubu", lat: 35.1815, lng: 136.9066, radius_km: 25.0 },
    CityDef { key: "hiroshima", label: "Hiroshima", region: "chugoku", lat: 34.3853, lng: 132.4553, radius_km: 25.0 },
    CityDef { key: "miyajima", label: "Miyajima", region: "chugoku", lat: 34.2960, lng: 132.3198, radius_km: 10.0 },
    CityDef { key: "okayama", label: "Okayama", region: "chugoku", lat: 34.6551, lng: 133.9195, radius_km: 20.0 },
    CityDef { key: "fukuoka", label: "Fukuoka", region: "kyushu", lat: 33.5902, lng: 130.4017, radius_km: 25.0 },
    CityDef { key: "nagasaki", label: "Nagasaki", region: "kyushu", lat: 32.7503, lng: 129.8777, radius_km: 20.0 },
    CityDef { key: "sapporo", label: "Sapporo", region: "hokkaido", lat: 43.0618, lng: 141.3545, radius_km: 30.0 },
    CityDef { key: "otaru", label: "Otaru", region: "hokkaido", lat: 43.1907, lng: 140.9947, radius_km: 15.0 },
    CityDef { key: "sendai", label: "Sendai", region: "tohoku", lat: 38.2682, lng: 140.8694, radius_km: 25.0 },
];

pub const REGIONS: &[RegionDef] = &[
    RegionDef { key: "kanto", label: "Kanto", cities: &["tokyo", "yokohama", "kamakura", "nikko", "hakone"] },
    RegionDef { key: "kansai", label: "Kansai", cities: &["kyoto", "osaka", "nara", "kobe", "himeji"] },
    RegionDef { key: "chubu", label: "Chubu", cities: &["kanazawa", "takayama", "nagoya"] },
    RegionDef { key: "chugoku", label: "Chugoku", cities: &["hiroshima", "miyajima", "okayama"] },
    RegionDef { key: "kyushu", label: "Kyushu", cities: &["fukuoka", "nagasaki"] },
    RegionDef { key: "hokkaido", label: "Hokkaido", cities: &["sapporo", "otaru"] },
    RegionDef { key: "tohoku", label: "Tohoku", cities: &["sendai"] },
];

/// Cities tried, in order, when the trip names neither cities nor regions
pub const DEFAULT_CITY_ROTATION: &[&str] = &["tokyo", "kyoto", "osaka"];

/// Normalize a free-form city or region identifier: "Kyoto " / "KYOTO" -> "kyoto"
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn find_city(key: &str) -> Option<&'static CityDef> {
    CITIES.iter().find(|c| c.key == key)
}

pub fn find_region(key: &str) -> Option<&'static RegionDef> {
    REGIONS.iter().find(|r| r.key == key)
}

/// A resolved city the itinerary visits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityInfo {
    /// `None` only for the synthetic country-wide placeholder
    pub id: Option<String>,
    pub key: String,
    pub label: String,
    pub region: Option<String>,
}

impl CityInfo {
    pub fn new(key: impl Into<String>, label: impl Into<String>, region: Option<String>) -> Self {
        let key = key.into();
        CityInfo {
            id: Some(key.clone()),
            key,
            label: label.into(),
            region,
        }
    }

    /// Last-resort placeholder when nothing else resolves
    pub fn placeholder() -> Self {
        CityInfo {
            id: None,
            key: "japan".to_string(),
            label: "Japan".to_string(),
            region: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Kyoto "), "kyoto");
        assert_eq!(normalize_key("KYOTO"), "kyoto");
        assert_eq!(normalize_key("new_york city"), "new-york-city");
        assert_eq!(normalize_key("_Kyoto_ "), "kyoto");
    }

    #[test]
    fn test_registry_is_consistent() {
        for region in REGIONS {
            for city in region.cities {
                let def = find_city(city).unwrap_or_else(|| panic!("{city} missing"));
                assert_eq!(def.region, region.key);
            }
        }
        for city in CITIES {
            assert!(find_region(city.region).is_some(), "{} has no region", city.key);
        }
        for city in DEFAULT_CITY_ROTATION {
            assert!(find_city(city).is_some());
        }
    }

    #[test]
    fn test_placeholder_has_no_id() {
        let placeholder = CityInfo::placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.label, "Japan");
        assert!(!CityInfo::new("kyoto", "Kyoto", None).is_placeholder());
    }
}
