use crate::constants::DEFAULT_CITY_VALIDATION_RADIUS_KM;
use crate::models::region;
use crate::models::{Coordinates, Location};

/// Outcome of checking a location's coordinates against its claimed city
#[derive(Debug, Clone, PartialEq)]
pub enum GeoVerdict {
    Valid,
    /// No coordinates; a data gap, accepted
    MissingCoordinates,
    /// (0, 0) placeholder from a broken import
    NullIsland,
    OutsideCity { distance_km: f64 },
}

impl GeoVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, GeoVerdict::Valid | GeoVerdict::MissingCoordinates)
    }
}

/// Reference point and radius a city's locations must fall within
#[derive(Debug, Clone)]
pub struct CityGeoReference {
    pub city_key: String,
    /// `None` when neither the registry nor the data gives a center
    pub center: Option<Coordinates>,
    pub radius_km: f64,
}

impl CityGeoReference {
    /// Registry center and radius for known cities; otherwise the
    /// component-wise median of the city's own coordinates.
    pub fn for_city(city_key: &str, locations: &[&Location]) -> Self {
        if let Some(def) = region::find_city(city_key) {
            return CityGeoReference {
                city_key: city_key.to_string(),
                center: Some(def.center()),
                radius_km: def.radius_km,
            };
        }

        let points: Vec<Coordinates> = locations
            .iter()
            .filter_map(|l| l.coordinates)
            .filter(|c| !c.is_null_island())
            .collect();

        CityGeoReference {
            city_key: city_key.to_string(),
            center: Coordinates::median(&points),
            radius_km: DEFAULT_CITY_VALIDATION_RADIUS_KM,
        }
    }

    pub fn check(&self, location: &Location) -> GeoVerdict {
        let Some(coords) = location.coordinates else {
            return GeoVerdict::MissingCoordinates;
        };
        if coords.is_null_island() {
            return GeoVerdict::NullIsland;
        }
        match self.center {
            Some(center) => {
                let distance_km = center.distance_to(&coords);
                if distance_km <= self.radius_km {
                    GeoVerdict::Valid
                } else {
                    GeoVerdict::OutsideCity { distance_km }
                }
            }
            None => GeoVerdict::Valid,
        }
    }

    pub fn is_valid(&self, location: &Location) -> bool {
        let verdict = self.check(location);
        if !verdict.is_valid() {
            tracing::debug!(
                city = %self.city_key,
                id = %location.id,
                name = %location.name,
                verdict = ?verdict,
                "Rejecting location with coordinates inconsistent with its city"
            );
        }
        verdict.is_valid()
    }
}
