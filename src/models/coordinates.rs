use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometres per degree of latitude
pub const KM_PER_DEGREE_LAT: f64 = 111.32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Placeholder coordinates written by broken imports
    pub fn is_null_island(&self) -> bool {
        self.lat.abs() < 1e-6 && self.lng.abs() < 1e-6
    }

    /// Arithmetic centroid of a set of points (fine for city-scale spreads)
    pub fn centroid(points: &[Coordinates]) -> Option<Coordinates> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
        let lng = points.iter().map(|p| p.lng).sum::<f64>() / n;
        Some(Coordinates { lat, lng })
    }

    /// Component-wise median. Robust to a few corrupted outliers.
    pub fn median(points: &[Coordinates]) -> Option<Coordinates> {
        if points.is_empty() {
            return None;
        }
        let mut lats: Vec<f64> = points.iter().map(|p| p.lat).collect();
        let mut lngs: Vec<f64> = points.iter().map(|p| p.lng).collect();
        lats.sort_by(|a, b| a.total_cmp(b));
        lngs.sort_by(|a, b| a.total_cmp(b));
        let mid = points.len() / 2;
        Some(Coordinates {
            lat: lats[mid],
            lng: lngs[mid],
        })
    }
}
