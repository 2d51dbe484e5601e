use crate::error::Result;
use crate::models::{normalize_key, Coordinates, Location, LocationCategory};
use async_trait::async_trait;

/// Raw location fields from a database row, before validation
pub(super) struct RawLocationRow {
    pub id: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub category: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub neighborhood: Option<String>,
    pub duration_minutes: Option<i32>,
    pub estimated_duration: Option<String>,
    pub rating: Option<f32>,
    pub review_count: Option<i32>,
    pub price_level: Option<i16>,
    pub wheelchair_accessible: Option<bool>,
    pub good_for_children: Option<bool>,
    pub good_for_groups: Option<bool>,
    pub description: Option<String>,
}

impl RawLocationRow {
    /// Bad values become data gaps rather than errors
    pub fn into_location(self) -> Location {
        let category = self.category.parse().unwrap_or_else(|_| {
            tracing::warn!(
                id = %self.id,
                category = %self.category,
                "Unknown location category, defaulting to other"
            );
            LocationCategory::Other
        });

        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
                .map_err(|e| {
                    tracing::warn!(id = %self.id, error = %e, "Invalid coordinates, ignoring");
                })
                .ok(),
            _ => None,
        };

        let non_negative = |value: Option<i32>, field: &str| -> Option<u32> {
            value.and_then(|v| match u32::try_from(v) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(id = %self.id, field, value = v, "Negative value, ignoring");
                    None
                }
            })
        };
        let duration_minutes = non_negative(self.duration_minutes, "duration_minutes");
        let review_count = non_negative(self.review_count, "review_count");

        Location {
            id: self.id.clone(),
            name: self.name,
            city: self.city,
            region: self.region,
            category,
            coordinates,
            neighborhood: self.neighborhood,
            duration_minutes,
            estimated_duration: self.estimated_duration,
            rating: self.rating.map(|r| r.clamp(0.0, 5.0)),
            review_count,
            price_level: self.price_level.map(|p| p.clamp(0, 4) as u8),
            wheelchair_accessible: self.wheelchair_accessible,
            good_for_children: self.good_for_children,
            good_for_groups: self.good_for_groups,
            description: self.description,
        }
    }
}

/// Which locations a generation run needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    /// Normalized city keys; `None` fetches every city
    pub cities: Option<Vec<String>>,
}

impl LocationFilter {
    pub fn for_cities(cities: Vec<String>) -> Self {
        LocationFilter {
            cities: Some(cities),
        }
    }

    pub fn matches(&self, location: &Location) -> bool {
        match &self.cities {
            Some(cities) => {
                let key = normalize_key(&location.city);
                cities.iter().any(|c| *c == key)
            }
            None => true,
        }
    }
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Snapshot of matching locations in stable order
    async fn fetch_all_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgLocationRepository {
    pool: sqlx::PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, location: &Location) -> Result<()> {
        Ok(super::location_queries::insert_location(&self.pool, location).await?)
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn fetch_all_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>> {
        Ok(super::location_queries::fetch_locations(&self.pool, filter.cities.as_deref()).await?)
    }

    async fn count(&self) -> Result<i64> {
        Ok(super::location_queries::count_locations(&self.pool).await?)
    }
}

/// Fixed snapshot held in memory, for tests and offline evaluation
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocationRepository {
    locations: Vec<Location>,
}

impl InMemoryLocationRepository {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn fetch_all_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>> {
        Ok(self
            .locations
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.locations.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(category: &str) -> RawLocationRow {
        RawLocationRow {
            id: "loc-1".to_string(),
            name: "Fushimi Inari".to_string(),
            city: "Kyoto".to_string(),
            region: "kansai".to_string(),
            category: category.to_string(),
            lat: Some(34.9671),
            lng: Some(135.7727),
            neighborhood: None,
            duration_minutes: Some(-5),
            estimated_duration: Some("2 hours".to_string()),
            rating: Some(7.0),
            review_count: Some(120),
            price_level: Some(9),
            wheelchair_accessible: None,
            good_for_children: Some(true),
            good_for_groups: None,
            description: None,
        }
    }

    #[test]
    fn test_row_conversion_tolerates_bad_values() {
        let location = raw("shrine").into_location();
        assert_eq!(location.category, LocationCategory::Shrine);
        assert_eq!(location.duration_minutes, None);
        assert_eq!(location.visit_duration_minutes(), 120);
        assert_eq!(location.rating, Some(5.0));
        assert_eq!(location.price_level, Some(4));
        assert!(location.coordinates.is_some());

        let unknown = raw("spaceport").into_location();
        assert_eq!(unknown.category, LocationCategory::Other);
    }

    #[tokio::test]
    async fn test_in_memory_filter_uses_city_keys() {
        let repo = InMemoryLocationRepository::new(vec![
            Location::new("a", "A", "Kyoto", "kansai", LocationCategory::Temple),
            Location::new("b", "B", "Osaka", "kansai", LocationCategory::Castle),
        ]);

        let kyoto = repo
            .fetch_all_locations(&LocationFilter::for_cities(vec!["kyoto".to_string()]))
            .await
            .unwrap();
        assert_eq!(kyoto.len(), 1);
        assert_eq!(kyoto[0].id, "a");

        let all = repo.fetch_all_locations(&LocationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
