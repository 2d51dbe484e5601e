use crate::models::Location;
use sqlx::PgPool;

use super::location_repository::RawLocationRow;

/// Same normalization as `normalize_key`, in SQL. Must match the
/// `idx_locations_city_key` expression.
const CITY_KEY_SQL: &str = "regexp_replace(regexp_replace(lower(city), \
    '^[[:space:]_]+|[[:space:]_]+$', '', 'g'), '[[:space:]_]+', '-', 'g')";

const LOCATION_COLUMNS: &str = "id, name, city, region, category, lat, lng, neighborhood,
    duration_minutes, estimated_duration, rating, review_count, price_level,
    wheelchair_accessible, good_for_children, good_for_groups, description";

/// All locations, optionally restricted to the given city keys, in stable
/// insertion order
pub async fn fetch_locations(
    pool: &PgPool,
    city_keys: Option<&[String]>,
) -> Result<Vec<Location>, sqlx::Error> {
    let rows = match city_keys {
        Some(keys) => {
            let sql = format!(
                "SELECT {LOCATION_COLUMNS}
                 FROM locations
                 WHERE {CITY_KEY_SQL} = ANY($1)
                 ORDER BY created_at, id"
            );
            sqlx::query_as::<_, LocationRow>(&sql)
                .bind(keys)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {LOCATION_COLUMNS}
                 FROM locations
                 ORDER BY created_at, id"
            );
            sqlx::query_as::<_, LocationRow>(&sql)
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(|row| row.into_raw().into_location())
        .collect())
}

pub async fn insert_location(pool: &PgPool, location: &Location) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO locations (id, name, city, region, category, lat, lng, neighborhood,
            duration_minutes, estimated_duration, rating, review_count, price_level,
            wheelchair_accessible, good_for_children, good_for_groups, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(&location.id)
    .bind(&location.name)
    .bind(&location.city)
    .bind(&location.region)
    .bind(location.category.to_string())
    .bind(location.coordinates.map(|c| c.lat))
    .bind(location.coordinates.map(|c| c.lng))
    .bind(&location.neighborhood)
    .bind(location.duration_minutes.map(|d| d as i32))
    .bind(&location.estimated_duration)
    .bind(location.rating)
    .bind(location.review_count.map(|c| c as i32))
    .bind(location.price_level.map(i16::from))
    .bind(location.wheelchair_accessible)
    .bind(location.good_for_children)
    .bind(location.good_for_groups)
    .bind(&location.description)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count_locations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM locations")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: String,
    name: String,
    city: String,
    region: String,
    category: String,
    lat: Option<f64>,
    lng: Option<f64>,
    neighborhood: Option<String>,
    duration_minutes: Option<i32>,
    estimated_duration: Option<String>,
    rating: Option<f32>,
    review_count: Option<i32>,
    price_level: Option<i16>,
    wheelchair_accessible: Option<bool>,
    good_for_children: Option<bool>,
    good_for_groups: Option<bool>,
    description: Option<String>,
}

impl LocationRow {
    fn into_raw(self) -> RawLocationRow {
        RawLocationRow {
            id: self.id,
            name: self.name,
            city: self.city,
            region: self.region,
            category: self.category,
            lat: self.lat,
            lng: self.lng,
            neighborhood: self.neighborhood,
            duration_minutes: self.duration_minutes,
            estimated_duration: self.estimated_duration,
            rating: self.rating,
            review_count: self.review_count,
            price_level: self.price_level,
            wheelchair_accessible: self.wheelchair_accessible,
            good_for_children: self.good_for_children,
            good_for_groups: self.good_for_groups,
            description: self.description,
        }
    }
}
