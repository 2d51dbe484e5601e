use crate::evaluation::EvalScenario;
use crate::models::region::find_city;
use crate::models::{Interest, Location, LocationCategory, Pace, TripBuilderData};

/// Non-food categories cycled through when synthesizing a city
const SYNTHETIC_CATEGORIES: [LocationCategory; 15] = [
    LocationCategory::Temple,
    LocationCategory::Museum,
    LocationCategory::Park,
    LocationCategory::Shrine,
    LocationCategory::Shopping,
    LocationCategory::Garden,
    LocationCategory::Castle,
    LocationCategory::Market,
    LocationCategory::Viewpoint,
    LocationCategory::Historic,
    LocationCategory::Entertainment,
    LocationCategory::Landmark,
    LocationCategory::Onsen,
    LocationCategory::Nature,
    LocationCategory::Culture,
];

/// Spacing of the synthetic grid in degrees (~450 m)
const GRID_STEP_DEG: f64 = 0.004;
const GRID_COLUMNS: usize = 6;

/// Deterministic pool for one city: `count` sights on a grid around the
/// registry centre plus one food stop per five sights. Unregistered cities
/// get no coordinates.
pub fn synthetic_city_pool(city_key: &str, count: usize) -> Vec<Location> {
    let city = find_city(city_key);
    let label = city.map(|c| c.label).unwrap_or(city_key);
    let region = city.map(|c| c.region).unwrap_or("");
    let half = (GRID_COLUMNS as f64 - 1.0) / 2.0;

    let place = |i: usize, category: LocationCategory, id: String, name: String| {
        let mut location = Location::new(id, name, label, region, category)
            .with_rating(3.4 + ((i * 7) % 16) as f32 / 10.0);
        location.review_count = Some(((i * 37) % 400) as u32 + 5);
        location.price_level = Some((i % 4) as u8);
        location.neighborhood = Some(format!("{} ward {}", label, i / GRID_COLUMNS + 1));
        if let Some(city) = city {
            let row = (i / GRID_COLUMNS) as f64;
            let col = (i % GRID_COLUMNS) as f64 - half;
            location = location.with_coordinates(
                city.lat + (row - 1.0) * GRID_STEP_DEG,
                city.lng + col * GRID_STEP_DEG,
            );
        }
        location
    };

    let mut pool: Vec<Location> = (0..count)
        .map(|i| {
            let category = SYNTHETIC_CATEGORIES[i % SYNTHETIC_CATEGORIES.len()];
            place(
                i,
                category,
                format!("{}-{}", city_key, i + 1),
                format!("{} {} {}", label, category, i + 1),
            )
        })
        .collect();

    let food = [
        LocationCategory::Restaurant,
        LocationCategory::Cafe,
        LocationCategory::Bar,
    ];
    for j in 0..count / 5 {
        let category = food[j % food.len()];
        pool.push(place(
            j,
            category,
            format!("{}-food-{}", city_key, j + 1),
            format!("{} {} {}", label, category, j + 1),
        ));
    }
    pool
}

fn pools(cities: &[(&str, usize)]) -> Vec<Location> {
    cities
        .iter()
        .flat_map(|(city, count)| synthetic_city_pool(city, *count))
        .collect()
}

fn trip(cities: &[&str], duration: i32, pace: Pace, interests: &[Interest]) -> TripBuilderData {
    TripBuilderData {
        duration: Some(duration),
        cities: cities.iter().map(|c| c.to_string()).collect(),
        style: Some(pace),
        interests: interests.to_vec(),
        ..Default::default()
    }
}

/// Default evaluation scenarios covering the planner's main situations
pub fn default_scenarios() -> Vec<EvalScenario> {
    let culture = [Interest::Culture, Interest::Nature, Interest::Shopping];

    let mut saved_trip = trip(&["kyoto"], 3, Pace::Balanced, &culture);
    saved_trip.saved_ids = vec!["kyoto-food-1".to_string(), "kyoto-12".to_string()];
    saved_trip.content_location_ids = vec!["kyoto-5".to_string(), "kyoto-9".to_string()];

    let mut region_trip = trip(&[], 5, Pace::Balanced, &culture);
    region_trip.regions = vec!["kansai".to_string()];

    vec![
        // --- Small selection, thin pool: day trips expected ---
        EvalScenario {
            name: "kyoto_only_10_days".to_string(),
            trip: trip(&["kyoto"], 10, Pace::Balanced, &culture),
            locations: pools(&[("kyoto", 15), ("nara", 12), ("osaka", 12)]),
        },
        // --- Multi-city classic route ---
        EvalScenario {
            name: "golden_route_7_days".to_string(),
            trip: trip(
                &["tokyo", "kyoto", "osaka"],
                7,
                Pace::Balanced,
                &[Interest::Culture, Interest::Food, Interest::Nature],
            ),
            locations: pools(&[("tokyo", 30), ("kyoto", 30), ("osaka", 30)]),
        },
        // --- Region-only request ---
        EvalScenario {
            name: "kansai_region_5_days".to_string(),
            trip: region_trip,
            locations: pools(&[("kyoto", 25), ("osaka", 20)]),
        },
        // --- Pace comparison on the same pool ---
        EvalScenario {
            name: "kyoto_relaxed_4_days".to_string(),
            trip: trip(&["kyoto"], 4, Pace::Relaxed, &culture),
            locations: pools(&[("kyoto", 40)]),
        },
        EvalScenario {
            name: "kyoto_fast_4_days".to_string(),
            trip: trip(&["kyoto"], 4, Pace::Fast, &culture),
            locations: pools(&[("kyoto", 40)]),
        },
        // --- Saved and featured places ---
        EvalScenario {
            name: "kyoto_saved_featured_3_days".to_string(),
            trip: saved_trip,
            locations: pools(&[("kyoto", 30)]),
        },
        // --- City with no data at all ---
        EvalScenario {
            name: "sendai_no_data_2_days".to_string(),
            trip: trip(&["sendai"], 2, Pace::Balanced, &culture),
            locations: pools(&[("kyoto", 10)]),
        },
    ]
}
