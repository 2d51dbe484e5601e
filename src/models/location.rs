use crate::constants::DEFAULT_VISIT_MINUTES;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    // Religious / historic
    Shrine,
    Temple,
    Castle,
    Historic,
    Landmark,

    // Culture
    Museum,
    Culture,

    // Outdoors
    Park,
    Garden,
    Nature,
    Viewpoint,

    // Urban
    Market,
    Shopping,
    Entertainment,
    Onsen,

    // Food
    Restaurant,
    Cafe,
    Bar,

    Other,
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationCategory::Shrine => "shrine",
            LocationCategory::Temple => "temple",
            LocationCategory::Castle => "castle",
            LocationCategory::Historic => "historic",
            LocationCategory::Landmark => "landmark",
            LocationCategory::Museum => "museum",
            LocationCategory::Culture => "culture",
            LocationCategory::Park => "park",
            LocationCategory::Garden => "garden",
            LocationCategory::Nature => "nature",
            LocationCategory::Viewpoint => "viewpoint",
            LocationCategory::Market => "market",
            LocationCategory::Shopping => "shopping",
            LocationCategory::Entertainment => "entertainment",
            LocationCategory::Onsen => "onsen",
            LocationCategory::Restaurant => "restaurant",
            LocationCategory::Cafe => "cafe",
            LocationCategory::Bar => "bar",
            LocationCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LocationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shrine" => Ok(LocationCategory::Shrine),
            "temple" => Ok(LocationCategory::Temple),
            "castle" => Ok(LocationCategory::Castle),
            "historic" | "historical" | "history" => Ok(LocationCategory::Historic),
            "landmark" => Ok(LocationCategory::Landmark),
            "museum" => Ok(LocationCategory::Museum),
            "culture" | "cultural" => Ok(LocationCategory::Culture),
            "park" => Ok(LocationCategory::Park),
            "garden" => Ok(LocationCategory::Garden),
            "nature" => Ok(LocationCategory::Nature),
            "viewpoint" => Ok(LocationCategory::Viewpoint),
            "market" => Ok(LocationCategory::Market),
            "shopping" | "shop" => Ok(LocationCategory::Shopping),
            "entertainment" => Ok(LocationCategory::Entertainment),
            "onsen" => Ok(LocationCategory::Onsen),
            "restaurant" | "food" => Ok(LocationCategory::Restaurant),
            "cafe" | "café" => Ok(LocationCategory::Cafe),
            "bar" => Ok(LocationCategory::Bar),
            "other" => Ok(LocationCategory::Other),
            _ => Err(format!("Invalid location category: {}", s)),
        }
    }
}

impl LocationCategory {
    /// Food stops are scheduled by a separate recommendation pass, not the
    /// main slot filler.
    pub fn is_food(&self) -> bool {
        matches!(
            self,
            LocationCategory::Restaurant | LocationCategory::Cafe | LocationCategory::Bar
        )
    }

    /// Mostly experienced outside; sensitive to rain and heat.
    pub fn is_outdoor(&self) -> bool {
        matches!(
            self,
            LocationCategory::Shrine
                | LocationCategory::Park
                | LocationCategory::Garden
                | LocationCategory::Nature
                | LocationCategory::Viewpoint
                | LocationCategory::Market
                | LocationCategory::Castle
        )
    }

    pub fn default_duration_minutes(&self) -> u32 {
        match self {
            LocationCategory::Shrine => 60,
            LocationCategory::Temple => 75,
            LocationCategory::Castle => 120,
            LocationCategory::Historic => 75,
            LocationCategory::Landmark => 60,
            LocationCategory::Museum => 120,
            LocationCategory::Culture => 90,
            LocationCategory::Park => 90,
            LocationCategory::Garden => 75,
            LocationCategory::Nature => 150,
            LocationCategory::Viewpoint => 45,
            LocationCategory::Market => 90,
            LocationCategory::Shopping => 120,
            LocationCategory::Entertainment => 120,
            LocationCategory::Onsen => 120,
            LocationCategory::Restaurant => 75,
            LocationCategory::Cafe => 45,
            LocationCategory::Bar => 90,
            LocationCategory::Other => DEFAULT_VISIT_MINUTES,
        }
    }
}

/// A visitable place. Read-only snapshot for the duration of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub category: LocationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Structured visit duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Free-text duration such as "1-2 hours"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    /// Average rating, 0-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    /// 0 (free) to 4 (luxury)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheelchair_accessible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_for_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_for_groups: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
        category: LocationCategory,
    ) -> Self {
        Location {
            id: id.into(),
            name: name.into(),
            city: city.into(),
            region: region.into(),
            category,
            coordinates: None,
            neighborhood: None,
            duration_minutes: None,
            estimated_duration: None,
            rating: None,
            review_count: None,
            price_level: None,
            wheelchair_accessible: None,
            good_for_children: None,
            good_for_groups: None,
            description: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Coordinates::new(lat, lng).ok();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating.clamp(0.0, 5.0));
        self
    }

    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn is_food(&self) -> bool {
        self.category.is_food()
    }

    /// Visit duration: structured minutes, then the free-text estimate,
    /// then the category default.
    pub fn visit_duration_minutes(&self) -> u32 {
        self.duration_minutes
            .filter(|&m| m > 0)
            .or_else(|| {
                self.estimated_duration
                    .as_deref()
                    .and_then(parse_duration_text)
            })
            .unwrap_or_else(|| self.category.default_duration_minutes())
    }

    /// Key under which two rows describing the same real-world place collide
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lowercase, keep letters and digits only. "Kinkaku-ji" and "Kinkakuji" collide.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Parse free-text durations like "2 hours", "1-2 hours", "45 min",
/// "1.5 hrs", "half day" into minutes. Ranges resolve to their midpoint.
pub fn parse_duration_text(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if lower.contains("full day") || lower.contains("all day") {
        return Some(420);
    }
    if lower.contains("half day") || lower.contains("half-day") {
        return Some(240);
    }

    let numbers: Vec<f64> = lower
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|s| !s.is_empty() && *s != ".")
        .filter_map(|s| s.parse::<f64>().ok())
        .take(2)
        .collect();

    let value = match numbers.as_slice() {
        [single] => *single,
        [low, high] => (low + high) / 2.0,
        _ => return None,
    };

    let minutes = if lower.contains("min") {
        value
    } else if lower.contains("hour") || lower.contains("hr") || lower.contains('h') {
        value * 60.0
    } else {
        return None;
    };

    let minutes = minutes.round();
    if minutes <= 0.0 || minutes > 24.0 * 60.0 {
        return None;
    }
    Some(minutes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("shrine".parse::<LocationCategory>().unwrap(), LocationCategory::Shrine);
        assert_eq!("MUSEUM".parse::<LocationCategory>().unwrap(), LocationCategory::Museum);
        assert_eq!("café".parse::<LocationCategory>().unwrap(), LocationCategory::Cafe);
        assert!("spaceport".parse::<LocationCategory>().is_err());
    }

    #[test]
    fn test_category_display_round_trips_through_parse() {
        let category = LocationCategory::Entertainment;
        assert_eq!(category.to_string().parse::<LocationCategory>().unwrap(), category);
    }

    #[test]
    fn test_food_categories() {
        assert!(LocationCategory::Restaurant.is_food());
        assert!(LocationCategory::Cafe.is_food());
        assert!(LocationCategory::Bar.is_food());
        assert!(!LocationCategory::Market.is_food());
        assert!(!LocationCategory::Shrine.is_food());
    }

    #[test]
    fn test_parse_duration_text() {
        assert_eq!(parse_duration_text("2 hours"), Some(120));
        assert_eq!(parse_duration_text("1-2 hours"), Some(90));
        assert_eq!(parse_duration_text("45 min"), Some(45));
        assert_eq!(parse_duration_text("1.5 hrs"), Some(90));
        assert_eq!(parse_duration_text("Half day"), Some(240));
        assert_eq!(parse_duration_text("full day"), Some(420));
        assert_eq!(parse_duration_text("a while"), None);
        assert_eq!(parse_duration_text("30"), None);
        assert_eq!(parse_duration_text(""), None);
    }

    #[test]
    fn test_visit_duration_fallback_chain() {
        let mut location = Location::new("a", "A", "kyoto", "kansai", LocationCategory::Museum);
        assert_eq!(location.visit_duration_minutes(), 120); // category default

        location.estimated_duration = Some("1 hour".to_string());
        assert_eq!(location.visit_duration_minutes(), 60);

        location.duration_minutes = Some(40);
        assert_eq!(location.visit_duration_minutes(), 40);

        location.duration_minutes = Some(0); // unusable, falls through
        assert_eq!(location.visit_duration_minutes(), 60);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Kinkaku-ji"), "kinkakuji");
        assert_eq!(normalize_name("  Kinkakuji "), "kinkakuji");
        assert_eq!(normalize_name("Fushimi Inari Taisha"), "fushimiinaritaisha");
        assert_eq!(normalize_name("伏見稲荷大社"), "伏見稲荷大社");
    }
}
