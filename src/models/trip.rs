use crate::models::LocationCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use time::Date;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Culture,
    History,
    Nature,
    Food,
    Shopping,
    Nightlife,
    Art,
    Photography,
    Wellness,
}

impl Interest {
    /// Categories that satisfy this interest
    pub fn categories(&self) -> &'static [LocationCategory] {
        use LocationCategory::*;
        match self {
            Interest::Culture => &[Temple, Shrine, Museum, Culture, Historic, Castle],
            Interest::History => &[Historic, Castle, Temple, Shrine, Museum, Landmark],
            Interest::Nature => &[Park, Garden, Nature, Viewpoint],
            Interest::Food => &[Market, Restaurant, Cafe, Bar],
            Interest::Shopping => &[Shopping, Market],
            Interest::Nightlife => &[Entertainment, Bar, Viewpoint],
            Interest::Art => &[Museum, Culture, Garden],
            Interest::Photography => &[Viewpoint, Garden, Shrine, Landmark, Nature],
            Interest::Wellness => &[Onsen, Garden, Park, Nature],
        }
    }

    pub fn matches(&self, category: LocationCategory) -> bool {
        self.categories().contains(&category)
    }

    /// Interests used when the traveller gives none
    pub fn defaults() -> Vec<Interest> {
        vec![Interest::Culture, Interest::Nature, Interest::Food]
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interest::Culture => "culture",
            Interest::History => "history",
            Interest::Nature => "nature",
            Interest::Food => "food",
            Interest::Shopping => "shopping",
            Interest::Nightlife => "nightlife",
            Interest::Art => "art",
            Interest::Photography => "photography",
            Interest::Wellness => "wellness",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Interest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "culture" => Ok(Interest::Culture),
            "history" => Ok(Interest::History),
            "nature" => Ok(Interest::Nature),
            "food" => Ok(Interest::Food),
            "shopping" => Ok(Interest::Shopping),
            "nightlife" => Ok(Interest::Nightlife),
            "art" => Ok(Interest::Art),
            "photography" => Ok(Interest::Photography),
            "wellness" => Ok(Interest::Wellness),
            _ => Err(format!("Invalid interest: {}", s)),
        }
    }
}

/// Trip pace: how densely each day is packed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    #[default]
    Balanced,
    Fast,
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pace::Relaxed => write!(f, "relaxed"),
            Pace::Balanced => write!(f, "balanced"),
            Pace::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for Pace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Ok(Pace::Relaxed),
            "balanced" | "moderate" => Ok(Pace::Balanced),
            "fast" | "packed" => Ok(Pace::Fast),
            _ => Err(format!("Invalid pace: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Budget,
    Moderate,
    Premium,
    Luxury,
}

impl BudgetLevel {
    /// Highest location price level (0-4) this budget comfortably covers
    pub fn max_price_level(&self) -> u8 {
        match self {
            BudgetLevel::Budget => 1,
            BudgetLevel::Moderate => 2,
            BudgetLevel::Premium => 3,
            BudgetLevel::Luxury => 4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityNeeds {
    pub wheelchair: bool,
    pub limited_mobility: bool,
}

impl AccessibilityNeeds {
    pub fn any(&self) -> bool {
        self.wheelchair || self.limited_mobility
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    Solo,
    Couple,
    Family,
    LargeGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupComposition {
    /// Total travellers including children
    pub size: u32,
    pub children: u32,
}

impl Default for GroupComposition {
    fn default() -> Self {
        GroupComposition {
            size: 2,
            children: 0,
        }
    }
}

impl GroupComposition {
    pub fn group_type(&self) -> GroupType {
        if self.children > 0 {
            GroupType::Family
        } else if self.size >= 5 {
            GroupType::LargeGroup
        } else if self.size <= 1 {
            GroupType::Solo
        } else {
            GroupType::Couple
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherPreferences {
    pub prefer_indoor_when_raining: bool,
    pub avoid_heat: bool,
}

impl Default for WeatherPreferences {
    fn default() -> Self {
        WeatherPreferences {
            prefer_indoor_when_raining: true,
            avoid_heat: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TripDates {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

/// Traveller input as produced by the trip builder UI
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripBuilderData {
    /// Requested days; zero, negative or absent falls back to dates, then a default
    pub duration: Option<i32>,
    pub cities: Vec<String>,
    pub regions: Vec<String>,
    /// Ranked, most important first
    pub interests: Vec<Interest>,
    pub style: Option<Pace>,
    pub dates: TripDates,
    pub budget: Option<BudgetLevel>,
    pub accessibility: AccessibilityNeeds,
    pub group: GroupComposition,
    pub weather_preferences: WeatherPreferences,
    /// Editorially featured location ids to bias toward
    pub content_location_ids: Vec<String>,
    /// Favourited location ids that must be included
    pub saved_ids: Vec<String>,
}

impl TripBuilderData {
    pub fn pace(&self) -> Pace {
        self.style.unwrap_or_default()
    }

    pub fn ranked_interests(&self) -> Vec<Interest> {
        let mut seen = HashSet::new();
        let ranked: Vec<Interest> = self
            .interests
            .iter()
            .copied()
            .filter(|i| seen.insert(*i))
            .collect();
        if ranked.is_empty() {
            Interest::defaults()
        } else {
            ranked
        }
    }

    pub fn content_ids(&self) -> HashSet<&str> {
        self.content_location_ids.iter().map(String::as_str).collect()
    }
}
