use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// One of the three daily allocation units, in chronological order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSlot::Morning => write!(f, "morning"),
            TimeSlot::Afternoon => write!(f, "afternoon"),
            TimeSlot::Evening => write!(f, "evening"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Breakfast, lunch and dinner; at most one of each per day
    pub fn is_full_meal(&self) -> bool {
        !matches!(self, MealType::Snack)
    }
}

/// The nine weighted factors behind a location's score, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub interest_match: f32,
    pub rating_quality: f32,
    pub logistical_fit: f32,
    pub budget_fit: f32,
    pub accessibility_fit: f32,
    pub diversity_bonus: f32,
    pub weather_fit: f32,
    pub time_optimization: f32,
    pub group_fit: f32,
}

/// Why a place was chosen, for "why this place" explanations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReason {
    pub primary_reason: String,
    pub factors: Vec<String>,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives_considered: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceActivity {
    pub id: String,
    pub title: String,
    pub location_id: String,
    pub time_of_day: TimeSlot,
    pub duration_minutes: u32,
    /// Flat travel buffer spent reaching this stop within its slot
    pub travel_minutes_before: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<RecommendationReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteActivity {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub time_of_day: TimeSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Activity {
    Place(PlaceActivity),
    Note(NoteActivity),
}

impl Activity {
    pub fn as_place(&self) -> Option<&PlaceActivity> {
        match self {
            Activity::Place(place) => Some(place),
            Activity::Note(_) => None,
        }
    }

    pub fn time_of_day(&self) -> TimeSlot {
        match self {
            Activity::Place(place) => place.time_of_day,
            Activity::Note(note) => note.time_of_day,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayTripInfo {
    pub base_city_id: String,
    pub target_city_id: String,
    pub target_label: String,
    /// Estimated one-way travel time
    pub travel_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub id: String,
    pub label: String,
    pub weekday: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    pub is_day_trip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_trip: Option<DayTripInfo>,
    pub activities: Vec<Activity>,
}

impl ItineraryDay {
    pub fn places(&self) -> impl Iterator<Item = &PlaceActivity> {
        self.activities.iter().filter_map(Activity::as_place)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    pub fn places(&self) -> impl Iterator<Item = &PlaceActivity> {
        self.days.iter().flat_map(|d| d.places())
    }

    pub fn place_count(&self) -> usize {
        self.places().count()
    }

    pub fn day_trip_count(&self) -> usize {
        self.days.iter().filter(|d| d.is_day_trip).count()
    }
}
