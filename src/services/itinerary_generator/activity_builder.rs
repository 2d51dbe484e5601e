use super::location_picker::PickedLocation;
use crate::models::{
    Activity, DayTripInfo, ItineraryDay, Location, LocationCategory, MealType, NoteActivity,
    PlaceActivity, RecommendationReason, TimeSlot,
};
use std::collections::HashSet;
use time::{Date, Duration, Weekday};

pub const SAVED_TAG: &str = "saved";
pub const FEATURED_TAG: &str = "featured";
pub const DAY_TRIP_TAG: &str = "day-trip";

/// Weekday assumed for day 1 when the trip has no start date
const DEFAULT_START_WEEKDAY: Weekday = Weekday::Wednesday;

/// Meal a food stop stands for, by category and slot. A full meal already
/// served that day downgrades to a snack; non-food locations have none.
pub fn infer_meal_type(
    category: LocationCategory,
    slot: TimeSlot,
    served: &HashSet<MealType>,
) -> Option<MealType> {
    let meal = match (category, slot) {
        (LocationCategory::Restaurant, TimeSlot::Morning) => MealType::Breakfast,
        (LocationCategory::Restaurant, TimeSlot::Afternoon) => MealType::Lunch,
        (LocationCategory::Restaurant, TimeSlot::Evening) => MealType::Dinner,
        (LocationCategory::Cafe, TimeSlot::Morning) => MealType::Breakfast,
        (LocationCategory::Cafe, _) => MealType::Snack,
        (LocationCategory::Bar, TimeSlot::Evening) => MealType::Dinner,
        (LocationCategory::Bar, _) => MealType::Snack,
        _ => return None,
    };
    if meal.is_full_meal() && served.contains(&meal) {
        Some(MealType::Snack)
    } else {
        Some(meal)
    }
}

/// Slot a saved location is placed in before overflow is considered
pub fn preferred_slot_for_saved(category: LocationCategory) -> TimeSlot {
    use LocationCategory::*;
    match category {
        Bar | Entertainment => TimeSlot::Evening,
        Museum | Shopping => TimeSlot::Afternoon,
        Shrine | Park | Nature | Market => TimeSlot::Morning,
        _ => TimeSlot::Morning,
    }
}

pub fn activity_tags(location: &Location, saved: bool, featured: bool, day_trip: bool) -> Vec<String> {
    let mut tags = vec![location.category.to_string()];
    if saved {
        tags.push(SAVED_TAG.to_string());
    }
    if featured {
        tags.push(FEATURED_TAG.to_string());
    }
    if day_trip {
        tags.push(DAY_TRIP_TAG.to_string());
    }
    tags
}

pub fn recommendation_reason(picked: &PickedLocation<'_>) -> RecommendationReason {
    let primary_reason = picked
        .score
        .reasoning
        .first()
        .cloned()
        .unwrap_or_else(|| "A good fit for this part of your day".to_string());
    RecommendationReason {
        primary_reason,
        factors: picked.score.reasoning.iter().skip(1).cloned().collect(),
        score: picked.score.score,
        breakdown: picked.score.breakdown,
        alternatives_considered: picked.alternatives.clone(),
    }
}

/// "Day 3 (Kyoto)" or "Day 3 (Day trip to Nara)"
pub fn day_label(day_number: u32, city_label: &str, day_trip_to: Option<&str>) -> String {
    match day_trip_to {
        Some(target) => format!("Day {} (Day trip to {})", day_number, target),
        None => format!("Day {} ({})", day_number, city_label),
    }
}

/// Date and weekday name for a 0-based day offset. Without a start date the
/// first day is assumed to fall mid-week.
pub fn resolve_day_date(start: Option<Date>, offset: u32) -> (Option<Date>, String) {
    match start.and_then(|s| s.checked_add(Duration::days(i64::from(offset)))) {
        Some(date) => (Some(date), date.weekday().to_string()),
        None => (
            None,
            DEFAULT_START_WEEKDAY.nth_next((offset % 7) as u8).to_string(),
        ),
    }
}

/// Accumulates one day's activities while its slots are being filled
#[derive(Debug)]
pub struct DayBuilder {
    day_number: u32,
    activities: Vec<Activity>,
    meals_served: HashSet<MealType>,
    per_slot: [u32; 3],
}

impl DayBuilder {
    pub fn new(day_number: u32) -> Self {
        DayBuilder {
            day_number,
            activities: Vec::new(),
            meals_served: HashSet::new(),
            per_slot: [0; 3],
        }
    }

    fn next_id(&mut self, slot: TimeSlot, prefix: &str) -> String {
        let count = &mut self.per_slot[slot as usize];
        *count += 1;
        format!("day-{}-{}{}-{}", self.day_number, prefix, slot, count)
    }

    pub fn push_note(&mut self, slot: TimeSlot, title: String, notes: String) {
        let id = self.next_id(slot, "note-");
        self.activities.push(Activity::Note(NoteActivity {
            id,
            title,
            notes,
            time_of_day: slot,
        }));
    }

    pub fn push_place(
        &mut self,
        location: &Location,
        slot: TimeSlot,
        travel_minutes_before: u32,
        tags: Vec<String>,
        reason: Option<RecommendationReason>,
    ) {
        let meal_type = infer_meal_type(location.category, slot, &self.meals_served);
        if let Some(meal) = meal_type.filter(MealType::is_full_meal) {
            self.meals_served.insert(meal);
        }
        let id = self.next_id(slot, "");
        self.activities.push(Activity::Place(PlaceActivity {
            id,
            title: location.name.clone(),
            location_id: location.id.clone(),
            time_of_day: slot,
            duration_minutes: location.visit_duration_minutes(),
            travel_minutes_before,
            neighborhood: location.neighborhood.clone(),
            tags,
            meal_type,
            recommendation_reason: reason,
        }));
    }

    /// Activities ordered by slot; within a slot, insertion order is kept
    pub fn finish(
        mut self,
        label: String,
        weekday: String,
        date: Option<Date>,
        city_id: Option<String>,
        day_trip: Option<DayTripInfo>,
    ) -> ItineraryDay {
        self.activities.sort_by_key(Activity::time_of_day);
        ItineraryDay {
            id: format!("day-{}", self.day_number),
            label,
            weekday,
            date,
            city_id,
            is_day_trip: day_trip.is_some(),
            day_trip,
            activities: self.activities,
        }
    }
}
