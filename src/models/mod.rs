pub mod coordinates;
pub mod itinerary;
pub mod location;
pub mod region;
pub mod trip;
pub mod weather;

pub use coordinates::Coordinates;
pub use itinerary::{
    Activity, DayTripInfo, Itinerary, ItineraryDay, MealType, NoteActivity, PlaceActivity,
    RecommendationReason, ScoreBreakdown, TimeSlot,
};
pub use location::{normalize_name, Location, LocationCategory};
pub use region::{normalize_key, CityInfo};
pub use trip::{
    AccessibilityNeeds, BudgetLevel, GroupComposition, GroupType, Interest, Pace, TripBuilderData,
    TripDates, WeatherPreferences,
};
pub use weather::{CityForecast, ForecastsByCity, WeatherCondition, WeatherForecast};
