pub mod itinerary_generator;
pub mod weather;

pub use itinerary_generator::ItineraryGenerator;
pub use weather::{CachedWeatherSource, OpenMeteoClient, WeatherSource};
