// Library exports for the planner and its evaluation tooling

pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use error::{PlannerError, Result};
pub use services::ItineraryGenerator;
