use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Weather API error: {0}")]
    WeatherApi(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PlannerError {
    fn from(e: reqwest::Error) -> Self {
        PlannerError::WeatherApi(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
