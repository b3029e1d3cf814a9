mod app_config;
mod config;
pub mod geo;
pub mod place;
pub mod query;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_meters, Coordinate, EARTH_RADIUS_METERS};
pub use place::{PlaceRecord, PlaceResult, SearchResponse};
pub use query::{
    SearchQuery, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS, MAX_LIMIT, MAX_RADIUS_METERS, MIN_LIMIT,
    MIN_RADIUS_METERS,
};

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid query: {field} {reason}")]
    InvalidQuery { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
