pub mod aggregate;
pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod outliers;
pub mod predictor;
pub mod roster;
pub mod schema;
pub mod scorer;
pub mod season_store;
