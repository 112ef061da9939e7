use thiserror::Error;

mod app_config;
mod config;
pub mod marketplace;
pub mod products;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use marketplace::{Country, Marketplace};
pub use products::{
    NormalizedProduct, Price, ProductFilters, ProductQuery, SortBy, CATEGORIES,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
