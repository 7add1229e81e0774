use thiserror::Error;

pub mod app_config;
mod config;
pub mod params;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use params::ScheduleParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("invalid schedule parameters: {0}")]
    InvalidParams(String),
}
