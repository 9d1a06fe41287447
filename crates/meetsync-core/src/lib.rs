mod app_config;
mod config;
mod error;
pub mod schedule;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use schedule::{compile_interval, CompiledSchedule, DEFAULT_INTERVAL_MINUTES};
