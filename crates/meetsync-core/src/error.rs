use thiserror::Error;

/// Errors raised while loading configuration from the environment.
///
/// These are the only hard startup failures in the daemon: anything else
/// (unreachable API, failed sync run) is logged and survived.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
