use std::time::Duration;

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
///
/// The page pipeline never raises these; they surface only to the developer who
/// supplies the configuration, before anything is armed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for [`Config`](crate::config::Config).
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The fallback poller would spin.
    #[error("checkInterval must be greater than zero (got {0:?})")]
    ZeroInterval(Duration),

    /// An empty production key is a prefix of every URL.
    #[error("URL mapping keys must not be empty (local URL {local:?})")]
    EmptyMappingKey { local: String },
}
