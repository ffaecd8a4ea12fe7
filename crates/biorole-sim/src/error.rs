//! Error types for the harness binary.
//!
//! [`SimError`] wraps every failure that can stop a run before or after the
//! tick loop. Failures inside the loop are engine outcomes and are tallied
//! rather than propagated.

/// Top-level error for the harness binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration or rates loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: biorole_engine::ConfigError,
    },

    /// A configuration value is outside its allowed range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Which value was rejected and why.
        message: String,
    },

    /// The summary could not be serialized.
    #[error("summary serialization failed: {source}")]
    Output {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
