use thiserror::Error;

pub use slidegen_common::ValidationError;

/// Umbrella error for the generation client library
#[derive(Error, Debug)]
pub enum SlidegenError {
    /// Form input rejected before any network activity
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A generation cycle ended in `Failed`
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single HTTP exchange with the generation service.
///
/// Stored inside the session's result slot, so it carries rendered
/// messages rather than the non-cloneable `reqwest::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request could not be completed: {0}")]
    Network(String),

    #[error("service responded with HTTP {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

/// Why a generation cycle failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Presentation generation failed: {0}")]
    GenerationFailed(TransportError),

    #[error("Slide preview failed: {0}")]
    PreviewFailed(TransportError),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to read configuration file: {source}")]
    IoError {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML configuration: {source}")]
    TomlParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to render TOML configuration: {source}")]
    TomlRenderError {
        #[source]
        source: toml::ser::Error,
    },
}

pub type Result<T> = std::result::Result<T, SlidegenError>;
