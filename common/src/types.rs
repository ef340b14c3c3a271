use serde::{Deserialize, Serialize};
use std::fmt;

/// One still image standing in for a single generated slide. The service
/// hands back either a URL or an embedded data URI; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewImage(String);

impl PreviewImage {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body shared by `/api/generate_presentation` and `/api/preview_slides`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub title: String,
    pub author: String,
    pub num_slides: u32,
    pub description: String,
    #[serde(rename = "useAI")]
    pub use_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,
}

/// Body returned by `/api/preview_slides`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub slide_previews: Vec<PreviewImage>,
}
