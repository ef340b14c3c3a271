use std::path::{Path, PathBuf};

use crate::client::Artifact;
use crate::error::Result;
use crate::session::{GenerationResult, GenerationStatus};

pub const DEFAULT_FILE_NAME: &str = "presentation.pptx";

/// A finished presentation ready to be written to disk. Only obtainable
/// from a `Ready` result.
#[derive(Debug, Clone)]
pub struct DownloadHandoff {
    artifact: Artifact,
    file_name: String,
}

impl DownloadHandoff {
    pub fn from_result(result: &GenerationResult) -> Option<Self> {
        if result.status() != GenerationStatus::Ready {
            return None;
        }
        let artifact = result.artifact()?.clone();
        Some(Self {
            artifact,
            file_name: DEFAULT_FILE_NAME.to_string(),
        })
    }

    /// Save under a different name; blank names keep the default.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        if !file_name.trim().is_empty() {
            self.file_name = file_name;
        }
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Write the presentation into `dir`, creating it if needed.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.artifact.bytes()).await?;
        tracing::info!("Saved presentation to {} ({} bytes)", path.display(), self.artifact.len());
        Ok(path)
    }
}
