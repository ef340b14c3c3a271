use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use serde::Deserialize;
use std::sync::Arc;

use slidegen_common::{GenerationPayload, GenerationRequest, PreviewImage, PreviewResponse};

use crate::config::Config;
use crate::error::{ConfigError, GenerationError, TransportError};

const GENERATE_PATH: &str = "api/generate_presentation";
const PREVIEW_PATH: &str = "api/preview_slides";

/// The generated presentation, held in memory until it is handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Arc<[u8]>,
    content_type: Option<String>,
}

impl Artifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success {
        artifact: Artifact,
        previews: Vec<PreviewImage>,
    },
    Failure(GenerationError),
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one full generation: artifact first, then previews.
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome;
}

/// Talks JSON over HTTP to the generation service.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    http: reqwest::Client,
    generate_url: Url,
    preview_url: Url,
}

impl HttpGenerationClient {
    /// `base_url` must end in `/` for its path to be kept; use
    /// [`Config::service_url`] to get one that does.
    pub fn new(base_url: Url) -> Result<Self, ConfigError> {
        let join = |path: &str| {
            base_url.join(path).map_err(|_| ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: base_url.to_string(),
            })
        };

        Ok(Self {
            http: reqwest::Client::new(),
            generate_url: join(GENERATE_PATH)?,
            preview_url: join(PREVIEW_PATH)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.service_url()?)
    }

    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    pub fn preview_url(&self) -> &Url {
        &self.preview_url
    }

    /// POST to `/api/generate_presentation` and keep the binary body.
    pub async fn fetch_artifact(
        &self,
        payload: &GenerationPayload,
    ) -> Result<Artifact, TransportError> {
        let resp = self.post(&self.generate_url, payload).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Artifact::new(bytes.as_ref(), content_type))
    }

    /// POST to `/api/preview_slides` and extract the ordered image list.
    pub async fn fetch_previews(
        &self,
        payload: &GenerationPayload,
    ) -> Result<Vec<PreviewImage>, TransportError> {
        let resp = self.post(&self.preview_url, payload).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let parsed: PreviewResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(parsed.slide_previews)
    }

    async fn post(
        &self,
        url: &Url,
        payload: &GenerationPayload,
    ) -> Result<Response, TransportError> {
        tracing::debug!("POST {url} ({} slides, useAI={})", payload.num_slides, payload.use_ai);

        let resp = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: service_detail(&text),
            });
        }
        Ok(resp)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// FastAPI reports failures as `{"detail": ...}`; fall back to the raw text.
fn service_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let payload = request.to_payload();

        let artifact = match self.fetch_artifact(&payload).await {
            Ok(artifact) => {
                tracing::info!("Received presentation ({} bytes)", artifact.len());
                artifact
            }
            Err(e) => {
                tracing::warn!("Presentation generation failed: {e}");
                return GenerationOutcome::Failure(GenerationError::GenerationFailed(e));
            }
        };

        match self.fetch_previews(&payload).await {
            Ok(previews) => {
                tracing::info!("Received {} slide previews", previews.len());
                GenerationOutcome::Success { artifact, previews }
            }
            Err(e) => {
                tracing::warn!("Slide preview failed, discarding presentation: {e}");
                GenerationOutcome::Failure(GenerationError::PreviewFailed(e))
            }
        }
    }
}
