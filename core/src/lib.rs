//! Client-side orchestration for the slide generation service: the HTTP
//! client, the generation lifecycle, and handing the finished file over.

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod session;

pub use client::{Artifact, GenerationClient, GenerationOutcome, HttpGenerationClient};
pub use config::Config;
pub use download::DownloadHandoff;
pub use error::{ConfigError, GenerationError, Result, SlidegenError, TransportError};
pub use session::{
    GenerationResult, GenerationSession, GenerationStatus, ResultWatcher, SubmissionHandle,
};
