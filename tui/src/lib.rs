pub mod app;
pub mod form;
pub mod preview;

use anyhow::Result;
use std::sync::Arc;

use slidegen_core::{Config, GenerationSession, HttpGenerationClient};

pub use app::*;
pub use form::*;
pub use preview::*;

/// Run the interactive form against the service named in `config`.
pub async fn run_interactive(config: Config) -> Result<()> {
    let client = HttpGenerationClient::from_config(&config)?;
    let session = GenerationSession::new(Arc::new(client));
    tracing::info!("Interactive session against {}", config.base_url);

    let mut app = GeneratorApp::new(session, config);
    app.run().await
}
