use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use slidegen_common::{ContentMode, FormFields, ImageStyle};
use slidegen_core::{
    Config, GenerationSession, GenerationStatus, HttpGenerationClient, SlidegenError,
};

#[derive(Parser)]
#[command(name = "slidegen")]
#[command(about = "Generate slide decks and previews from the presentation service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Configuration file (TOML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the presentation form interactively
    Interactive,
    /// Generate one presentation and save it
    Generate(GenerateArgs),
    /// Write a sample configuration file
    InitConfig {
        #[arg(default_value = "slidegen.toml")]
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Presentation title
    #[arg(long)]
    pub title: String,
    /// Author name
    #[arg(long)]
    pub author: String,
    /// Number of slides to generate
    #[arg(short, long, default_value = "5")]
    pub slides: String,
    /// Write the content yourself instead of using AI
    #[arg(short, long)]
    pub description: Option<String>,
    /// realistic | anime | studio_ghibli (AI mode only)
    #[arg(long)]
    pub image_style: Option<ImageStyle>,
    /// Directory to save the presentation in
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// File name for the saved presentation
    #[arg(long)]
    pub file_name: Option<String>,
}

impl GenerateArgs {
    /// A description switches the request to manual content.
    pub fn to_fields(&self) -> FormFields {
        let (content_mode, description) = match &self.description {
            Some(text) => (ContentMode::Manual, text.clone()),
            None => (ContentMode::Ai, String::new()),
        };
        FormFields {
            title: self.title.clone(),
            author: self.author.clone(),
            num_slides: self.slides.clone(),
            content_mode,
            description,
            image_style: self.image_style,
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load_with_fallback(),
    };
    config.apply_env();
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }

    let interactive = matches!(cli.command, None | Some(Commands::Interactive));
    init_tracing(cli.debug, config.log_path.as_deref(), interactive)?;

    match cli.command {
        Some(Commands::Generate(args)) => {
            generate(config, args).await?;
        }
        Some(Commands::InitConfig { path }) => {
            Config::default().save_to_file(&path)?;
            println!("Wrote sample configuration to {}", path.display());
        }
        Some(Commands::Interactive) | None => {
            slidegen_tui::run_interactive(config).await?;
        }
    }

    Ok(())
}

/// Log to the configured file, or to stderr outside the full-screen UI.
fn init_tracing(debug: bool, log_path: Option<&Path>, interactive: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // The TUI owns the terminal; without a log file it stays quiet.
        None if interactive => builder.with_writer(std::io::sink).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn generate(config: Config, args: GenerateArgs) -> Result<()> {
    let client = HttpGenerationClient::from_config(&config)?;
    let session = GenerationSession::new(Arc::new(client));

    let handle = session.submit(&args.to_fields()).map_err(SlidegenError::from)?;
    println!("Generating \"{}\"...", args.title.trim());

    let result = handle.wait().await;
    if result.status() != GenerationStatus::Ready {
        let error = result
            .error()
            .cloned()
            .map(SlidegenError::from)
            .context("generation did not finish")?;
        return Err(error.into());
    }

    if result.preview_images().is_empty() {
        println!("No slide previews returned");
    } else {
        println!("Slide previews:");
        for (i, image) in result.preview_images().iter().enumerate() {
            println!("  {:>2}. {image}", i + 1);
        }
    }

    let handoff = session.download().context("presentation was not available for download")?;
    let file_name = args.file_name.unwrap_or(config.file_name);
    let output = args.output.unwrap_or(config.output_dir);
    let path = handoff.with_file_name(file_name).save_to(&output).await?;
    println!("Presentation saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_generate_defaults_to_ai() {
        let cli = parse(&["slidegen", "generate", "--title", "Q1 Review", "--author", "Alice"]);
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        let fields = args.to_fields();
        assert_eq!(fields.content_mode, ContentMode::Ai);
        assert_eq!(fields.num_slides, "5");
        assert_eq!(fields.description, "");
    }

    #[test]
    fn test_description_selects_manual_mode() {
        let cli = parse(&[
            "slidegen",
            "--base-url",
            "http://localhost:8080",
            "generate",
            "--title",
            "Q1",
            "--author",
            "Alice",
            "--slides",
            "3",
            "--description",
            "Revenue grew. Costs fell.",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080"));
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        let fields = args.to_fields();
        assert_eq!(fields.content_mode, ContentMode::Manual);
        assert_eq!(fields.description, "Revenue grew. Costs fell.");
        assert_eq!(fields.num_slides, "3");
    }

    #[test]
    fn test_image_style_parsed() {
        let cli = parse(&[
            "slidegen",
            "generate",
            "--title",
            "T",
            "--author",
            "A",
            "--image-style",
            "studio_ghibli",
        ]);
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.image_style, Some(ImageStyle::StudioGhibli));

        assert!(Cli::try_parse_from([
            "slidegen",
            "generate",
            "--title",
            "T",
            "--author",
            "A",
            "--image-style",
            "watercolor"
        ])
        .is_err());
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = parse(&["slidegen", "--debug"]);
        assert!(cli.debug);
        assert!(cli.command.is_none());
    }
}
