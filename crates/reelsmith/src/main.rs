//! Reelsmith CLI binary.
//!
//! This binary provides command-line access to the pipeline:
//! - Import documents and split them into chapters
//! - Generate narration, images, audio, subtitles and clips
//! - Assemble final videos and manage current versions

use clap::Parser;
use reelsmith::{ReelsmithConfig, init_telemetry, shutdown_telemetry};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        AssetArg, Cli, Commands, assemble, delete, generate_assets, import_document, narrate,
        select_version, show_status,
    };

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    let directive = format!("warn,reelsmith={}", default_level);
    if cli.trace {
        init_telemetry(&directive)?;
    } else {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => ReelsmithConfig::from_file(path)?,
        None => ReelsmithConfig::load()?,
    };

    // Execute the requested command
    match cli.command {
        Commands::Import {
            title,
            file,
            chapters,
        } => {
            import_document(&config, &title, &file, chapters).await?;
        }

        Commands::Narrate { chapter, document } => {
            narrate(&config, chapter.as_deref(), document.as_deref()).await?;
        }

        Commands::Images { chapter } => {
            generate_assets(&config, AssetArg::Images, &chapter).await?;
        }

        Commands::Audio { chapter } => {
            generate_assets(&config, AssetArg::Audio, &chapter).await?;
        }

        Commands::Subtitles { chapter } => {
            generate_assets(&config, AssetArg::Subtitles, &chapter).await?;
        }

        Commands::Videos { chapter } => {
            generate_assets(&config, AssetArg::Videos, &chapter).await?;
        }

        Commands::Assemble { chapter } => {
            assemble(&config, &chapter).await?;
        }

        Commands::Select {
            chapter,
            kind,
            version,
        } => {
            select_version(&config, &chapter, kind, version).await?;
        }

        Commands::Status { chapter, format } => {
            show_status(&config, &chapter, format).await?;
        }

        Commands::Delete(command) => {
            delete(&config, command).await?;
        }
    }

    if cli.trace {
        shutdown_telemetry();
    }
    Ok(())
}
