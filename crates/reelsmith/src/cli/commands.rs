//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use reelsmith::VersionKind;
use std::path::PathBuf;

/// Reelsmith - narrated short videos from long-form text
#[derive(Parser, Debug)]
#[command(name = "reelsmith")]
#[command(about = "Turn long-form text into narrated short-video assets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Export tracing spans to stdout
    #[arg(long, global = true)]
    pub trace: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a text file into chapters and store it
    Import {
        /// Document title
        #[arg(long)]
        title: String,

        /// UTF-8 text file to import
        file: PathBuf,

        /// Number of chapters to split into
        #[arg(long, default_value = "1")]
        chapters: usize,
    },

    /// Generate a new narration version
    Narrate {
        /// Chapter to narrate
        #[arg(long, required_unless_present = "document", conflicts_with = "document")]
        chapter: Option<String>,

        /// Narrate every chapter of a document
        #[arg(long)]
        document: Option<String>,
    },

    /// Generate one image per shot of the current narration
    Images {
        /// Chapter id
        chapter: String,
    },

    /// Synthesize narration audio per shot
    Audio {
        /// Chapter id
        chapter: String,
    },

    /// Build SRT subtitles from the current audio version
    Subtitles {
        /// Chapter id
        chapter: String,
    },

    /// Generate a clip per shot from the current image version
    Videos {
        /// Chapter id
        chapter: String,
    },

    /// Concatenate the current clips into the final chapter video
    Assemble {
        /// Chapter id
        chapter: String,
    },

    /// Select the current version of one kind
    Select {
        /// Chapter id
        chapter: String,

        /// Version kind (narration, image, audio, subtitle, video, final_video)
        kind: VersionKind,

        /// Version number to make current
        version: u32,
    },

    /// Show versions and record counts for a chapter
    Status {
        /// Chapter id
        chapter: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Soft-delete records
    #[command(subcommand)]
    Delete(DeleteCommands),
}

/// Soft-delete subcommands
#[derive(Subcommand, Debug)]
pub enum DeleteCommands {
    /// Delete a narration version with its scenes and shots
    Narration {
        /// Narration id
        id: String,
    },

    /// Delete one artifact record
    Artifact {
        /// Artifact id
        id: String,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
