//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the reelsmith binary.

mod commands;
mod generate;
mod lineage;

pub use commands::{Cli, Commands, DeleteCommands, OutputFormat};
pub use generate::{AssetArg, assemble, generate_assets, narrate};
pub use lineage::{delete, import_document, select_version, show_status};
