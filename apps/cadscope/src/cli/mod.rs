//! # cadscope CLI Module
//!
//! This module implements the CLI interface for cadscope.
//!
//! ## Available Commands
//!
//! - `status` - Summarize the loaded document
//! - `props` - Extract the property entries of one object
//! - `tree` - Expand the object tree to a given depth
//! - `xdata` - Decode an object's extended data (or xrecord data)
//! - `encode` - Encode operator text for a group code
//! - `edit` - Replace one typed value and save the document
//! - `diff` - Compare the properties of two objects
//! - `snapshot` - Write the loaded document as a binary snapshot
//! - `sample` - Write the built-in sample document

mod commands;

use cadscope_core::CadscopeError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// cadscope - CAD object-graph inspector
///
/// Reads a document's object graph without knowing its classes in advance
/// and shows properties, containment trees and typed-value data.
#[derive(Parser, Debug)]
#[command(name = "cadscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Document to inspect (snapshot or JSON). The built-in sample is used
    /// when omitted.
    #[arg(short = 'D', long, global = true)]
    pub document: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Decimals for points, vectors and spatial scalars
    #[arg(long, global = true)]
    pub spatial_precision: Option<usize>,

    /// Decimals for every other floating value
    #[arg(long, global = true)]
    pub scalar_precision: Option<usize>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the loaded document
    Status,

    /// Show the property entries of an object
    Props {
        /// Object handle (hexadecimal)
        handle: String,

        /// Keep entries whose name, value or type contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Keep only error entries
        #[arg(short, long)]
        errors: bool,
    },

    /// Show the object tree
    Tree {
        /// Root handle (defaults to the document root)
        #[arg(short = 'H', long)]
        handle: Option<String>,

        /// Levels to expand below the root
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },

    /// Decode an object's extended data
    Xdata {
        /// Object handle (hexadecimal)
        handle: String,

        /// Decode the xrecord payload instead of extended data
        #[arg(long)]
        data: bool,
    },

    /// Encode operator text for a group code
    Encode {
        /// Group code
        #[arg(short, long, allow_hyphen_values = true)]
        code: i16,

        /// Text to encode
        #[arg(short, long)]
        text: String,
    },

    /// Replace one typed value and save the document
    Edit {
        /// Object handle (hexadecimal)
        handle: String,

        /// Position in the typed-value list
        #[arg(short, long)]
        index: usize,

        /// New value text
        #[arg(short, long)]
        text: String,

        /// Edit the xrecord payload instead of extended data
        #[arg(long)]
        data: bool,

        /// Write the edited document here instead of over the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the properties of two objects
    Diff {
        /// First object handle
        first: String,

        /// Second object handle
        second: String,

        /// Compare raw values instead of formatted text
        #[arg(long)]
        raw: bool,

        /// Show only rows that differ
        #[arg(long)]
        changes_only: bool,
    },

    /// Write the loaded document as a binary snapshot
    Snapshot {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the built-in sample document
    Sample {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format: snapshot, json
        #[arg(short, long, default_value = "snapshot")]
        format: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI command.
pub fn execute(cli: Cli) -> Result<(), CadscopeError> {
    let settings = Settings::resolve(
        cli.document,
        cli.config.as_deref(),
        cli.spatial_precision,
        cli.scalar_precision,
        cli.json_mode,
    )?;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&settings),
        Some(Commands::Props {
            handle,
            filter,
            errors,
        }) => cmd_props(&settings, &handle, filter.as_deref(), errors),
        Some(Commands::Tree { handle, depth }) => cmd_tree(&settings, handle.as_deref(), depth),
        Some(Commands::Xdata { handle, data }) => cmd_xdata(&settings, &handle, channel(data)),
        Some(Commands::Encode { code, text }) => cmd_encode(&settings, code, &text),
        Some(Commands::Edit {
            handle,
            index,
            text,
            data,
            output,
        }) => cmd_edit(
            &settings,
            &handle,
            channel(data),
            index,
            &text,
            output.as_deref(),
        ),
        Some(Commands::Diff {
            first,
            second,
            raw,
            changes_only,
        }) => cmd_diff(&settings, &first, &second, raw, changes_only),
        Some(Commands::Snapshot { output }) => cmd_snapshot(&settings, &output),
        Some(Commands::Sample { output, format }) => cmd_sample(&output, &format),
    }
}

fn channel(data: bool) -> cadscope_core::TypedChannel {
    if data {
        cadscope_core::TypedChannel::Data
    } else {
        cadscope_core::TypedChannel::XData
    }
}
