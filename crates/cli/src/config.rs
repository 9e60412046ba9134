//! Command line configuration for the `indivo` tool.
//!
//! Global options can also be set through the environment:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `INDIVO_LOG_LEVEL` | warn | Log level for the indivo crates |
//! | `INDIVO_STRICT` | false | Reject wire fields the schema does not declare |
//! | `INDIVO_INPUT_FORMAT` | auto | Input format: auto, xml or json |
//!
//! `RUST_LOG`, when set, replaces the log filter entirely.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use indivo_document::BindingOptions;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Inspect, convert and validate Indivo record documents.
#[derive(Debug, Clone, Parser)]
#[command(name = "indivo")]
#[command(about = "Inspect, convert and validate Indivo record documents")]
#[command(version)]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "INDIVO_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Fail on wire fields the document schema does not declare
    #[arg(long, env = "INDIVO_STRICT", default_value = "false", global = true)]
    pub strict: bool,

    /// Input format; `auto` looks at the file extension, then the content
    #[arg(
        long,
        env = "INDIVO_INPUT_FORMAT",
        value_enum,
        default_value = "auto",
        global = true
    )]
    pub format: InputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Auto,
    Xml,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the type, id and present fields of a document
    Inspect {
        /// Document file
        file: PathBuf,
    },

    /// Re-serialize a document as XML or JSON
    Convert {
        /// Document file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        to: OutputFormat,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that documents bind to their schemas and serialize back
    Validate {
        /// Document files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the registered document types, or the fields of one type
    Schemas {
        /// Document type to describe
        type_name: Option<String>,
    },
}

impl CliConfig {
    /// Binding options derived from `--strict`.
    pub fn binding_options(&self) -> BindingOptions {
        if self.strict {
            BindingOptions::strict()
        } else {
            BindingOptions::default()
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log level {:?}, expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if let Command::Convert { file, .. } | Command::Inspect { file } = &self.command {
            if file.as_os_str().is_empty() {
                errors.push("Input file path cannot be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
