//! # indivo-cli
//!
//! Command line front end over the Indivo document crates. Every command
//! reads documents through the built-in record registry, so anything the
//! tool accepts is also accepted by library callers using
//! [`indivo_records::registry`].
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `inspect` | Print the type, id and present fields of a document |
//! | `convert` | Re-serialize a document as XML or JSON |
//! | `validate` | Check that documents bind and serialize back |
//! | `schemas` | List registered types or describe one type |

pub mod commands;
pub mod config;

pub use config::{CliConfig, Command, InputFormat, OutputFormat};

/// Initializes the logging subsystem.
///
/// `RUST_LOG` wins when set; otherwise every indivo crate logs at `level`.
/// Log lines go to stderr so converted documents on stdout stay clean.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            [
                "indivo_values",
                "indivo_document",
                "indivo_records",
                "indivo_serde",
                "indivo_cli",
            ]
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(","),
        )
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
