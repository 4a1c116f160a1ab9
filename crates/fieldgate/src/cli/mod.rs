//! Command-line interface for fieldgate.
//!
//! This module provides the CLI structure and the input helpers shared by the
//! command handlers of the `fieldgate` binary.

mod commands;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::schema::SchemaNode;

pub use commands::{AccessArg, ConfigCommand, FilterCommand, SchemaCommand, ViewCommand};

/// fieldgate - Field-level access control for serialized records
///
/// Filters JSON records against a schema of public/private fields, either
/// whole or starting from a nested position.
#[derive(Debug, Parser)]
#[command(name = "fieldgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter records against a schema
    Filter(FilterCommand),

    /// Read a nested field through a filtered view
    View(ViewCommand),

    /// Build or inspect filter schemas
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// Read a JSON document from `path`, or from stdin when `path` is `None` or
/// `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not valid JSON.
pub fn read_json(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) if path != Path::new("-") => {
            debug!("Reading {}", path.display());
            let text = std::fs::read_to_string(path).map_err(|source| Error::InputRead {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(serde_json::from_str(&text)?)
        }
        _ => {
            debug!("Reading stdin");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

/// Parse a schema document.
///
/// Either an object (a schema tree) or a bare `"public"` / `"private"` tag.
/// Malformed entries inside a tree are dropped with a warning.
///
/// # Errors
///
/// Returns an error if the document is neither a tag nor an object.
pub fn parse_schema(value: &Value) -> Result<SchemaNode> {
    SchemaNode::from_value(value).ok_or_else(|| {
        Error::schema_parse(format!(
            "expected an object or an access tag at the top level, got {value}"
        ))
    })
}

/// Count the schema entries [`parse_schema`] would drop.
#[must_use]
pub fn count_ignored_entries(value: &Value) -> usize {
    let Value::Object(map) = value else {
        return usize::from(SchemaNode::from_value(value).is_none());
    };
    map.values()
        .map(|entry| match entry {
            Value::Object(_) => count_ignored_entries(entry),
            Value::Null => 0,
            other => usize::from(SchemaNode::from_value(other).is_none()),
        })
        .sum()
}
