//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::schema::AccessTag;

/// Filter command arguments.
#[derive(Debug, Args)]
pub struct FilterCommand {
    /// Filter schema file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Access for fields the schema does not mention
    #[arg(short, long, value_enum)]
    pub default_access: Option<AccessArg>,

    /// Report what would be filtered but print input unchanged
    #[arg(long)]
    pub dry_run: bool,

    /// Treat KEY as a virtual (computed) field
    #[arg(long = "virtual", value_name = "KEY")]
    pub virtuals: Vec<String>,

    /// Input record or array of records (JSON); stdin when omitted or `-`
    pub input: Option<PathBuf>,
}

/// View command arguments.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Filter schema file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Dotted path of the field to read, e.g. `profile.address`
    #[arg(short, long)]
    pub path: String,

    /// Access for fields the schema does not mention
    #[arg(short, long, value_enum)]
    pub default_access: Option<AccessArg>,

    /// Print the raw value instead of its filtered serialization
    #[arg(long)]
    pub raw: bool,

    /// Input record (JSON); stdin when omitted or `-`
    pub input: Option<PathBuf>,
}

/// Schema commands.
#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// Compile a JSON array of field descriptors into a filter schema
    Compile {
        /// Access for declared fields without an explicit level
        #[arg(long, value_enum)]
        default_access: Option<AccessArg>,

        /// Field descriptors (JSON); stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Parse a schema file and report ignored entries
    Check {
        /// Filter schema file (JSON)
        file: PathBuf,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Access tag argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccessArg {
    /// Include fields
    Public,
    /// Omit fields
    Private,
}

impl From<AccessArg> for AccessTag {
    fn from(arg: AccessArg) -> Self {
        match arg {
            AccessArg::Public => Self::Public,
            AccessArg::Private => Self::Private,
        }
    }
}
