//! `fieldgate` - CLI for field-level access control
//!
//! This binary filters JSON records against public/private field schemas and
//! manages the configuration that drives it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::info;

use fieldgate::cli::{self, Cli, Command, ConfigCommand, FilterCommand, SchemaCommand, ViewCommand};
use fieldgate::schema::{compile, AccessTag, FieldSpec, KeyPath, SchemaNode};
use fieldgate::{init_logging, wrap, Config, Field, FilterOptions, Serializer, TracingAudit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Filter(cmd) => handle_filter(&config, &cmd)?,
        Command::View(cmd) => handle_view(&config, &cmd)?,
        Command::Schema(cmd) => handle_schema(&config, cmd)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn default_access(config: &Config, arg: Option<cli::AccessArg>) -> AccessTag {
    arg.map_or(config.filter.default_fields_access, AccessTag::from)
}

fn load_schema(path: &std::path::Path) -> anyhow::Result<SchemaNode> {
    let value =
        cli::read_json(Some(path)).with_context(|| format!("loading schema {}", path.display()))?;
    Ok(cli::parse_schema(&value)?)
}

fn handle_filter(config: &Config, cmd: &FilterCommand) -> anyhow::Result<()> {
    let schema = load_schema(&cmd.schema)?;
    let mut options = config.serializer;
    options.dry_run |= cmd.dry_run;

    let serializer = Serializer::new(
        schema,
        FilterOptions::new(default_access(config, cmd.default_access)),
        options,
    )
    .with_virtuals(cmd.virtuals.iter().cloned())
    .with_audit_hook(TracingAudit);

    let input = cli::read_json(cmd.input.as_deref()).context("reading input records")?;
    let output = match &input {
        Value::Array(records) => Value::Array(serializer.serialize_many(records)),
        record => serializer.serialize(record),
    };
    info!(dry_run = serializer.is_dry_run(), "Filtered input");
    print_json(&output)
}

fn handle_view(config: &Config, cmd: &ViewCommand) -> anyhow::Result<()> {
    let schema = load_schema(&cmd.schema)?;
    let record = cli::read_json(cmd.input.as_deref()).context("reading input record")?;
    let path = KeyPath::from_dotted(&cmd.path);

    let access = default_access(config, cmd.default_access);
    let view = wrap(&record, &schema, access);
    if path.is_empty() {
        return if cmd.raw {
            print_json(&record)
        } else {
            print_json(&view)
        };
    }

    let field = view
        .get_path(&path)
        .with_context(|| format!("no field at path '{path}'"))?;
    if cmd.raw {
        return print_json(field.raw());
    }
    if let Field::View(nested) = &field {
        info!(path = %nested.path(), "Serializing nested view");
    }
    print_json(&field)
}

fn handle_schema(config: &Config, cmd: SchemaCommand) -> anyhow::Result<()> {
    match cmd {
        SchemaCommand::Compile {
            default_access,
            input,
        } => {
            let value = cli::read_json(input.as_deref()).context("reading field descriptors")?;
            let fields: Vec<FieldSpec> = serde_json::from_value(value)
                .context("expected an array of {path, access?, auto?}")?;
            let mut options = config.compiler.clone();
            if let Some(access) = default_access {
                options.default_schema_access = access.into();
            }
            print_json(&compile(&fields, &options))
        }
        SchemaCommand::Check { file } => {
            let value = cli::read_json(Some(file.as_path()))?;
            let schema = cli::parse_schema(&value)?;
            let ignored = cli::count_ignored_entries(&value);
            let summary = match &schema {
                SchemaNode::Tree(tree) => format!("{} top-level entries", tree.len()),
                SchemaNode::Tag(tag) => format!("whole-document tag '{tag}'"),
            };
            println!("{}: {summary}", file.display());
            if ignored > 0 {
                println!("{ignored} malformed entries use the default access");
            } else {
                println!("Schema is valid.");
            }
            Ok(())
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Filter]");
                println!(
                    "  Default fields access:   {}",
                    config.filter.default_fields_access
                );
                println!();
                println!("[Serializer]");
                println!(
                    "  Default virtuals access: {}",
                    config.serializer.default_virtuals_access
                );
                println!("  Dry run:                 {}", config.serializer.dry_run);
                println!();
                println!("[Compiler]");
                println!(
                    "  Default schema access:   {}",
                    config.compiler.default_schema_access
                );
                println!(
                    "  Auto field access:       {}",
                    config.compiler.auto_field_access
                );
                println!(
                    "  Version key:             {}",
                    config.compiler.version_key.as_deref().unwrap_or("(none)")
                );
                println!(
                    "  Version key access:      {}",
                    config.compiler.version_key_access
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
