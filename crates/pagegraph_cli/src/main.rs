//! Page graph command-line driver.
//!
//! # Responsibility
//! - Load one record from a file or stdin, run one query or mutation.
//! - Print JSON results to stdout; never write the input file back.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pagegraph_core::{
    default_log_level, init_logging, DisplayName, GraphService, IntegrityCheck, LoadOptions,
    LogConfig, SchemaConverter,
};
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let config = LogConfig::new(level, log_dir)?;
        init_logging(&config)?;
    }

    if cli.command == Commands::Ping {
        println!("pagegraph_core ping={}", pagegraph_core::ping());
        println!("pagegraph_core version={}", pagegraph_core::core_version());
        return Ok(());
    }

    let input = read_input(&cli.input)?;
    let options = LoadOptions {
        integrity: if cli.strict {
            IntegrityCheck::Reject
        } else {
            IntegrityCheck::Warn
        },
    };
    let mut service = GraphService::open_with(input.as_str(), &SchemaConverter, options)
        .with_context(|| format!("failed to load `{}`", cli.input.display()))?;

    let output = run(&mut service, &cli.command)?;
    println!("{output}");
    Ok(())
}

fn run(service: &mut GraphService, command: &Commands) -> Result<String> {
    let query = match command {
        Commands::Ping => json!({"ping": pagegraph_core::ping()}),
        Commands::Page { url } => serde_json::to_value(service.get_page(url).as_ref())?,
        Commands::Label { label } => json!(service.get_label(label)),
        Commands::Labels => json!(service.labels().collect::<Vec<_>>()),
        Commands::Notes => json!(service.notes()),
        Commands::Verify => match service.verify_integrity() {
            Ok(()) => json!({"ok": true}),
            Err(err) => json!({"ok": false, "error": err.to_string()}),
        },
        Commands::SetDisplay {
            url,
            display,
            number,
        } => {
            service.set_display(url, parse_display(display, *number)?);
            Value::Null
        }
        Commands::SetNote { url, note_url } => {
            service.set_note(url, note_url.as_deref().unwrap_or(""));
            Value::Null
        }
        Commands::AddLabel { url, label } => {
            service.add_label(url, label);
            Value::Null
        }
        Commands::RemLabel { url, label } => {
            service.rem_label(url, label);
            Value::Null
        }
        Commands::DeleteNote { note_url } => {
            service.delete_note(note_url);
            Value::Null
        }
        Commands::DeleteLabel { label } => {
            service.delete_label(label);
            Value::Null
        }
    };

    if command.is_mutation() {
        return Ok(service.stringify()?);
    }
    Ok(query.to_string())
}

fn parse_display(display: &str, number: bool) -> Result<DisplayName> {
    if !number {
        return Ok(DisplayName::from(display));
    }
    match display.parse::<serde_json::Number>() {
        Ok(value) => Ok(DisplayName::from(value)),
        Err(_) => bail!("`{display}` is not a JSON number"),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read record from stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}
