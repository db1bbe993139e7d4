//! Core application

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tabula_filter::{Definition, Filter, Kind, Search, to_query};

use crate::core::cli::{self, Commands};
use crate::core::config::{AppConfig, OutputFormat};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::utils::file::read_input;

pub struct TabulaApp {
    pub config: AppConfig,
}

impl TabulaApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
        };
        let stdout = io::stdout();
        let mut out = stdout.lock();
        app.execute(&command, &mut out)
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Run one command, writing its result to `out`
    pub fn execute(&self, command: &Commands, out: &mut impl Write) -> Result<()> {
        let definition = if command.needs_schema() {
            Some(self.load_definition()?)
        } else {
            None
        };

        match (command, definition) {
            (Commands::Parse { query }, Some(definition)) => self.parse(definition, query, out),
            (Commands::Normalize { query }, Some(definition)) => {
                let search = Self::init_search(definition, query);
                writeln!(out, "{}", search.to_query())?;
                Ok(())
            }
            (Commands::Columns, Some(definition)) => self.columns(&definition, out),
            (Commands::Serialize { file }, _) => Self::serialize(file, out),
            (_, None) => anyhow::bail!("Command requires a schema"),
        }
    }

    fn load_definition(&self) -> Result<Definition> {
        let path = self.config.require_schema()?;
        Definition::load(path)
            .with_context(|| format!("Failed to load schema: {}", path.display()))
    }

    fn init_search(definition: Definition, query: &str) -> Search {
        let search = Search::init(definition, query);
        if search.dropped() > 0 {
            tracing::warn!(
                dropped = search.dropped(),
                "Some query fragments were not understood and were ignored"
            );
        }
        search
    }

    fn parse(&self, definition: Definition, query: &str, out: &mut impl Write) -> Result<()> {
        let search = Self::init_search(definition, query);
        match self.config.output {
            OutputFormat::Text => {
                for filter in search.filters() {
                    writeln!(out, "{}", filter)?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, search.filters())?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn serialize(file: &Path, out: &mut impl Write) -> Result<()> {
        let content = read_input(file)?;
        let filters: Vec<Filter> =
            serde_json::from_str(&content).context("Failed to parse filter list")?;
        tracing::debug!(filters = filters.len(), "Serializing filters");
        writeln!(out, "{}", to_query(&filters))?;
        Ok(())
    }

    fn columns(&self, definition: &Definition, out: &mut impl Write) -> Result<()> {
        match self.config.output {
            OutputFormat::Text => {
                for (name, def) in definition.columns() {
                    let required = if def.required { " (required)" } else { "" };
                    match Kind::of(&def.column_type) {
                        Some(kind) => writeln!(
                            out,
                            "{}{}: {} [{}]",
                            name,
                            required,
                            kind,
                            kind.operators().join(", ")
                        )?,
                        None => writeln!(out, "{}{}: not filterable", name, required)?,
                    }
                }
            }
            OutputFormat::Json => {
                let columns: Vec<serde_json::Value> = definition
                    .columns()
                    .map(|(name, def)| {
                        let kind = Kind::of(&def.column_type);
                        json!({
                            "name": name,
                            "kind": kind,
                            "required": def.required,
                            "operators": kind.map(Kind::operators).unwrap_or_default(),
                        })
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &columns)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}
