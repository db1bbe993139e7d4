use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::OutputFormat;
use super::constants::{ENV_CONFIG, ENV_OUTPUT, ENV_SCHEMA};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(version, about = "Inspect and normalize tabular filter queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the JSON schema document
    #[arg(long, short = 's', global = true, env = ENV_SCHEMA)]
    pub schema: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, short = 'o', global = true, env = ENV_OUTPUT, value_parser = parse_output_format)]
    pub output: Option<OutputFormat>,
}

/// Parse output format from CLI/env string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format '{}'. Valid options: text, json",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Parse a query string and print the filters it describes
    Parse {
        /// Query string, e.g. "age=gte.18&status=in.(active)"
        query: String,
    },
    /// Parse a query string and print it back in canonical form
    Normalize {
        /// Query string to normalize
        query: String,
    },
    /// Serialize a JSON array of filters into a query string
    Serialize {
        /// JSON file with the filters ("-" reads stdin)
        file: PathBuf,
    },
    /// List the schema's columns with their operators
    Columns,
}

impl Commands {
    /// Whether the command needs a schema document
    pub fn needs_schema(&self) -> bool {
        !matches!(self, Commands::Serialize { .. })
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub output: Option<OutputFormat>,
}

impl Cli {
    /// Split parsed arguments into config and command
    pub fn into_parts(self) -> (CliConfig, Commands) {
        let config = CliConfig {
            config: self.config,
            schema: self.schema,
            output: self.output,
        };
        (config, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    Cli::parse().into_parts()
}
