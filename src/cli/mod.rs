//! CLI command definitions and handlers

mod analyze;
mod serve;
mod train;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::load_project_config;

/// codesmell - Python code smell detection
#[derive(Parser, Debug)]
#[command(name = "codesmell")]
#[command(
    version,
    about = "Detect code smells in Python source with rules and a trained classifier",
    after_help = "\
Examples:
  codesmell serve --port 8000              Run the HTTP API
  codesmell analyze app.py                 Analyze one file
  cat app.py | codesmell analyze - -f json JSON output from stdin
  codesmell dataset -o data.json           Write the synthetic training set
  codesmell train --data data.json         Train and save model artifacts"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Path to codesmell.toml (default: ./codesmell.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP analysis service
    Serve {
        /// Bind address
        #[arg(long, env = "CODESMELL_HOST")]
        host: Option<String>,

        /// Bind port
        #[arg(long, short = 'p', env = "CODESMELL_PORT")]
        port: Option<u16>,

        /// Trained model artifact
        #[arg(long, env = "CODESMELL_MODEL")]
        model: Option<PathBuf>,

        /// Fitted scaler artifact
        #[arg(long, env = "CODESMELL_SCALER")]
        scaler: Option<PathBuf>,
    },

    /// Analyze a Python file ("-" reads stdin)
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Trained model artifact
        #[arg(long, env = "CODESMELL_MODEL")]
        model: Option<PathBuf>,

        /// Fitted scaler artifact
        #[arg(long, env = "CODESMELL_SCALER")]
        scaler: Option<PathBuf>,
    },

    /// Write the synthetic labelled training set
    Dataset {
        /// Output file
        #[arg(long, short = 'o', default_value = "data.json")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Train the classifier and save its artifacts
    Train {
        /// Labelled dataset (default: generate one in memory)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Where to write the model
        #[arg(long)]
        model_out: Option<PathBuf>,

        /// Where to write the scaler
        #[arg(long)]
        scaler_out: Option<PathBuf>,

        /// Seed for dataset generation and the train/test split
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config = load_project_config(cli.config.as_deref());

    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            scaler,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let model = model.unwrap_or_else(|| config.model.model_path.clone());
            let scaler = scaler.unwrap_or_else(|| config.model.scaler_path.clone());
            serve::run(&config, &host, port, &model, &scaler)
        }

        Commands::Analyze {
            file,
            format,
            model,
            scaler,
        } => {
            let format = format
                .or_else(|| config.defaults.format.clone())
                .unwrap_or_else(|| "text".to_string());
            let model = model.unwrap_or_else(|| config.model.model_path.clone());
            let scaler = scaler.unwrap_or_else(|| config.model.scaler_path.clone());
            analyze::run(&config, &file, &format, &model, &scaler)
        }

        Commands::Dataset { output, seed } => train::run_dataset(&output, seed),

        Commands::Train {
            data,
            model_out,
            scaler_out,
            seed,
        } => {
            let model_out = model_out.unwrap_or_else(|| config.model.model_path.clone());
            let scaler_out = scaler_out.unwrap_or_else(|| config.model.scaler_path.clone());
            train::run_train(data.as_deref(), &model_out, &scaler_out, seed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["codesmell", "analyze", "app.py", "-f", "json"]).unwrap();
        match cli.command {
            Commands::Analyze { file, format, .. } => {
                assert_eq!(file, PathBuf::from("app.py"));
                assert_eq!(format.as_deref(), Some("json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["codesmell", "analyze", "app.py", "-f", "sarif"]).is_err());
    }

    #[test]
    fn test_parse_train_defaults() {
        let cli = Cli::try_parse_from(["codesmell", "--log-level", "debug", "train"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Train { data, seed, .. } => {
                assert!(data.is_none());
                assert_eq!(seed, 42);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
