use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub mod commands;

use commands::{render, serve};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tspdebug")]
#[command(about = "Forecast debug pages for time series prediction jobs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where jobs and their recorded history are read from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding prediction jobs as `<namespace>/<name>.yaml`
    #[arg(long, env = "JOBS_DIR", default_value = "./jobs")]
    pub jobs_dir: PathBuf,

    /// Directory holding recorded history as `<namespace>/<job>/<metric>.json`
    #[arg(long, env = "HISTORY_DIR", default_value = "./history")]
    pub history_dir: PathBuf,

    /// Seconds the forecast engine may spend on one debug request
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value_t = 25)]
    pub engine_timeout_secs: u64,

    /// Seconds one HTTP request may take, must exceed the engine timeout
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl SourceArgs {
    pub fn to_config(&self, bind_address: &str) -> AppConfig {
        AppConfig {
            bind_address: bind_address.to_string(),
            jobs_dir: self.jobs_dir.clone(),
            history_dir: self.history_dir.clone(),
            engine_timeout: Duration::from_secs(self.engine_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
        bind_address: String,

        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Render the debug page of one job into a file
    ///
    /// Runs the same pipeline as the HTTP endpoint without starting a server.
    Render {
        /// Namespace of the prediction job
        #[arg(short, long)]
        namespace: String,

        /// Name of the prediction job
        #[arg(long)]
        name: String,

        /// File the HTML page is written to
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        sources: SourceArgs,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                bind_address,
                sources,
            } => {
                serve(&sources.to_config(&bind_address)).await?;
            }
            Commands::Render {
                namespace,
                name,
                output,
                sources,
            } => {
                render(&sources.to_config(""), &namespace, &name, &output).await?;
            }
        }
        Ok(())
    }
}
