//! CLI Tooling
//!
//! Command-line interface for mirroring a local folder into the remote page
//! tree. The engine runs on a current-thread runtime: the traversal is
//! strictly sequential and only the remote calls suspend.

use crate::config::{self, ConfigLoader, GraftConfig};
use crate::error::SyncError;
use crate::remote::{DryRunClient, HttpPageTreeClient, PageTreeClient};
use crate::sync::{format_report_text, SyncEngine, SyncOptions, SyncReport};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Graft CLI - mirror local folders into a remote page tree
#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Mirror a local folder tree into a remote page-tree service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror a local folder under an existing remote page
    Sync {
        /// Destination page id in the remote tree
        #[arg(short, long)]
        page: String,

        /// Path to the local root folder to mirror
        #[arg(short, long)]
        folder: PathBuf,

        /// Walk and report without performing remote calls
        #[arg(long)]
        dry_run: bool,

        /// Output format for the run summary (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// CLI context owning the loaded configuration
pub struct CliContext {
    config: GraftConfig,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, SyncError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GraftConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Sync {
                page,
                folder,
                dry_run,
                format,
            } => self.handle_sync(page, folder, *dry_run, format),
        }
    }

    fn handle_sync(
        &self,
        page: &str,
        folder: &Path,
        dry_run: bool,
        format: &str,
    ) -> Result<String, SyncError> {
        let options = SyncOptions::from_config(&self.config);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SyncError::Config(format!("failed to start runtime: {}", e)))?;

        let report = if dry_run {
            debug!("dry-run mode: no remote calls will be made");
            let client = DryRunClient::new();
            runtime.block_on(run_sync(&client, options, folder, page))?
        } else {
            // Credential resolution happens before any remote call; absence
            // is fatal.
            let token = config::resolve_token()?;
            let client = HttpPageTreeClient::new(self.config.remote.base_url.clone(), token)?;
            runtime.block_on(run_sync(&client, options, folder, page))?
        };
        render_report(&report, format)
    }
}

/// Drive one sync run with Ctrl-C wired to the engine's cancel flag.
async fn run_sync<C: PageTreeClient>(
    client: &C,
    options: SyncOptions,
    folder: &Path,
    page: &str,
) -> Result<SyncReport, SyncError> {
    let engine = SyncEngine::new(client, options);
    let cancel = engine.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    engine.run(folder, page).await
}

fn render_report(report: &SyncReport, format: &str) -> Result<String, SyncError> {
    match format {
        "json" => serde_json::to_string_pretty(report)
            .map_err(|e| SyncError::Config(format!("failed to encode report: {}", e))),
        _ => Ok(format_report_text(report)),
    }
}
