//! # imgixyz
//!
//! Command-line adapter exposing every host operation of the imgix source
//! provider. Records are read as JSON from a file (or `-` for stdin) and the
//! outcome is printed to stdout as `{ "state": ..., "diagnostics": [...] }`.
//! Logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Create a source from a plan
//! imgixyz create --plan source.json
//!
//! # Adopt an existing source of the same name instead of creating one
//! imgixyz --upsert-by-name create --plan source.json
//!
//! # Refresh state
//! imgixyz read --state state.json
//!
//! # Apply a changed plan
//! imgixyz update --state state.json --plan source.json
//!
//! # Bring an existing source under management
//! imgixyz import --id 5f1b0c...
//! ```
//!
//! The process exits with status 1 when any error diagnostic was reported.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgix_source_provider::client::{Cancellation, ImgixClient};
use imgix_source_provider::config::{ProviderConfig, ProviderSettings};
use imgix_source_provider::diagnostics::Diagnostics;
use imgix_source_provider::observability::metrics;
use imgix_source_provider::resource::{
    Resource, Response, SourceDataSource, SourceModel, SourceResource,
};
use serde::de::DeserializeOwned;
use std::io::Read;
use tracing::{info, warn};

/// imgix source provider CLI
#[derive(Parser)]
#[command(name = "imgixyz")]
#[command(about = "Manage imgix sources from typed JSON records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// imgix API token (falls back to IMGIXYZ_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Adopt an existing source with the same name on create
    #[arg(long, global = true)]
    upsert_by_name: bool,

    /// API base URL (falls back to IMGIXYZ_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a source, or adopt one with --upsert-by-name
    Create {
        /// Desired record
        #[arg(long, value_name = "FILE")]
        plan: String,
    },
    /// Refresh a source from the API
    Read {
        /// Current state
        #[arg(long, value_name = "FILE")]
        state: String,
    },
    /// Move a source from its current state to the plan
    Update {
        #[arg(long, value_name = "FILE")]
        state: String,
        #[arg(long, value_name = "FILE")]
        plan: String,
    },
    /// Disable a source (imgix has no deletion)
    Delete {
        #[arg(long, value_name = "FILE")]
        state: String,
    },
    /// Import an existing source by id
    Import {
        #[arg(long)]
        id: String,
    },
    /// Show the plan after plan modifiers ran, without calling the API
    Plan {
        /// Current state, omitted for a create
        #[arg(long, value_name = "FILE")]
        state: Option<String>,
        #[arg(long, value_name = "FILE")]
        plan: String,
    },
    /// Look a source up by id
    #[command(name = "data-source")]
    DataSource {
        #[arg(long, value_name = "FILE")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ring provider, installed before anything touches rustls
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgix_source_provider=info".into()),
        )
        .init();

    let cli = Cli::parse();
    metrics::register_metrics()?;

    let settings = ProviderSettings {
        token: cli.token.clone(),
        upsert_by_name: cli.upsert_by_name.then_some(true),
        endpoint: cli.endpoint.clone(),
        ..Default::default()
    };
    let (config, mut diagnostics) = ProviderConfig::resolve(&settings);

    let cancellation = Cancellation::new();
    spawn_interrupt_handler(cancellation.clone());

    let client = if diagnostics.has_error() {
        None
    } else {
        match ImgixClient::from_config(&config, cancellation) {
            Ok(client) => Some(client),
            Err(e) => {
                diagnostics.add_error(
                    "Unable to Create imgix API Client",
                    format!("An unexpected error occurred when creating the imgix API client: {e}"),
                );
                None
            }
        }
    };

    let response = match client {
        Some(client) => run(cli.command, &client, config.upsert_by_name).await?,
        // Plan modifiers need no API access
        None => match cli.command {
            Commands::Plan { state, plan } => modify_plan(state.as_deref(), &plan)?,
            _ => Response::from_diagnostics(Diagnostics::new()),
        },
    };

    let response = prepend(diagnostics, response);
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to serialize response")?
    );

    if cli.metrics {
        eprintln!("{}", metrics::gather_text()?);
    }

    if response.has_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    command: Commands,
    client: &ImgixClient,
    upsert_by_name: bool,
) -> Result<Response<SourceModel>> {
    let resource = SourceResource::new(client.clone(), upsert_by_name);

    let response: Response<SourceModel> = match command {
        Commands::Create { plan } => resource.create(read_json(&plan)?).await.into(),
        Commands::Read { state } => resource.read(read_json(&state)?).await.into(),
        Commands::Update { state, plan } => {
            let prior: SourceModel = read_json(&state)?;
            let plan = resource.modify_plan(Some(&prior), read_json(&plan)?);
            resource.update(prior, plan).await.into()
        }
        Commands::Delete { state } => resource.delete(read_json(&state)?).await.into(),
        Commands::Import { id } => resource.import(&id).await.into(),
        Commands::Plan { state, plan } => modify_plan(state.as_deref(), &plan)?,
        Commands::DataSource { config } => SourceDataSource::new(client.clone())
            .read(read_json(&config)?)
            .await
            .into(),
    };
    Ok(response)
}

fn modify_plan(state: Option<&str>, plan: &str) -> Result<Response<SourceModel>> {
    let prior: Option<SourceModel> = state.map(read_json::<SourceModel>).transpose()?;
    let planned = SourceResource::unconfigured().modify_plan(prior.as_ref(), read_json(plan)?);
    Ok(Response {
        state: Some(planned),
        diagnostics: Diagnostics::new(),
    })
}

/// Configuration findings come before the operation's own
fn prepend(mut diagnostics: Diagnostics, response: Response<SourceModel>) -> Response<SourceModel> {
    diagnostics.extend(response.diagnostics);
    Response {
        state: response.state,
        diagnostics,
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read record from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse record from {path}"))
}

fn spawn_interrupt_handler(cancellation: Cancellation) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling pending imgix requests");
            cancellation.cancel();
        } else {
            info!("Interrupt handler unavailable");
        }
    });
}
