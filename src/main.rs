//! Refollow - social-graph refollow relay
//!
//! Main entry point for the refollow server and CLI.

use clap::{Parser, Subcommand};
use refollow::config::RefollowConfig;
use refollow::gate::{resolve_creators, CreatorRequirement};
use refollow::graph::Fid;
use refollow::server::RefollowServer;
use refollow::service::RefollowService;
use refollow::upstream::{GraphProvider, NeynarClient};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Refollow - who you follow, who follows you, and who doesn't follow back
#[derive(Parser, Debug)]
#[command(name = "refollow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/refollow/config.yaml)
    #[arg(short, long, env = "REFOLLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Skip the creator follow gate
        #[arg(long)]
        no_gate: bool,
    },

    /// Compute the refollow result for one FID and print it as JSON
    Lookup {
        /// Account identifier
        fid: Fid,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> refollow::Result<()> {
    let mut config = RefollowConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env()?;

    // Initialize logging
    if let Err(e) = refollow::logging::init(&config.log, config.server.production) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    config.validate()?;

    let client: Arc<dyn GraphProvider> = Arc::new(NeynarClient::from_config(&config)?);

    match cli.command {
        Commands::Serve { port, no_gate } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_gate {
                config.gate.enabled = false;
            }
            serve(config, client).await
        }
        Commands::Lookup { fid } => {
            let service = RefollowService::new(
                client,
                config.cache_config(),
                CreatorRequirement::empty(),
            );
            let result = service.compute(fid).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

async fn serve(config: RefollowConfig, client: Arc<dyn GraphProvider>) -> refollow::Result<()> {
    let requirement = if config.gate.enabled {
        // Fail open: an unreachable upstream at boot must not lock everyone out
        match resolve_creators(client.as_ref(), &config.gate.creators).await {
            Ok(requirement) => requirement,
            Err(e) => {
                tracing::warn!(error = %e, "Creator resolution failed, gate disabled");
                CreatorRequirement::empty()
            }
        }
    } else {
        tracing::info!("Creator gate disabled by configuration");
        CreatorRequirement::empty()
    };

    let service = RefollowService::new(client, config.cache_config(), requirement);
    RefollowServer::new(service, config.server.production)
        .run(&config.bind_addr())
        .await
}
