//! swr gateway entrypoint.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use swr_gateway::GatewayConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "swr-gateway")]
#[command(author, version, about = "Offline-first caching gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway.
    Serve {
        /// Path to a YAML config file.
        #[arg(short, long, env = "SWR_CONFIG")]
        config: Option<PathBuf>,
        /// Override the listen address.
        #[arg(long, env = "SWR_LISTEN")]
        listen: Option<SocketAddr>,
        /// Override the upstream origin.
        #[arg(long, env = "SWR_UPSTREAM")]
        upstream: Option<Url>,
    },
    /// Print the route kind for each URL path.
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            listen,
            upstream,
        } => {
            let mut config = GatewayConfig::load(config.as_deref())?;
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(upstream) = upstream {
                config.upstream = upstream;
            }
            swr_gateway::server::serve(config).await?;
        }
        Commands::Classify { paths } => {
            for path in paths {
                let kind = match Url::parse(&path) {
                    Ok(url) => swr_router::classify::classify_url(&url),
                    Err(_) => swr_router::classify(&path),
                };
                println!("{}\t{}\t{:?}", path, kind, kind.strategy());
            }
        }
    }

    Ok(())
}
