use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daily_shuffle::config::Config;
use daily_shuffle::storage::StoreBackend;
use daily_shuffle::utils::time::Zone;

mod commands;

#[derive(Parser)]
#[command(
    name = "daily-shuffle",
    version,
    about = "Publishes a daily shuffle and serves the latest one over HTTP",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults to DAILY_SHUFFLE_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

/// Store selection shared by all commands
#[derive(Args, Debug)]
struct StoreArgs {
    /// Store backend (sqlite, memory)
    #[arg(long)]
    store: Option<StoreBackend>,

    /// SQLite database path
    #[arg(long)]
    sqlite_path: Option<PathBuf>,

    /// Collection (table) name
    #[arg(long)]
    collection: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the read endpoint and run the daily publish trigger
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Daily publish time (HH:MM)
        #[arg(long)]
        publish_time: Option<String>,

        /// Time zone for the publish time and display timestamps (utc, local)
        #[arg(long)]
        timezone: Option<Zone>,

        /// Publish once immediately on startup
        #[arg(long)]
        publish_on_startup: bool,

        /// Do not run the in-process trigger (publish via `daily-shuffle publish`)
        #[arg(long)]
        no_schedule: bool,

        /// Disable per-request logging
        #[arg(long)]
        no_request_logging: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Publish one shuffle now and exit
    Publish {
        /// Time zone for the display timestamp (utc, local)
        #[arg(long)]
        timezone: Option<Zone>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the latest shuffle as the read endpoint would return it
    Latest {
        #[command(flatten)]
        store: StoreArgs,
    },
}

impl StoreArgs {
    fn apply(self, config: &mut Config) {
        if let Some(backend) = self.store {
            config.store.backend = backend;
        }
        if let Some(path) = self.sqlite_path {
            config.store.sqlite_path = path;
        }
        if let Some(collection) = self.collection {
            config.store.collection = collection;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    tracing::info!("daily-shuffle starting");

    match cli.command {
        Commands::Serve {
            host,
            port,
            publish_time,
            timezone,
            publish_on_startup,
            no_schedule,
            no_request_logging,
            store,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(publish_time) = publish_time {
                config.schedule.publish_time = publish_time;
            }
            if let Some(timezone) = timezone {
                config.schedule.timezone = timezone;
            }
            if publish_on_startup {
                config.schedule.publish_on_startup = true;
            }
            if no_schedule {
                config.schedule.enabled = false;
            }
            if no_request_logging {
                config.server.enable_request_logging = false;
            }
            store.apply(&mut config);

            tracing::info!(
                host = %config.server.host,
                port = %config.server.port,
                store = %config.store.backend,
                schedule = config.schedule.enabled,
                "Starting serve command"
            );
            commands::serve(config).await?;
        }

        Commands::Publish { timezone, store } => {
            if let Some(timezone) = timezone {
                config.schedule.timezone = timezone;
            }
            store.apply(&mut config);

            tracing::info!(store = %config.store.backend, "Starting publish command");
            commands::publish(config).await?;
        }

        Commands::Latest { store } => {
            store.apply(&mut config);
            commands::latest(config).await?;
        }
    }

    tracing::info!("daily-shuffle completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("daily_shuffle=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("daily_shuffle={level},tower_http={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
