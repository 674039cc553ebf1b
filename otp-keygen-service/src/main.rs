#![deny(missing_docs)]
//! The key generator service: answers key requests over TCP until interrupted.

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use otp_keygen_core::CollisionPolicy;
use otp_keygen_service::{KeyGenService, config};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Write a default configuration file\notp-keygen-service init\n\n# Serve on the default port, writing keys to the working directory\notp-keygen-service\n\n# Serve on port 6000, writing keys to ./keys and refusing to overwrite keys\notp-keygen-service --port 6000 --key-dir ./keys --fail-on-collision"
)]
struct Cli {
    /// Configuration file to use
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "OTP_KEYGEN_CONFIG",
        default_value = "otp-keygen.json"
    )]
    config: PathBuf,

    /// Address to bind to. Overrides the configuration file.
    #[arg(long, value_name = "ADDR")]
    bind: Option<IpAddr>,

    /// Port to listen on. Overrides the configuration file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory key files are written to. Overrides the configuration file.
    #[arg(long, value_name = "DIR")]
    key_dir: Option<PathBuf>,

    /// Fail requests whose key file already exists instead of overwriting it.
    #[arg(long)]
    fail_on_collision: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file and exit
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        config::write_default(&cli.config)
            .with_context(|| format!("failed to write '{}'", cli.config.display()))?;
        println!("Default config written to {}", cli.config.display());
        return Ok(());
    }

    let mut config = config::read_or_default(&cli.config)
        .with_context(|| format!("failed to read '{}'", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(key_dir) = cli.key_dir {
        config.key_dir = key_dir;
    }
    if cli.fail_on_collision {
        config.collision = CollisionPolicy::Fail;
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level)).init();
    info!(
        "Writing keys to '{}' ({:?} on collision)",
        config.key_dir.display(),
        config.collision
    );

    let service = KeyGenService::bind(config.socket_addr(), config.handler())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;

    service
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
