#![deny(missing_docs)]
//! A command-line client for the OTP key generator service.

use clap::{Parser, Subcommand};
use log::{error, info};
use otp_keygen_core::{Status, key_generator};
use otp_keygen_service::KeyGenClient;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Ask a running service for a key matching ./message.txt\notp-keygen request ./message.txt\n\n# Ask a service on another port\notp-keygen request ./message.txt --endpoint 127.0.0.1:6000\n\n# Generate a 32 character key locally\notp-keygen generate --length 32 --output ./key.txt"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a key from a running key generator service
    Request {
        /// Path of the input file, as seen by the service
        #[arg()]
        file: String,

        /// Address of the key generator service
        #[arg(short, long, value_name = "HOST:PORT", default_value = "127.0.0.1:5555")]
        endpoint: String,
    },
    /// Generate a key locally without contacting the service
    Generate {
        /// The number of key symbols to generate
        #[arg(short, long)]
        length: usize,

        /// File to write the key to. If omitted, the key is written to stdout.
        #[arg(short, long, value_name = "OUTPUT_FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Request { file, endpoint } => {
            info!("Requesting key generation for file: {file}");
            let mut client = KeyGenClient::connect(endpoint.as_str()).await.unwrap_or_else(|e| {
                error!("{e}");
                std::process::exit(1);
            });
            let reply = client.request(&file).await.unwrap_or_else(|e| {
                error!("Failed to request key: {e}");
                std::process::exit(1);
            });

            match reply.status {
                Status::Success => {
                    println!("Key generated successfully!");
                    println!("Key saved to: {}", reply.payload);
                }
                Status::Error => {
                    error!("Error: {}", reply.payload);
                    std::process::exit(1);
                }
            }
        }
        Commands::Generate { length, output } => {
            let key = key_generator::generate(length).unwrap_or_else(|e| {
                error!("Failed to generate key: {e}");
                std::process::exit(1);
            });

            let written = match &output {
                Some(path) => fs::write(path, &key),
                None => io::stdout().write_all(key.as_bytes()),
            };
            if let Err(e) = written {
                error!("Failed to write key: {e}");
                std::process::exit(1);
            }

            info!(
                "Generated {length} key symbols (sha256 {})",
                key_generator::fingerprint(&key)
            );
            if let Some(path) = output {
                info!("Key saved to '{}'", path.display());
            }
        }
    }
}
