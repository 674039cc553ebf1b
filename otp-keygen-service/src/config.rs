// File:    config.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Reads and writes the JSON configuration file of the key generator service.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::server::DEFAULT_PORT;
use otp_keygen_core::{CollisionPolicy, KeyRequestHandler};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be opened, read or written.
    #[error("configuration file error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the key generator service.
///
/// Every key is optional in the file; missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Address to bind to.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Directory key files are written to.
    pub key_dir: PathBuf,
    /// What to do when a derived key file already exists.
    pub collision: CollisionPolicy,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            key_dir: PathBuf::from("."),
            collision: CollisionPolicy::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    /// The socket address the service binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Builds the request handler these settings describe.
    #[must_use]
    pub fn handler(&self) -> KeyRequestHandler {
        KeyRequestHandler::new(self.key_dir.clone()).with_collision_policy(self.collision)
    }
}

/// Reads a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Reads a configuration file, falling back to defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    match read(path) {
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        result => result,
    }
}

/// Writes the default configuration to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_default(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &Config::default())?;
    writer.flush()?;
    Ok(())
}
