// File:    handler.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Resolves one key request: measure the input, generate a matching key, persist it and report the outcome.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::error::KeyGenError;
use crate::key_file::{self, CollisionPolicy};
use crate::key_generator;
use crate::reply::{Reply, Status};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Message sent back when the requested input does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Input file not found";

/// The result of handling one key request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A key was written; holds the key file name.
    Generated(String),
    /// The input file does not exist. No key file was created.
    NotFound,
    /// Measuring, generating or writing failed; holds the diagnostic.
    Failure(String),
}

impl From<Result<String, KeyGenError>> for Outcome {
    fn from(result: Result<String, KeyGenError>) -> Self {
        match result {
            Ok(key_name) => Self::Generated(key_name),
            Err(KeyGenError::InputNotFound) => Self::NotFound,
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Generated(key_name) => Self::new(Status::Success, key_name),
            Outcome::NotFound => Self::error(NOT_FOUND_MESSAGE),
            Outcome::Failure(detail) => Self::error(detail),
        }
    }
}

/// Turns input paths into persisted, length-matched keys.
///
/// The handler holds no per-request state; each call to [`handle`](Self::handle)
/// creates or replaces at most one key file in the key directory.
#[derive(Debug, Clone)]
pub struct KeyRequestHandler {
    key_dir: PathBuf,
    collision: CollisionPolicy,
}

impl Default for KeyRequestHandler {
    fn default() -> Self {
        Self::new(".")
    }
}

impl KeyRequestHandler {
    /// Creates a handler that writes key files into `key_dir` and overwrites on collision.
    pub fn new(key_dir: impl Into<PathBuf>) -> Self {
        Self {
            key_dir: key_dir.into(),
            collision: CollisionPolicy::Overwrite,
        }
    }

    /// Sets the policy applied when a derived key file already exists.
    #[must_use]
    pub const fn with_collision_policy(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// The directory key files are written to.
    #[must_use]
    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    /// The active collision policy.
    #[must_use]
    pub const fn collision_policy(&self) -> CollisionPolicy {
        self.collision
    }

    /// Handles a request naming an input file.
    ///
    /// Every failure is folded into the returned [`Outcome`]; this never panics
    /// on bad input.
    pub fn handle(&self, request: &str) -> Outcome {
        let outcome = Outcome::from(self.try_handle(request));
        match &outcome {
            Outcome::Generated(key_name) => info!("Key for '{request}' saved to '{key_name}'"),
            Outcome::NotFound => warn!("Input file '{request}' not found"),
            Outcome::Failure(detail) => warn!("Request for '{request}' failed: {detail}"),
        }
        outcome
    }

    fn try_handle(&self, request: &str) -> Result<String, KeyGenError> {
        let length = key_file::measure_input(Path::new(request))?;
        let key_name = key_file::key_file_name(request);
        key_file::check_collision(&self.key_dir, &key_name, self.collision)?;

        let key = key_generator::generate(length)?;
        key_file::write_key(&self.key_dir, &key_name, &key)?;
        debug!(
            "Wrote {length} key symbols to '{key_name}' (sha256 {})",
            key_generator::fingerprint(&key)
        );

        Ok(key_name)
    }
}
