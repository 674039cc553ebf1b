// File:    lib.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The main library crate for otp-keygen-core, tying together key generation, key file persistence and request handling.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # OTP Key Generator Core Library
//!
//! This library generates one-time pad keys whose length matches an input file,
//! persists them as `key_<stem>.txt` files and reports the outcome of each request.

/// Error types shared by the key generation pipeline.
pub mod error;
/// The request handler that turns an input path into a persisted key.
pub mod handler;
/// Naming, measuring and writing of key files.
pub mod key_file;
/// Random key generation over the printable ASCII alphabet.
pub mod key_generator;
/// Reply status and payload sent back to clients.
pub mod reply;

pub use error::KeyGenError;
pub use handler::{KeyRequestHandler, Outcome};
pub use key_file::CollisionPolicy;
pub use reply::{Reply, Status};
