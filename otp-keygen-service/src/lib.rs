// File:    lib.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The main library crate for otp-keygen-service, exposing the wire format, the serving loop, the client and configuration.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # OTP Key Generator Service
//!
//! A request/reply service that answers each input path with a freshly
//! generated, length-matched one-time pad key file.

/// Client side of the request/reply exchange.
pub mod client;
/// Configuration file handling.
pub mod config;
/// The serving loop.
pub mod server;
pub mod wire;

pub use client::KeyGenClient;
pub use config::Config;
pub use server::KeyGenService;
