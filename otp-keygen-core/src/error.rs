// File:    error.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Error taxonomy for measuring inputs, generating keys and persisting key files.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use thiserror::Error;

/// Everything that can go wrong while serving one key request.
#[derive(Error, Debug)]
pub enum KeyGenError {
    /// The input file named by the request does not exist.
    #[error("Input file not found")]
    InputNotFound,

    /// Reading the input or writing the key file failed.
    #[error("Error generating key: {0}")]
    Io(#[from] std::io::Error),

    /// The operating system random source could not be read.
    #[error("Error generating key: random source failure: {0}")]
    Entropy(String),

    /// The derived key file exists and the collision policy forbids overwriting it.
    #[error("Error generating key: key file {0} already exists")]
    KeyExists(String),
}
