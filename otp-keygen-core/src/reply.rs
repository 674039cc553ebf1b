// File:    reply.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The two-part reply (status tag and payload) returned for every key request.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The status tag of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The key was generated; the payload is the key file name.
    Success,
    /// The request failed; the payload is a diagnostic message.
    Error,
}

impl Status {
    /// The ASCII tag sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status tag is neither `success` nor `error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown reply status '{0}'")]
pub struct UnknownStatus(String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A status tag together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Whether the request succeeded.
    pub status: Status,
    /// The key file name on success, a diagnostic otherwise.
    pub payload: String,
}

impl Reply {
    /// Builds a reply from its parts.
    pub fn new(status: Status, payload: impl Into<String>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    /// Builds an error reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }

    /// Whether this reply reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
