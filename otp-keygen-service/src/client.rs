// File:    client.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: A client that sends key requests to the service and decodes its replies.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::wire::{self, Frames, WireError};
use otp_keygen_core::reply::UnknownStatus;
use otp_keygen_core::{Reply, Status};
use std::io;
use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};

/// Errors raised while talking to the service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service could not be reached.
    #[error("failed to connect to the key generator service: {0}")]
    Connect(#[source] io::Error),

    /// Sending the request or receiving the reply failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The service closed the connection without replying.
    #[error("the key generator service closed the connection without replying")]
    Disconnected,

    /// A reply must consist of exactly two frames.
    #[error("expected a 2 frame reply, got {0} frames")]
    FrameCount(usize),

    /// The reply is not valid UTF-8.
    #[error("reply is not valid UTF-8")]
    NotUtf8,

    /// The status tag is not one the protocol defines.
    #[error(transparent)]
    Status(#[from] UnknownStatus),
}

/// A connection to a key generator service.
///
/// Requests on one client are strictly sequential: [`request`](Self::request)
/// waits for the reply before it returns.
#[derive(Debug)]
pub struct KeyGenClient {
    stream: TcpStream,
}

impl KeyGenClient {
    /// Connects to the service at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the connection cannot be established.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await.map_err(ClientError::Connect)?;
        Ok(Self { stream })
    }

    /// Asks the service to generate a key for the input file at `path`.
    ///
    /// The path is resolved by the service, not by the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the reply is malformed. An
    /// `error` reply from the service is not an error here; it is returned as a
    /// [`Reply`] with [`Status::Error`].
    pub async fn request(&mut self, path: &str) -> Result<Reply, ClientError> {
        wire::write_message(&mut self.stream, &[path.as_bytes()]).await?;
        let frames = wire::read_message(&mut self.stream)
            .await?
            .ok_or(ClientError::Disconnected)?;
        parse_reply(frames)
    }
}

/// Decodes a two frame reply.
///
/// # Errors
///
/// Returns an error unless the message is a known status tag followed by a
/// UTF-8 payload.
pub fn parse_reply(frames: Frames) -> Result<Reply, ClientError> {
    let [status, payload]: [Vec<u8>; 2] = frames
        .try_into()
        .map_err(|frames: Frames| ClientError::FrameCount(frames.len()))?;

    let status: Status = std::str::from_utf8(&status)
        .map_err(|_| ClientError::NotUtf8)?
        .parse()?;
    let payload = String::from_utf8(payload).map_err(|_| ClientError::NotUtf8)?;

    Ok(Reply::new(status, payload))
}
