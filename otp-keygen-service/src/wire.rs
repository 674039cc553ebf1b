// File:    wire.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Multipart message framing shared by the service and its clients.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Multipart message framing.
//!
//! A message is a 4-byte big-endian frame count followed by each frame as a
//! 4-byte big-endian length and its bytes. Requests carry one frame (the input
//! path); replies carry two (status tag and payload).

use log::warn;
use otp_keygen_core::Reply;
use std::io::ErrorKind;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum number of frames accepted in one message.
pub const MAX_FRAMES: u32 = 16;
/// Maximum size of a single frame in bytes.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

/// A multipart message as received from the wire.
pub type Frames = Vec<Vec<u8>>;

/// Framing and transport errors.
#[derive(Error, Debug)]
pub enum WireError {
    /// The underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A message announced more frames than allowed.
    #[error("message has {0} frames, at most {max} allowed", max = MAX_FRAMES)]
    TooManyFrames(usize),

    /// A frame is larger than allowed.
    #[error("frame of {0} bytes exceeds the {max} byte limit", max = MAX_FRAME_LEN)]
    FrameTooLarge(usize),

    /// The peer closed the stream part way through a message.
    #[error("connection closed in the middle of a message")]
    Truncated,
}

impl WireError {
    /// Whether the stream can no longer be trusted to be at a message boundary.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Truncated)
    }
}

/// Why a received message is not a valid request.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedRequest {
    /// A request must consist of exactly one frame.
    #[error("expected 1 frame, got {0}")]
    FrameCount(usize),

    /// The path frame is not valid UTF-8.
    #[error("request is not valid UTF-8")]
    NotUtf8,
}

/// Encodes frames into a single buffer.
///
/// # Errors
///
/// Returns [`WireError::TooManyFrames`] or [`WireError::FrameTooLarge`] if the
/// message exceeds the protocol limits.
pub fn encode_message(frames: &[&[u8]]) -> Result<Vec<u8>, WireError> {
    let count = u32::try_from(frames.len())
        .ok()
        .filter(|&n| n <= MAX_FRAMES)
        .ok_or(WireError::TooManyFrames(frames.len()))?;

    let body: usize = frames.iter().map(|frame| 4 + frame.len()).sum();
    let mut buffer = Vec::with_capacity(4 + body);
    buffer.extend_from_slice(&count.to_be_bytes());
    for frame in frames {
        let len = u32::try_from(frame.len())
            .ok()
            .filter(|&n| n <= MAX_FRAME_LEN)
            .ok_or(WireError::FrameTooLarge(frame.len()))?;
        buffer.extend_from_slice(&len.to_be_bytes());
        buffer.extend_from_slice(frame);
    }

    Ok(buffer)
}

/// Writes one message and flushes the stream.
///
/// # Errors
///
/// Returns an error if the message exceeds the protocol limits or the stream fails.
pub async fn write_message<W>(writer: &mut W, frames: &[&[u8]]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let buffer = encode_message(frames)?;
    write_encoded(writer, &buffer).await
}

/// Writes an already encoded message and flushes the stream.
///
/// # Errors
///
/// Returns [`WireError::Io`] if the stream fails.
pub async fn write_encoded<W>(writer: &mut W, buffer: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(buffer).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one message.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new message starts.
///
/// # Errors
///
/// Returns an error if the stream fails, ends inside a message, or the
/// message exceeds the protocol limits.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Frames>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    if reader.read(&mut header[..1]).await? == 0 {
        return Ok(None);
    }
    read_exact(reader, &mut header[1..]).await?;

    let count = u32::from_be_bytes(header) as usize;
    if count > MAX_FRAMES as usize {
        return Err(WireError::TooManyFrames(count));
    }

    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        read_exact(reader, &mut header).await?;
        let len = u32::from_be_bytes(header) as usize;
        if len > MAX_FRAME_LEN as usize {
            return Err(WireError::FrameTooLarge(len));
        }
        let mut frame = vec![0u8; len];
        read_exact(reader, &mut frame).await?;
        frames.push(frame);
    }

    Ok(Some(frames))
}

async fn read_exact<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), WireError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(WireError::Truncated),
        Err(e) => Err(e.into()),
    }
}

/// Extracts the input path from a request message.
///
/// # Errors
///
/// Returns [`MalformedRequest`] unless the message is exactly one UTF-8 frame.
pub fn parse_request(mut frames: Frames) -> Result<String, MalformedRequest> {
    if frames.len() != 1 {
        return Err(MalformedRequest::FrameCount(frames.len()));
    }
    String::from_utf8(frames.remove(0)).map_err(|_| MalformedRequest::NotUtf8)
}

/// Encodes a reply as its two frames.
///
/// # Errors
///
/// Returns [`WireError::FrameTooLarge`] if the payload exceeds the frame limit.
pub fn encode_reply(reply: &Reply) -> Result<Vec<u8>, WireError> {
    encode_message(&[reply.status.as_str().as_bytes(), reply.payload.as_bytes()])
}

/// Encodes a reply, substituting a generic error reply if it cannot be encoded.
///
/// # Errors
///
/// Returns an error only if the generic error reply cannot be encoded either.
pub fn encode_reply_or_fallback(reply: &Reply) -> Result<Vec<u8>, WireError> {
    encode_reply(reply).or_else(|e| {
        warn!("Reply could not be encoded, sending generic error: {e}");
        encode_reply(&Reply::error(format!("Error sending reply: {e}")))
    })
}
