// File:    server.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The key generator serving loop: accepts clients and answers their requests strictly one at a time.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::wire::{self, Frames, WireError};
use log::{error, info, warn};
use otp_keygen_core::{KeyRequestHandler, Reply};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use uuid::Uuid;

/// Default port the service listens on.
pub const DEFAULT_PORT: u16 = 5555;

// Received messages waiting for their turn.
const QUEUE_DEPTH: usize = 16;

/// A message read from one client, waiting to be answered.
///
/// The connection's write half travels with it and is handed back once the
/// reply is sent, so a client cannot have two requests queued.
struct Job {
    peer: SocketAddr,
    message: Result<Frames, WireError>,
    writer: OwnedWriteHalf,
    give_back: oneshot::Sender<OwnedWriteHalf>,
}

/// A bound key generator endpoint.
///
/// Any number of clients may stay connected. Their requests are answered one
/// at a time: each is fully handled and its reply written before the next
/// one, from any client, is taken up. At most one request is ever in flight.
#[derive(Debug)]
pub struct KeyGenService {
    listener: TcpListener,
    handler: Arc<KeyRequestHandler>,
}

impl KeyGenService {
    /// Binds the service to `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: impl ToSocketAddrs, handler: KeyRequestHandler) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handler: Arc::new(handler),
        })
    }

    /// The address the service is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be queried.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the listening socket cannot be queried.
    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serves requests until `shutdown` completes.
    ///
    /// The signal is only observed between requests; a request that has been
    /// taken up is always answered first. Open client connections are closed
    /// on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error if the listening socket cannot be queried.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Key Generator Service is running on {}", self.local_addr()?);

        let (queue, mut jobs) = mpsc::channel(QUEUE_DEPTH);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Client connected from {peer}");
                        let (reader, writer) = stream.into_split();
                        connections.spawn(read_requests(reader, writer, peer, queue.clone()));
                    }
                    Err(e) => warn!("Failed to accept connection: {e}"),
                },
                Some(job) = jobs.recv() => self.answer(job).await,
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        connections.shutdown().await;
        info!("Key Generator Service stopped");
        Ok(())
    }

    async fn answer(&self, job: Job) {
        let Job {
            peer,
            message,
            mut writer,
            give_back,
        } = job;
        let request_id = Uuid::new_v4();

        let (reply, keep_open) = match message {
            Ok(frames) => match wire::parse_request(frames) {
                Ok(request) => {
                    info!("[{request_id}] Received request for file: {request}");
                    (self.process(request).await, true)
                }
                Err(e) => {
                    warn!("[{request_id}] Malformed request from {peer}: {e}");
                    (Reply::error(format!("Malformed request: {e}")), true)
                }
            },
            Err(e) => {
                // The rest of the oversized message is still unread, so the
                // connection cannot continue after this reply.
                warn!("[{request_id}] Rejecting message from {peer}: {e}");
                (Reply::error(format!("Malformed request: {e}")), false)
            }
        };

        let sent = match wire::encode_reply_or_fallback(&reply) {
            Ok(encoded) => wire::write_encoded(&mut writer, &encoded).await,
            Err(e) => Err(e),
        };
        match sent {
            Ok(()) if keep_open => {
                let _ = give_back.send(writer);
            }
            Ok(()) => info!("[{request_id}] Closing connection to {peer}"),
            Err(e) => error!("[{request_id}] Error processing request: {e}"),
        }
    }

    async fn process(&self, request: String) -> Reply {
        let handler = Arc::clone(&self.handler);
        match tokio::task::spawn_blocking(move || handler.handle(&request)).await {
            Ok(outcome) => outcome.into(),
            Err(e) => Reply::error(format!("Error generating key: {e}")),
        }
    }
}

/// Reads one client's messages and queues them for the serving loop.
///
/// After queuing a message the task waits for its write half to come back,
/// which only happens once the reply has been written.
async fn read_requests(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    peer: SocketAddr,
    queue: mpsc::Sender<Job>,
) {
    loop {
        let message = match wire::read_message(&mut reader).await {
            Ok(Some(frames)) => Ok(frames),
            Ok(None) => {
                info!("Client {peer} disconnected");
                return;
            }
            Err(e) if e.is_transport() => {
                warn!("Dropping client {peer}: {e}");
                return;
            }
            Err(e) => Err(e),
        };

        let (give_back, returned) = oneshot::channel();
        let job = Job {
            peer,
            message,
            writer,
            give_back,
        };
        if queue.send(job).await.is_err() {
            return;
        }
        writer = match returned.await {
            Ok(writer) => writer,
            Err(_) => return,
        };
    }
}
