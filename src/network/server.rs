//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{GopherError, Result};
use crate::network::Connection;
use crate::service::GopherService;

/// How often the acceptor and idle workers re-check the shutdown token
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for gopherd
pub struct Server {
    config: Config,
    service: GopherService,
    listener: TcpListener,
    shutdown: CancelToken,
}

impl Server {
    /// Bind the listener and prepare the server.
    ///
    /// Binding to port 0 picks an ephemeral port; see [`Server::local_addr`].
    pub fn bind(config: Config, service: GopherService) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            GopherError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            service,
            listener,
            shutdown: CancelToken::new(),
        })
    }

    /// The address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Token that stops the accept loop and in-flight handlers when cancelled
    pub fn shutdown_token(&self) -> CancelToken {
        self.shutdown.clone()
    }

    /// Run the server (blocking until the shutdown token is cancelled).
    ///
    /// A single acceptor thread (the caller) feeds accepted streams to a
    /// fixed pool of worker threads over a bounded channel; a full queue
    /// applies backpressure at accept time.
    pub fn run(self) -> Result<()> {
        let (tx, rx): (Sender<TcpStream>, Receiver<TcpStream>) =
            bounded(self.config.max_pending_connections);

        tracing::info!(
            addr = %self.local_addr()?,
            workers = self.config.worker_threads,
            "server listening"
        );

        // Worker pool: each thread drains the channel until it closes
        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for worker_id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let service = self.service.clone();
            let shutdown = self.shutdown.clone();
            let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

            workers.push(
                thread::Builder::new()
                    .name(format!("gopherd-worker-{}", worker_id))
                    .spawn(move || loop {
                        match rx.recv_timeout(POLL_INTERVAL) {
                            Ok(stream) => {
                                handle_stream(stream, &service, &shutdown, read_ms, write_ms);
                            }
                            Err(RecvTimeoutError::Timeout) => {
                                if shutdown.is_cancelled() {
                                    break;
                                }
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    })?,
            );
        }
        drop(rx);

        // Non-blocking accept so the loop can observe shutdown
        self.listener.set_nonblocking(true)?;

        while !self.shutdown.is_cancelled() {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    // Accepted streams must block; only the listener polls
                    stream.set_nonblocking(false)?;

                    let mut pending = stream;
                    loop {
                        match tx.send_timeout(pending, POLL_INTERVAL) {
                            Ok(()) => break,
                            Err(crossbeam_channel::SendTimeoutError::Timeout(s)) => {
                                if self.shutdown.is_cancelled() {
                                    break;
                                }
                                pending = s;
                            }
                            Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => break,
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }

        tracing::info!("server shutting down");

        // Close the queue and wait for workers to finish their connections
        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }

        Ok(())
    }
}

/// Wrap a stream in a connection handler and run it to completion
fn handle_stream(
    stream: TcpStream,
    service: &GopherService,
    shutdown: &CancelToken,
    read_ms: u64,
    write_ms: u64,
) {
    let mut connection = match Connection::new(stream, service.clone(), shutdown.clone()) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::warn!("connection to {} ended with error: {}", connection.peer_addr(), e);
    }
}
