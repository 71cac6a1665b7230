//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool fed over a bounded channel
//! - Commands routed through GopherService

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
