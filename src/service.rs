//! Service layer
//!
//! Routes named operations to handlers and formats replies. All counter
//! failures map to a generic error reply carrying the underlying message;
//! the service never retries — version conflicts are already absorbed
//! inside the counter.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::counter::AtomicCounter;
use crate::protocol::{Command, Response};

/// Dispatches commands against one counter
#[derive(Clone)]
pub struct GopherService {
    counter: Arc<AtomicCounter>,
}

impl GopherService {
    /// Create a service fronting the given counter
    pub fn new(counter: Arc<AtomicCounter>) -> Self {
        Self { counter }
    }

    /// The counter this service fronts
    pub fn counter(&self) -> &AtomicCounter {
        &self.counter
    }

    /// Execute a command and produce the reply to send back
    pub fn dispatch(&self, command: Command, cancel: &CancelToken) -> Response {
        match command {
            Command::Next => match self.counter.next_value(cancel) {
                Ok(id) => Response::ok(Self::format_label(id)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to get next identifier");
                    Response::error(&e.to_string())
                }
            },
            Command::Current => match self.counter.current_value(cancel) {
                Ok(id) => Response::ok(Self::format_label(id)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to read current identifier");
                    Response::error(&e.to_string())
                }
            },
            Command::Ping => Response::ok("pong"),
        }
    }

    /// Zero-padded user-facing label for an issued value
    fn format_label(id: i64) -> String {
        format!("gopher-{:02}", id)
    }
}
