//! Command definitions
//!
//! Represents the named operations a client can request.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Next = 0x01,
    Current = 0x02,
    Ping = 0x03,
}

/// A parsed command
///
/// None of the operations carry a payload: the counter the service fronts
/// is addressed by server configuration, not per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Issue the next sequential identifier
    Next,

    /// Read the current counter value without incrementing
    Current,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Next => CommandType::Next,
            Command::Current => CommandType::Current,
            Command::Ping => CommandType::Ping,
        }
    }
}
