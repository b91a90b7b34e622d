//! # Store Error Types
//!
//! This module defines error types specific to key-value store operations.
//! Backends translate their native failures into these variants so the cache
//! and replay layers never depend on a particular store client.

use std::fmt;

/// Error type for key-value store operations
///
/// ## Error Categories
///
/// - `Connection`: The store could not be reached (refused, io failure, timeout)
/// - `Command`: The store rejected a command (e.g. `INCR` on a non-integer)
/// - `WrongType`: A list command hit a string key, or the other way around
/// - `LockError`: Failed to acquire the in-process store lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    ///
    /// Raised for refused connections, broken sockets and connect timeouts.
    /// No retry happens at this layer.
    Connection(String),

    /// The store executed the command and answered with an error
    Command(String),

    /// Operation against a key holding the wrong kind of value
    ///
    /// Mirrors Redis' `WRONGTYPE` reply: list operations only work on list keys
    /// and string operations only work on string keys.
    WrongType(String),

    /// Failed to acquire lock on store
    ///
    /// This error occurs when the store lock is poisoned, which means another
    /// thread panicked while holding it.
    LockError(String),
}

impl StoreError {
    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        StoreError::Connection(msg.into())
    }

    /// Create a new command error
    pub fn command<S: Into<String>>(msg: S) -> Self {
        StoreError::Command(msg.into())
    }

    /// Create a new wrong type error for the given key
    pub fn wrong_type<S: Into<String>>(key: S) -> Self {
        StoreError::WrongType(format!(
            "Operation against key '{}' holding the wrong kind of value",
            key.into()
        ))
    }

    /// Create a new lock error
    pub fn lock_error<S: Into<String>>(msg: S) -> Self {
        StoreError::LockError(msg.into())
    }

    /// Whether the failure happened before the store saw the command
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Connection error: {msg}"),
            StoreError::Command(msg) => write!(f, "Command error: {msg}"),
            StoreError::WrongType(msg) => write!(f, "Wrong type: {msg}"),
            StoreError::LockError(msg) => write!(f, "Lock error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() || err.is_timeout() {
            StoreError::connection(err.to_string())
        } else {
            StoreError::command(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_message() {
        let error = StoreError::wrong_type("history");
        assert_eq!(
            error.to_string(),
            "Wrong type: Operation against key 'history' holding the wrong kind of value"
        );
    }

    #[test]
    fn test_is_connection() {
        assert!(StoreError::connection("refused").is_connection());
        assert!(!StoreError::command("bad").is_connection());
    }
}
