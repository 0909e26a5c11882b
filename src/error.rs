//! Error and Result types.

use std::io;

/// A specialized `Result` type for mysql-shim.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The ways a connection can fail in a manner the protocol cannot recover
/// from. Application-level failures travel as [`SqlError`] instead and are
/// answered with an ERR packet without tearing the connection down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error communicating on the underlying byte stream.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed frame, out-of-order sequence id, or truncated packet.
    ///
    /// Fatal: the connection closes silently if this happens before the
    /// handshake completes, and with ERR 1152 afterwards.
    #[error("protocol error: {0}")]
    Protocol(Box<str>),

    /// The client failed authentication. Answered with ERR 1045 before the
    /// connection closes.
    #[error("access denied for user '{0}'")]
    AccessDenied(Box<str>),
}

impl Error {
    pub(crate) fn access_denied(username: &str) -> Self {
        Error::AccessDenied(username.into())
    }
}

macro_rules! protocol_err (
    ($($args:tt)*) => {
        $crate::error::Error::Protocol(format!($($args)*).into_boxed_str())
    }
);

/// An application-level error carried on the wire as an ERR packet.
///
/// Session callbacks return this to fail a single command; the connection
/// stays in the command loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} ({sqlstate}): {message}")]
pub struct SqlError {
    /// Error code from the MySQL error catalog.
    pub code: u16,
    /// Five-character SQLSTATE.
    pub sqlstate: String,
    pub message: String,
}

impl SqlError {
    pub fn new(code: u16, sqlstate: &str, message: impl Into<String>) -> Self {
        debug_assert_eq!(sqlstate.len(), 5);

        Self {
            code,
            sqlstate: sqlstate.into(),
            message: message.into(),
        }
    }

    /// ER_ACCESS_DENIED_ERROR
    pub fn access_denied(username: &str, host: &str) -> Self {
        Self::new(
            1045,
            "28000",
            format!("Access denied for user '{}'@'{}'", username, host),
        )
    }

    /// ER_BAD_DB_ERROR
    pub fn unknown_database(database: &str) -> Self {
        Self::new(1049, "42000", format!("Unknown database '{}'", database))
    }

    /// ER_UNKNOWN_COM_ERROR
    pub fn unknown_command(opcode: u8) -> Self {
        Self::new(1047, "HY000", format!("Unknown command 0x{:02X}", opcode))
    }

    /// ER_UNKNOWN_ERROR
    pub fn unknown_error(message: impl Into<String>) -> Self {
        Self::new(1105, "HY000", message)
    }

    /// ER_ABORTING_CONNECTION
    pub fn aborting_connection(connection_id: u32, message: &str) -> Self {
        Self::new(
            1152,
            "08S01",
            format!("Aborted connection {} ({})", connection_id, message),
        )
    }

    /// ER_UNKNOWN_STMT_HANDLER
    pub fn unknown_statement(statement_id: u32, command: &str) -> Self {
        Self::new(
            1243,
            "HY000",
            format!("Unknown prepared statement handler ({}) given to {}", statement_id, command),
        )
    }

    /// ER_FEATURE_DISABLED
    pub fn feature_disabled(feature: &str) -> Self {
        Self::new(
            1289,
            "HY000",
            format!("The '{}' feature is disabled", feature),
        )
    }
}
