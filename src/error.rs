//! Error types for the docconv-client library.
//!
//! Every fallible operation returns [`ConverterError`]. The variants map onto
//! the failure classes a caller can act on differently:
//!
//! * [`ConverterError::Validation`]: a local precondition failed (wrong file
//!   count, type or size). Nothing was sent over the wire.
//! * [`ConverterError::Connectivity`]: the backend could not be reached or
//!   answered with a 5xx. Retrying later may help.
//! * [`ConverterError::Protocol`]: the backend answered, but not in the
//!   shape this client expects (404 on `/health`, malformed JSON).
//! * [`ConverterError::RemoteRejection`]: the backend explained why it
//!   refused this particular file; the detail is shown verbatim.
//! * [`ConverterError::NotFound`]: a download target is missing or expired.
//! * [`ConverterError::UnknownFailure`]: anything not classified above.
//!
//! Transport outcomes are classified in exactly one place,
//! [`crate::transport::classify`], so the taxonomy cannot drift between
//! operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ConverterError> = std::result::Result<T, E>;

/// All errors returned by the docconv-client library.
#[derive(Debug, Error)]
pub enum ConverterError {
    // ── Local errors ──────────────────────────────────────────────────────
    /// A local precondition failed; no request was made.
    #[error("{0}")]
    Validation(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A local input file could not be read.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write a downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The transport could not establish or complete the exchange.
    #[error("{message}")]
    Connectivity {
        message: String,
        reason: ConnectivityReason,
    },

    /// The endpoint is reachable but answered with an unexpected status or body.
    #[error("{message}")]
    Protocol { message: String, status: u16 },

    /// The backend returned a structured `detail` explaining the rejection.
    #[error("{detail}")]
    RemoteRejection { detail: String, status: u16 },

    /// The requested download does not exist (or the retention window passed).
    #[error("{message}")]
    NotFound { message: String, filename: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Anything not classified above.
    #[error("{message}")]
    UnknownFailure { message: String },
}

impl ConverterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::UnknownFailure {
            message: msg.into(),
        }
    }

    /// True when the failure was detected locally, before any network I/O.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidConfig(_)
                | Self::FileRead { .. }
                | Self::OutputWriteFailed { .. }
        )
    }

    /// The connectivity reason, if this is a [`ConverterError::Connectivity`].
    pub fn connectivity_reason(&self) -> Option<&ConnectivityReason> {
        match self {
            Self::Connectivity { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Why the backend could not be reached.
///
/// Carried by every [`ConverterError::Connectivity`], whichever operation
/// produced it; only the human-readable message differs per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityReason {
    /// The host actively refused the TCP connection.
    ConnectionRefused,
    /// DNS resolution for the configured host failed.
    HostNotFound,
    /// No response within the operation's timeout.
    TimedOut,
    /// The backend answered with a 5xx status and no structured detail.
    ServerError { status: u16 },
    /// Any other transport-level failure.
    Other(String),
}

impl fmt::Display for ConnectivityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionRefused => f.write_str("connection refused"),
            Self::HostNotFound => f.write_str("host not found"),
            Self::TimedOut => f.write_str("timed out"),
            Self::ServerError { status } => write!(f, "server error (HTTP {status})"),
            Self::Other(detail) => write!(f, "transport error: {detail}"),
        }
    }
}
