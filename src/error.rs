//! Error types for the location relay.
//!
//! This module provides a unified error type [`RelayError`] covering every
//! failure the relay can observe while admitting channels, decoding frames,
//! consulting the booking directory, and pushing updates.
//!
//! # Design
//!
//! The error hierarchy is organized by layer:
//! - [`RelayError::ConfigError`]: Configuration and environment issues
//! - [`RelayError::DirectoryError`]: Booking directory / storage failures
//! - [`RelayError::ProtocolError`]: Malformed channel frames
//! - [`RelayError::HandshakeError`]: Unidentifiable channel handshakes
//! - [`RelayError::ChannelError`]: Transport-level channel failures
//! - [`RelayError::ClientError`]: Client-side connection and fallback failures
//!
//! None of these reach a watching customer on the channel path; they are
//! traced at the boundary that detected them.
//!
//! # Example
//!
//! ```
//! use location_relay::error::{RelayError, RelayResult};
//!
//! fn require_positive(id: i64) -> RelayResult<i64> {
//!     if id <= 0 {
//!         return Err(RelayError::handshake("id must be positive", None));
//!     }
//!     Ok(id)
//! }
//! ```

use std::fmt;

/// Result type alias using [`RelayError`].
pub type RelayResult<T> = Result<T, RelayError>;

/// Boxed source error carried by most variants.
type Source = Option<Box<dyn std::error::Error + Send + Sync>>;

/// Unified error type for the location relay.
#[derive(Debug)]
pub enum RelayError {
    /// Configuration or environment variable errors.
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },

    /// Booking directory errors.
    ///
    /// Variants include:
    /// - Store unavailable
    /// - Query execution errors
    /// - Migration failures
    DirectoryError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },

    /// Channel frame decoding errors.
    ///
    /// Raised for non-JSON text, unknown `type` tags, and payloads with
    /// missing or non-numeric coordinate fields.
    ProtocolError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },

    /// Handshake parameters could not be resolved to an identity.
    HandshakeError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },

    /// Transport-level channel errors.
    ChannelError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },

    /// Client-side connection or HTTP fallback errors.
    ClientError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Source,
    },
}

impl RelayError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use location_relay::error::RelayError;
    ///
    /// let err = RelayError::config("PORT must be a number", None);
    /// assert!(matches!(err, RelayError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Source) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new directory error.
    ///
    /// # Example
    ///
    /// ```
    /// use location_relay::error::RelayError;
    ///
    /// let err = RelayError::directory("store unavailable", None);
    /// assert!(matches!(err, RelayError::DirectoryError { .. }));
    /// ```
    #[must_use]
    pub fn directory(message: impl Into<String>, source: Source) -> Self {
        Self::DirectoryError {
            message: message.into(),
            source,
        }
    }

    /// Create a new protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>, source: Source) -> Self {
        Self::ProtocolError {
            message: message.into(),
            source,
        }
    }

    /// Create a new handshake error.
    #[must_use]
    pub fn handshake(message: impl Into<String>, source: Source) -> Self {
        Self::HandshakeError {
            message: message.into(),
            source,
        }
    }

    /// Create a new channel error.
    #[must_use]
    pub fn channel(message: impl Into<String>, source: Source) -> Self {
        Self::ChannelError {
            message: message.into(),
            source,
        }
    }

    /// Create a new client error.
    #[must_use]
    pub fn client(message: impl Into<String>, source: Source) -> Self {
        Self::ClientError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::DirectoryError { message, .. } => write!(f, "Directory error: {message}"),
            Self::ProtocolError { message, .. } => write!(f, "Protocol error: {message}"),
            Self::HandshakeError { message, .. } => write!(f, "Handshake error: {message}"),
            Self::ChannelError { message, .. } => write!(f, "Channel error: {message}"),
            Self::ClientError { message, .. } => write!(f, "Client error: {message}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::DirectoryError { source, .. }
            | Self::ProtocolError { source, .. }
            | Self::HandshakeError { source, .. }
            | Self::ChannelError { source, .. }
            | Self::ClientError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
        }
    }
}

/// Convert from `eyre::Report` to `RelayError`.
///
/// The client layer reports with `eyre`; anything that bubbles up from it is
/// categorized as a client error.
impl From<eyre::Report> for RelayError {
    fn from(err: eyre::Report) -> Self {
        Self::ClientError {
            message: format!("{err:#}"),
            source: None,
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::DirectoryError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
