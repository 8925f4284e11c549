// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for cookiefetch
//!
//! Every failure surfaces to the caller as a typed error. Nothing in the
//! crate retries or substitutes a default value.

use thiserror::Error;

/// Result type alias for cookiefetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cookiefetch
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failed to reach the host (DNS, connect, TLS, read)
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Raw response had no parsable status line
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A cookie-jar data line could not be decoded
    #[error("Malformed cookie file at line {line}: {reason} ({content:?})")]
    MalformedCookieFile {
        line: usize,
        content: String,
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Request could not be assembled (bad method token, header name or value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed response error
    pub fn malformed_response<S: Into<String>>(msg: S) -> Self {
        Error::MalformedResponse(msg.into())
    }

    /// Create a malformed cookie file error for a 1-based line number
    pub fn malformed_cookie_file(
        line: usize,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedCookieFile {
            line,
            content: content.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Error::InvalidRequest(msg.into())
    }

    /// Check if the transport failed
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a parse failure of response or cookie file
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedResponse(_) | Error::MalformedCookieFile { .. }
        )
    }

    /// Get the offending cookie-file line number if available
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedCookieFile { line, .. } => Some(*line),
            _ => None,
        }
    }
}
