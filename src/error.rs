//! Error types for endpoint configuration, sessions and API calls.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::Format;

/// Errors while turning files and flags into an endpoint descriptor.
#[derive(Debug, Error)]
pub enum ConfigError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input errors (exit code 2)
    #[error("invalid {format}: {message}")]
    Decode { format: Format, message: String },

    #[error("unsupported file format: {detail}. Use JSON or YAML")]
    UnsupportedFormat { detail: String },

    #[error("file has no top-level \"endpoint\" mapping")]
    MissingEndpoint,

    #[error("no flag named --{flag}")]
    FlagBinding { flag: String },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("auth-type and auth-properties must be given together (missing --{missing})")]
    AuthPairing { missing: &'static str },

    #[error(
        "unsupported authentication type \"{value}\". Supported types: basic, api-key, bearer-token, oauth2, jwt"
    )]
    UnsupportedAuthType { value: String },

    #[error("invalid JSON Schema in {field}: {message}")]
    InvalidSchema { field: String, message: String },

    // Body does not match its schema (exit code 1)
    #[error("response body does not match its schema ({} error(s))", errors.len())]
    SchemaMismatch { errors: Vec<SchemaError> },
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::FileNotFound { .. } | ConfigError::ReadError { .. } => 3,
            ConfigError::SchemaMismatch { .. } => 1,
            _ => 2,
        }
    }
}

/// Single schema violation with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors reading or writing the stored login session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("you need to login first (run `mockthis login`)")]
    NotLoggedIn,

    #[error("could not determine the home directory; set MOCKTHIS_CONFIG_DIR")]
    NoConfigDir,

    #[error("cannot read credentials {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write credentials {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt credentials file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::NotLoggedIn | SessionError::NoConfigDir => 2,
            _ => 3,
        }
    }
}

/// Errors talking to the MockThis API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to {action}. Status: {status}")]
    UnexpectedStatus { action: &'static str, status: u16 },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("login failed (status {status}). If you don't have an account, run `mockthis register`")]
    LoginRejected { status: u16 },

    #[error("login timed out after {}s without verification. Please try again", after.as_secs())]
    LoginTimeout { after: Duration },

    #[error("login handshake is not awaiting verification; request a login hash first")]
    NotAwaitingVerification,

    #[error("login handshake already started; create a new handshake to log in again")]
    HandshakeAlreadyStarted,

    #[error("invalid API URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("invalid endpoint id \"{id}\"")]
    InvalidEndpointId { id: String },

    #[error("endpoint not found: {id}")]
    EndpointNotFound { id: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ApiError::Transport { .. } | ApiError::InvalidResponse { .. } => 3,
            ApiError::InvalidBaseUrl { .. } | ApiError::InvalidEndpointId { .. } => 2,
            ApiError::Session(e) => e.exit_code(),
            _ => 1,
        }
    }
}
