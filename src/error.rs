//! Error taxonomy shared across the console subsystems.
//!
//! Validation errors (`InvalidFormat`, `MissingRequiredField`) block a
//! submission and are returned to the caller; they are never swallowed.
//! `Storage` and `Transport` errors stay inside their subsystem: a failed
//! preference save is logged and the in-memory state keeps working, a failed
//! fetch leaves previously delivered data in place.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    /// A field value does not match its expected format (quota pattern,
    /// share-name pattern, VIP literal, numeric bounds).
    #[error("invalid format for `{field}`: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A field required by the current form state is empty or absent.
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: String },

    /// `apply_theme` was called with an id that has no registered definition.
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    /// The widget layout already holds the maximum number of entries.
    #[error("widget limit reached ({max} widgets)")]
    LayoutFull { max: usize },

    /// Serialize/deserialize or I/O failure against durable storage.
    #[error("storage error for `{key}`: {message}")]
    Storage { key: String, message: String },

    /// A remote call failed. `status` carries the HTTP status when the
    /// failure happened above the socket level.
    #[error("transport error: {message}")]
    Transport { status: Option<u16>, message: String },
}

impl ConsoleError {
    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::MissingRequiredField {
            field: field.to_string(),
        }
    }

    pub fn storage(key: &str, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
