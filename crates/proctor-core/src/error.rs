//! Error types for proctor operations.
//!
//! Errors follow a small taxonomy: missing entities, rejected input,
//! illegal state transitions, and transient I/O against a collaborator.
//! Each variant carries a structured [`ErrorCode`] for programmatic handling.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for proctor operations.
pub type ProctorResult<T> = Result<T, ProctorError>;

/// Main error type for all proctor operations.
#[derive(Error, Debug)]
pub enum ProctorError {
    /// Unknown certification, domain, item, session, or review entry.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        entity_id: Option<String>,
    },

    /// Input or generated content failed validation.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Operation is illegal for the entity's current state.
    #[error("State error: {message}")]
    State { message: String, code: ErrorCode },

    /// Store or content generator unreachable, failing, or timed out.
    #[error("Transient I/O error: {message}")]
    TransientIo {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not found (NF_xxx)
    NfCertification,
    NfDomain,
    NfItem,
    NfSession,
    NfReview,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValOutOfRange,
    ValGeneratedSchema,
    ValInvalidJson,

    // State (STATE_xxx)
    StateSessionCompleted,
    StateSessionOpen,

    // Transient I/O (IO_xxx)
    IoStoreUnavailable,
    IoGeneratorFailed,
    IoTimeout,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NfCertification => "NF_001",
            ErrorCode::NfDomain => "NF_002",
            ErrorCode::NfItem => "NF_003",
            ErrorCode::NfSession => "NF_004",
            ErrorCode::NfReview => "NF_005",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValOutOfRange => "VAL_002",
            ErrorCode::ValGeneratedSchema => "VAL_003",
            ErrorCode::ValInvalidJson => "VAL_004",
            ErrorCode::StateSessionCompleted => "STATE_001",
            ErrorCode::StateSessionOpen => "STATE_002",
            ErrorCode::IoStoreUnavailable => "IO_001",
            ErrorCode::IoGeneratorFailed => "IO_002",
            ErrorCode::IoTimeout => "IO_003",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl ProctorError {
    /// Create a not found error for an entity of the given kind.
    pub fn not_found(code: ErrorCode, kind: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::NotFound {
            message: format!("{} '{}' not found", kind, id),
            code,
            entity_id: Some(id),
        }
    }

    /// Unknown certification.
    pub fn certification_not_found(id: impl Into<String>) -> Self {
        Self::not_found(ErrorCode::NfCertification, "Certification", id)
    }

    /// Unknown item.
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::not_found(ErrorCode::NfItem, "Item", id)
    }

    /// Unknown simulation session.
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::not_found(ErrorCode::NfSession, "Simulation session", id)
    }

    /// A certification without any domains.
    pub fn no_domains(certification_id: impl Into<String>) -> Self {
        let id = certification_id.into();
        Self::NotFound {
            message: format!("Certification '{}' has no domains", id),
            code: ErrorCode::NfDomain,
            entity_id: Some(id),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Value outside its permitted range.
    pub fn out_of_range(field: &str, value: impl ToString, allowed: impl Into<String>) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        details.insert("value".to_string(), value.to_string());
        let allowed = allowed.into();
        Self::Validation {
            message: format!("{} is out of range (allowed: {})", field, allowed),
            code: ErrorCode::ValOutOfRange,
            details,
            suggestion: Some(format!("Use a value in {}", allowed)),
        }
    }

    /// Generated content violated the item schema.
    pub fn generated_schema(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValGeneratedSchema,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a state error.
    pub fn state(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
            code,
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
            code: ErrorCode::IoStoreUnavailable,
            source: None,
        }
    }

    /// Create a content generator error.
    pub fn generator(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
            code: ErrorCode::IoGeneratorFailed,
            source: None,
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
            code: ErrorCode::IoTimeout,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::State { code, .. } => *code,
            Self::TransientIo { code, .. } => *code,
            Self::Serialization(_) => ErrorCode::ValInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Please check the identifier and ensure it exists"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::State {
                code: ErrorCode::StateSessionCompleted,
                ..
            } => Some("Start a new simulation; completed sessions are read-only"),
            Self::TransientIo { .. } => Some("Please retry the operation"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for ProctorError {
    fn from(err: rusqlite::Error) -> Self {
        Self::TransientIo {
            message: err.to_string(),
            code: ErrorCode::IoStoreUnavailable,
            source: Some(Box::new(err)),
        }
    }
}
