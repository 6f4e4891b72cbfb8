//! Error types for the transliteration session core.
//!
//! Only scheme activation surfaces an error to the host. Everything that can
//! fail on the keystroke path (`OracleError`) or in the background learn
//! worker (`DictError`) is logged and absorbed where it happens.

use thiserror::Error;

/// Failure reported by the transliteration oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The oracle could not produce candidates for the given input.
    #[error("transliteration failed: {0}")]
    Failed(String),

    /// The requested scheme is unknown or could not be opened.
    #[error("scheme unavailable: {0}")]
    SchemeUnavailable(String),
}

/// Failure reported by the dictionary collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    #[error("failed to learn {word:?}: {reason}")]
    Learn { word: String, reason: String },

    #[error("failed to unlearn {word:?}: {reason}")]
    Unlearn { word: String, reason: String },

    /// The backing store is closed or otherwise unreachable.
    #[error("dictionary unavailable")]
    Unavailable,
}

/// Errors surfaced to the host at engine boundaries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transliteration engine could not be initialized for a scheme.
    /// This is fatal for activation and never happens mid-session.
    #[error("failed to initialize scheme {scheme:?}")]
    SchemeInit {
        scheme: String,
        #[source]
        source: OracleError,
    },

    /// A key was routed to the engine before any scheme was activated.
    #[error("no scheme is active")]
    NotActivated,

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
