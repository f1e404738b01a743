// src/errors.rs
//! Error handling for the key exchange.
//! Arithmetic never fails: degenerate inputs produce well-defined values. Errors
//! only arise at the boundaries, from out-of-range private scalars, malformed
//! encodings, parameter validation and the entropy source. Every error carries
//! a severity that decides how loudly it is logged.

use log::{error, info, warn};
use std::fmt;
use thiserror::Error;

use crate::params::ParamsError;

/// Severity levels for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The system cannot operate at all (bad parameters, no entropy)
    Critical,
    /// Untrusted input was rejected
    High,
    /// Caller supplied a value outside the documented domain
    Medium,
    /// Usage error with no security impact
    Low,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::Low => write!(f, "LOW"),
        }
    }
}

/// Error types for the key exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SidhError {
    #[error("Private scalar {value} out of range for the {side}-side: expected a value below {bound}")]
    InvalidScalarRange { side: u32, value: u64, bound: u64 },

    #[error("Invalid encoding of {context}: non-canonical field element at byte offset {offset}")]
    InvalidEncoding { context: &'static str, offset: usize },

    #[error("Invalid key length: expected {expected}, got {actual} in context '{context}'")]
    InvalidKeyLength {
        expected: usize,
        actual: usize,
        context: &'static str,
    },

    #[error("Key generation failed: {reason}")]
    KeyGenerationFailed { reason: String },

    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed { reason: String },

    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("Parameter validation failed: {0}")]
    Params(#[from] ParamsError),
}

impl SidhError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SidhError::KeyGenerationFailed { .. } => ErrorSeverity::Critical,
            SidhError::Params(_) => ErrorSeverity::Critical,
            SidhError::KeyDerivationFailed { .. } => ErrorSeverity::High,
            SidhError::InvalidEncoding { .. } => ErrorSeverity::High,
            SidhError::InvalidKeyLength { .. } => ErrorSeverity::High,
            SidhError::InvalidScalarRange { .. } => ErrorSeverity::Medium,
            SidhError::InvalidArgument { .. } => ErrorSeverity::Low,
        }
    }

    /// Convert error to a message safe to show an end user.
    ///
    /// Errors about untrusted input are reported without echoing it.
    pub fn to_user_message(&self) -> String {
        match self.severity() {
            ErrorSeverity::Critical => "Key exchange unavailable: internal failure".to_string(),
            ErrorSeverity::High => "Key exchange aborted: rejected malformed input".to_string(),
            ErrorSeverity::Medium | ErrorSeverity::Low => format!("Error: {}", self),
        }
    }

    /// Detailed single-line record for logs
    pub fn to_audit_log(&self) -> String {
        format!(
            "[PID: {}] [TID: {:?}] [SEVERITY: {}] {}",
            std::process::id(),
            std::thread::current().id(),
            self.severity(),
            self
        )
    }

    /// Log the error with its call site at a level matching its severity
    pub fn log_with_context(&self, module: &str, function: &str, line: u32) {
        let log_message = format!("[{}:{}:{}] {}", module, function, line, self.to_audit_log());

        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => error!("{}", log_message),
            ErrorSeverity::Medium => warn!("{}", log_message),
            ErrorSeverity::Low => info!("{}", log_message),
        }
    }
}

/// Extension trait for logging errors as they propagate
pub trait SidhResultExt<T> {
    fn log_on_error(self, module: &str, function: &str, line: u32) -> Self;
}

impl<T> SidhResultExt<T> for Result<T, SidhError> {
    fn log_on_error(self, module: &str, function: &str, line: u32) -> Self {
        if let Err(ref error) = self {
            error.log_with_context(module, function, line);
        }
        self
    }
}
