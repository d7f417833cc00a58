// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use thiserror::Error as ThisError;

use crate::constants::{FINAL_RETRY_MESSAGE, UNEXPECTED_EXIT_MESSAGE};

/// A type-erased, thread-safe error produced by a retried operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized `Result` for retry executions.
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by [`RetryExecutor`][crate::RetryExecutor].
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// A required argument was missing. No attempt was made.
    #[error("invalid argument: `{name}` must be provided")]
    InvalidArgument {
        /// Name of the missing argument.
        name: &'static str,
    },

    /// Every permitted attempt failed, or the executor hit an internal defect.
    ///
    /// Use [`RetryExhaustedError::is_invariant_violation`] to tell the two apart.
    #[error(transparent)]
    Exhausted(#[from] RetryExhaustedError),
}

impl Error {
    /// Returns the exhaustion details if this is an [`Error::Exhausted`].
    #[must_use]
    pub fn as_exhausted(&self) -> Option<&RetryExhaustedError> {
        match self {
            Self::Exhausted(exhausted) => Some(exhausted),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Converts into the exhaustion details if this is an [`Error::Exhausted`].
    #[must_use]
    pub fn into_exhausted(self) -> Option<RetryExhaustedError> {
        match self {
            Self::Exhausted(exhausted) => Some(exhausted),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Returns true if a required argument was missing.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// The terminal failure of a retry execution.
///
/// Wraps the error produced by the final failed attempt together with two provenance flags.
/// The flags are tri-state: `Some(true)`/`Some(false)` describe a failure the executor
/// understands, while `None` marks a failure of unknown provenance. The latter is only
/// produced when the retry loop itself is defective, see
/// [`is_invariant_violation`][Self::is_invariant_violation].
///
/// # Examples
///
/// ```
/// use persevere::RetryExhaustedError;
///
/// let error = RetryExhaustedError::caused_by("gave up", std::io::Error::other("offline"), Some(true), Some(true));
///
/// assert_eq!(error.message(), "gave up");
/// assert_eq!(error.was_thrown_on_final_retry(), Some(true));
/// assert!(error.downcast_cause::<std::io::Error>().is_some());
/// ```
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct RetryExhaustedError {
    message: Cow<'static, str>,
    #[source]
    cause: Option<BoxError>,
    was_thrown_from_retry: Option<bool>,
    was_thrown_on_final_retry: Option<bool>,
}

impl RetryExhaustedError {
    /// Creates an error without a cause and with unknown provenance.
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            was_thrown_from_retry: None,
            was_thrown_on_final_retry: None,
        }
    }

    /// Creates an error that wraps `cause`.
    #[must_use]
    pub fn caused_by(
        message: impl Into<Cow<'static, str>>,
        cause: impl Into<BoxError>,
        was_thrown_from_retry: Option<bool>,
        was_thrown_on_final_retry: Option<bool>,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
            was_thrown_from_retry,
            was_thrown_on_final_retry,
        }
    }

    pub(crate) fn final_retry(cause: BoxError) -> Self {
        Self::caused_by(FINAL_RETRY_MESSAGE, cause, Some(true), Some(true))
    }

    pub(crate) fn unexpected_exit() -> Self {
        Self::new(UNEXPECTED_EXIT_MESSAGE)
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error produced by the final failed attempt.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns the cause as `E` if it has that concrete type.
    #[must_use]
    pub fn downcast_cause<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.cause.as_deref()?.downcast_ref::<E>()
    }

    /// Takes ownership of the wrapped cause.
    #[must_use]
    pub fn into_cause(self) -> Option<BoxError> {
        self.cause
    }

    /// Whether the failure happened while the operation was being retried.
    #[must_use]
    pub fn was_thrown_from_retry(&self) -> Option<bool> {
        self.was_thrown_from_retry
    }

    /// Whether the failure happened on the last permitted attempt.
    #[must_use]
    pub fn was_thrown_on_final_retry(&self) -> Option<bool> {
        self.was_thrown_on_final_retry
    }

    /// Returns true if the error signals a defect in the executor rather than a failure of
    /// the operation: no cause and unknown provenance.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        self.cause.is_none() && self.was_thrown_from_retry.is_none() && self.was_thrown_on_final_retry.is_none()
    }
}
