// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::Attempt;

/// Arguments for the [`on_failure`][crate::RetryExecutor::on_failure] callback.
#[derive(Debug)]
pub struct FailureArgs {
    pub(crate) attempt: Attempt,
    pub(crate) retry_delay: Option<Duration>,
}

impl FailureArgs {
    /// Returns the attempt that failed.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the delay waited before the next attempt.
    ///
    /// `None` when no delay schedule is configured or when the failed attempt was the last one.
    #[must_use]
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay
    }

    /// Returns true if another attempt follows this failure.
    #[must_use]
    pub fn will_retry(&self) -> bool {
        !self.attempt.is_last()
    }
}
