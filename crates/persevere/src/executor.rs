// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use tick::Clock;

use crate::callbacks::{DynError, OnFailure};
use crate::constants::DEFAULT_EXECUTOR_NAME;
use crate::telemetry::TelemetryHelper;
use crate::{Attempt, BoxError, Error, FailureArgs, Result, RetryConfig, RetryExhaustedError};

/// Runs an asynchronous operation and retries it when it fails.
///
/// The operation is attempted up to [`max_retries`][RetryConfig::max_retries] `+ 1` times.
/// Attempts are strictly sequential. Between attempts the executor waits the delay taken
/// from the [backoff schedule][RetryConfig::backoff_delays] on its [`Clock`], which suspends
/// only the calling task.
///
/// The first successful attempt ends the execution. When every attempt has failed, the
/// error of the final attempt is returned inside a [`RetryExhaustedError`]. Every failure,
/// recovered or not, is logged and passed to the [`on_failure`][Self::on_failure] callback.
///
/// Each attempt is a fresh call of the operation, not a resumption, so the operation must be
/// safe to invoke more than once.
///
/// # Cancellation
///
/// Dropping the future returned by [`execute`][Self::execute] cancels the in-flight attempt
/// or backoff wait and no further attempts are made. Wrapping it in a timeout bounds the
/// whole execution, including all retries.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use persevere::{RetryConfig, RetryExecutor};
/// use tick::Clock;
///
/// # async fn example(clock: &Clock) -> Result<(), persevere::Error> {
/// let executor = RetryExecutor::new(clock).name("fetch_profile").config(
///     RetryConfig::new()
///         .max_retries(3)
///         .backoff_delays([Duration::from_millis(100), Duration::from_millis(400)]),
/// );
///
/// let profile = executor.execute(|| fetch_profile("alice")).await?;
/// # let _profile = profile;
/// # Ok(())
/// # }
/// # async fn fetch_profile(name: &str) -> Result<String, std::io::Error> { Ok(name.to_string()) }
/// ```
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    clock: Clock,
    config: RetryConfig,
    on_failure: Option<OnFailure>,
    telemetry: TelemetryHelper,
}

impl RetryExecutor {
    /// Creates an executor with the default [`RetryConfig`].
    ///
    /// Backoff delays are scheduled on `clock`.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            config: RetryConfig::default(),
            on_failure: None,
            telemetry: TelemetryHelper::new(Cow::Borrowed(DEFAULT_EXECUTOR_NAME)),
        }
    }

    /// Sets the name reported in logs and metrics.
    ///
    /// Names should use `snake_case`.
    ///
    /// **Default**: `retry`
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.telemetry.executor_name = name.into();
        self
    }

    /// Replaces the whole retry configuration.
    #[must_use]
    pub fn config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of retries permitted after the first attempt.
    ///
    /// See [`RetryConfig::max_retries`].
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config = self.config.max_retries(max_retries);
        self
    }

    /// Sets the delays waited between attempts.
    ///
    /// See [`RetryConfig::backoff_delays`].
    #[must_use]
    pub fn backoff_delays(mut self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.config = self.config.backoff_delays(delays);
        self
    }

    /// Registers a callback invoked for every failed attempt, including the final one.
    ///
    /// The callback observes the failure only. It cannot change the outcome of the execution.
    #[must_use]
    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&(dyn std::error::Error + Send + Sync + 'static), FailureArgs) + Send + Sync + 'static,
    {
        self.on_failure = Some(OnFailure::new(callback));
        self
    }

    /// Reports failed attempts to the `resilience.event` counter of the given meter provider.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn use_metrics(mut self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_meter_provider(provider);
        self
    }

    /// Returns the active retry configuration.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `operation` until it succeeds or the retry budget is spent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] wrapping the error of the final attempt when all attempts
    /// fail.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        self.execute_optional(Some(operation)).await
    }

    /// Runs an operation that may be absent, for example one looked up by name at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without making any attempt when `operation` is
    /// `None`. Otherwise behaves like [`execute`][Self::execute].
    pub async fn execute_optional<F, Fut, T, E>(&self, operation: Option<F>) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        let Some(mut operation) = operation else {
            return Err(Error::InvalidArgument { name: "operation" });
        };

        let max_retries = self.config.get_max_retries();
        let mut next_attempt = Some(Attempt::first(max_retries));

        while let Some(attempt) = next_attempt {
            let error: BoxError = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error.into(),
            };

            if attempt.is_last() {
                self.report_failure(&*error, attempt, None);
                return Err(RetryExhaustedError::final_retry(error).into());
            }

            let delay = self.config.backoff_delay(attempt.index());
            self.report_failure(&*error, attempt, delay);

            if let Some(delay) = delay.filter(|delay| !delay.is_zero()) {
                self.clock.delay(delay).await;
            }

            next_attempt = attempt.next(max_retries);
        }

        Err(RetryExhaustedError::unexpected_exit().into())
    }

    fn report_failure(&self, error: &DynError, attempt: Attempt, retry_delay: Option<Duration>) {
        self.telemetry.report_failure(error, attempt, retry_delay);

        if let Some(on_failure) = &self.on_failure {
            on_failure.call(error, FailureArgs { attempt, retry_delay });
        }
    }
}
