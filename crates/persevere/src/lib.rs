// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Retries fallible asynchronous operations with an explicit backoff schedule.
//!
//! [`RetryExecutor`] runs an operation, and when the operation fails it runs it again, up to
//! a bounded number of retries. Between attempts it can wait for delays taken from a
//! caller-supplied schedule. The wait is a timer on a [`tick::Clock`], so it suspends only the
//! calling task and never blocks a worker thread.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use persevere::RetryExecutor;
//! use tick::Clock;
//!
//! # async fn example(clock: &Clock) -> Result<(), persevere::Error> {
//! let executor = RetryExecutor::new(clock)
//!     .name("load_settings")
//!     .max_retries(3)
//!     .backoff_delays([Duration::from_millis(10)]);
//!
//! let settings = executor.execute(load_settings).await?;
//! # let _settings = settings;
//! # Ok(())
//! # }
//! # async fn load_settings() -> Result<String, std::io::Error> { Ok(String::new()) }
//! ```
//!
//! # Retry Semantics
//!
//! - With `max_retries = n` the operation runs at most `n + 1` times. `0` means a single attempt.
//! - The first success is returned immediately.
//! - After failed attempt `i` the executor waits `backoff_delays[min(i, len - 1)]`. A schedule
//!   shorter than the retry budget keeps reusing its last delay, and an empty schedule retries
//!   without waiting. No delay follows the final attempt.
//! - When every attempt fails, [`Error::Exhausted`] carries a [`RetryExhaustedError`] that owns
//!   the error of the final attempt and has both provenance flags set.
//! - Any error type convertible into [`BoxError`] is accepted and kept as the cause.
//!
//! # Defaults
//!
//! | Parameter | Default Value | Configured By |
//! |-----------|---------------|---------------|
//! | Max retries | `5` (6 attempts in total) | [`RetryConfig::max_retries`], [`RetryExecutor::max_retries`] |
//! | Backoff delays | none | [`RetryConfig::backoff_delays`], [`RetryExecutor::backoff_delays`] |
//! | Name | `retry` | [`RetryExecutor::name`] |
//!
//! # Telemetry
//!
//! Every failed attempt is logged through [`tracing`], see the [`telemetry`] module for event
//! names and attribute keys.
//!
//! # Features
//!
//! - `metrics`: Reports failed attempts to an OpenTelemetry counter via
//!   `RetryExecutor::use_metrics`.
//! - `serde`: Implements `Serialize` and `Deserialize` for [`RetryConfig`]. Delays are written
//!   as whole milliseconds under `backoff_delays_ms`.

mod args;
mod attempt;
mod callbacks;
mod config;
mod constants;
mod error;
mod executor;

pub mod telemetry;

pub use args::FailureArgs;
pub use attempt::Attempt;
pub use config::RetryConfig;
pub use error::{BoxError, Error, Result, RetryExhaustedError};
pub use executor::RetryExecutor;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
