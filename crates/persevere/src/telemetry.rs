// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry emitted by the retry executor.
//!
//! Every failed attempt is logged through [`tracing`]. Recovered failures are logged at
//! `WARN` under the event name `persevere.retry` and the terminal failure at `ERROR` under
//! `persevere.exhausted`.
//!
//! With the `metrics` feature, each failed attempt also increments the `resilience.event`
//! counter. The attribute keys are exposed as constants in this module.

use std::borrow::Cow;
use std::time::Duration;

use crate::Attempt;

/// Key used to annotate the name of the executor.
pub const STRATEGY_NAME: &str = "resilience.strategy.name";

/// Key used to annotate the event being reported: `retry` or `exhausted`.
pub const EVENT_NAME: &str = "resilience.event.name";

/// Key used to annotate the 0-based attempt index.
pub const ATTEMPT_INDEX: &str = "resilience.attempt.index";

/// Key used to annotate whether the attempt was the last permitted one.
pub const ATTEMPT_IS_LAST: &str = "resilience.attempt.is_last";

pub(crate) const RETRY_EVENT: &str = "retry";
pub(crate) const EXHAUSTED_EVENT: &str = "exhausted";

#[cfg(any(feature = "metrics", test))]
const METER_NAME: &str = "persevere";
#[cfg(any(feature = "metrics", test))]
const VERSION: &str = "v0.1.0";
#[cfg(any(feature = "metrics", test))]
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

#[derive(Debug, Clone)]
pub(crate) struct TelemetryHelper {
    pub(crate) executor_name: Cow<'static, str>,
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_reporter: Option<opentelemetry::metrics::Counter<u64>>,
}

impl TelemetryHelper {
    pub(crate) fn new(executor_name: Cow<'static, str>) -> Self {
        Self {
            executor_name,
            #[cfg(any(feature = "metrics", test))]
            event_reporter: None,
        }
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn with_meter_provider(mut self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        let meter = create_meter(provider);
        self.event_reporter = Some(create_resilience_event_counter(&meter));
        self
    }

    /// Reports a failed attempt. `retry_delay` is `None` when no further attempt follows.
    pub(crate) fn report_failure(&self, error: &(dyn std::error::Error + 'static), attempt: Attempt, retry_delay: Option<Duration>) {
        let event = if attempt.is_last() { EXHAUSTED_EVENT } else { RETRY_EVENT };

        if attempt.is_last() {
            tracing::event!(
                name: "persevere.exhausted",
                tracing::Level::ERROR,
                executor.name = %self.executor_name,
                resilience.attempt.index = attempt.index(),
                resilience.attempt.is_last = true,
                error = %error,
            );
        } else {
            tracing::event!(
                name: "persevere.retry",
                tracing::Level::WARN,
                executor.name = %self.executor_name,
                resilience.attempt.index = attempt.index(),
                resilience.attempt.is_last = false,
                resilience.retry.delay = retry_delay.unwrap_or_default().as_secs_f32(),
                error = %error,
            );
        }

        self.report_metrics(event, attempt);
    }

    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when metrics feature not used")
    )]
    fn report_metrics(&self, event: &'static str, attempt: Attempt) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(reporter) = &self.event_reporter {
            reporter.add(
                1,
                &[
                    opentelemetry::KeyValue::new(STRATEGY_NAME, self.executor_name.clone()),
                    opentelemetry::KeyValue::new(EVENT_NAME, event),
                    opentelemetry::KeyValue::new(ATTEMPT_INDEX, i64::from(attempt.index())),
                    opentelemetry::KeyValue::new(ATTEMPT_IS_LAST, attempt.is_last()),
                ],
            );
        }
    }
}

#[cfg(any(feature = "metrics", test))]
fn create_meter(provider: &dyn opentelemetry::metrics::MeterProvider) -> opentelemetry::metrics::Meter {
    provider.meter_with_scope(
        opentelemetry::InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

#[cfg(any(feature = "metrics", test))]
fn create_resilience_event_counter(meter: &opentelemetry::metrics::Meter) -> opentelemetry::metrics::Counter<u64> {
    meter
        .u64_counter("resilience.event")
        .with_description("Emitted upon the occurrence of a resilience event.")
        .with_unit("u64")
        .build()
}
