// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::constants::DEFAULT_MAX_RETRIES;

/// Configuration for a [`RetryExecutor`][crate::RetryExecutor].
///
/// | Property | Default | Meaning |
/// |----------|---------|---------|
/// | [`max_retries`][RetryConfig::max_retries] | `5` | Retries permitted after the first attempt |
/// | [`backoff_delays`][RetryConfig::backoff_delays] | empty | Delays waited between attempts |
///
/// The delay waited after failed attempt `n` is `backoff_delays[min(n, len - 1)]`, so a
/// schedule shorter than `max_retries` keeps reusing its last entry. An empty schedule
/// retries immediately.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use persevere::RetryConfig;
///
/// let config = RetryConfig::new()
///     .max_retries(3)
///     .backoff_delays([Duration::from_millis(100), Duration::from_millis(500)]);
///
/// assert_eq!(config.get_max_retries(), 3);
/// assert_eq!(config.backoff_delay(0), Some(Duration::from_millis(100)));
/// assert_eq!(config.backoff_delay(2), Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryConfig {
    max_retries: u32,
    #[cfg_attr(feature = "serde", serde(rename = "backoff_delays_ms", with = "millis"))]
    backoff_delays: Vec<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_delays: Vec::new(),
        }
    }
}

impl RetryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of retries permitted after the first attempt.
    ///
    /// `0` means the operation runs exactly once.
    ///
    /// **Default**: 5
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delays waited between attempts.
    ///
    /// **Default**: no delays
    #[must_use]
    pub fn backoff_delays(mut self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.backoff_delays = delays.into_iter().collect();
        self
    }

    /// Returns the number of retries permitted after the first attempt.
    #[must_use]
    pub fn get_max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the configured delay schedule.
    #[must_use]
    pub fn get_backoff_delays(&self) -> &[Duration] {
        &self.backoff_delays
    }

    /// Returns the total number of attempts, including the first one.
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Returns the delay to wait after the attempt with the given index failed.
    ///
    /// Returns `None` when no schedule is configured. Indices past the end of the schedule
    /// reuse its last entry.
    #[must_use]
    pub fn backoff_delay(&self, attempt_index: u32) -> Option<Duration> {
        let last = self.backoff_delays.len().checked_sub(1)?;
        let index = usize::try_from(attempt_index).map_or(last, |index| index.min(last));

        self.backoff_delays.get(index).copied()
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(delays: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        delays
            .iter()
            .map(|delay| u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Duration>, D::Error> {
        let millis = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis.into_iter().map(Duration::from_millis).collect())
    }
}
