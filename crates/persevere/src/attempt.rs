// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;

/// A single invocation of the retried operation.
///
/// The index is 0-based: index 0 is the initial call and every later index is a retry.
/// An executor configured with `max_retries = n` produces attempts `0..=n`, and only
/// attempt `n` is the last one.
///
/// # Examples
///
/// ```
/// use persevere::Attempt;
///
/// let attempt = Attempt::new(0, false);
/// assert!(attempt.is_first());
/// assert!(!attempt.is_last());
///
/// let last = Attempt::new(3, true);
/// assert!(last.is_retry());
/// assert!(last.is_last());
/// assert_eq!(last.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt {
    index: u32,
    is_last: bool,
}

impl Attempt {
    /// Creates an attempt with the given index.
    #[must_use]
    pub fn new(index: u32, is_last: bool) -> Self {
        Self { index, is_last }
    }

    /// Returns the first attempt of an execution that permits `max_retries` retries.
    #[must_use]
    pub(crate) fn first(max_retries: u32) -> Self {
        Self::new(0, max_retries == 0)
    }

    /// Returns the next attempt, or `None` once `max_retries` retries have been used.
    #[must_use]
    pub(crate) fn next(self, max_retries: u32) -> Option<Self> {
        if self.index >= max_retries {
            return None;
        }

        let next = self.index.saturating_add(1);
        Some(Self::new(next, next == max_retries))
    }

    /// Returns the 0-based attempt index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns true for the initial call (index 0).
    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    /// Returns true for every attempt after the initial call.
    #[must_use]
    pub fn is_retry(self) -> bool {
        !self.is_first()
    }

    /// Returns true if no further attempt is permitted after this one.
    #[must_use]
    pub fn is_last(self) -> bool {
        self.is_last
    }
}

impl Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.index.fmt(f)
    }
}
