// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::FailureArgs;

/// Erased error reference handed to failure callbacks.
pub(crate) type DynError = dyn std::error::Error + Send + Sync + 'static;

/// Callback invoked for every failed attempt.
///
/// Stored behind an `Arc` so that executors stay cheap to clone.
pub(crate) struct OnFailure(Arc<dyn Fn(&DynError, FailureArgs) + Send + Sync>);

impl OnFailure {
    pub(crate) fn new<F>(callback: F) -> Self
    where
        F: Fn(&DynError, FailureArgs) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub(crate) fn call(&self, error: &DynError, args: FailureArgs) {
        (self.0)(error, args);
    }
}

impl Clone for OnFailure {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl std::fmt::Debug for OnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnFailure").finish()
    }
}
