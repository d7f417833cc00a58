// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Default number of retries after the first attempt: 5 (6 attempts in total).
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 5;

/// Name used for telemetry when the caller does not name the executor.
pub(crate) const DEFAULT_EXECUTOR_NAME: &str = "retry";

/// Message carried by the error returned when the final attempt fails.
pub(crate) const FINAL_RETRY_MESSAGE: &str = "operation failed on final retry";

/// Message carried by the error returned when the retry loop ends without an outcome.
pub(crate) const UNEXPECTED_EXIT_MESSAGE: &str = "unexpected error in retry executor: loop ended without an outcome";
