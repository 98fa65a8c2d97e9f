//! Retry and backoff policy for artifact downloads.
//!
//! Transport failures, throttling and truncated bodies are retried with
//! exponential backoff; digest mismatches and filesystem errors never are.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
