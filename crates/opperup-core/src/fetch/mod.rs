//! Artifact download over HTTP(S) via libcurl.
//!
//! The whole body is buffered in memory (release binaries are tens of MiB) so
//! verification happens before anything touches the install directory.
//! Blocking; call from `spawn_blocking` if used from async code.

mod headers;

use std::str;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::OpperupConfig;
use crate::error::{ReleaseError, ReleaseResult};
use crate::release::Release;
use crate::retry::{run_with_retry, RetryPolicy};

/// Upper bound on the up-front buffer reservation.
const MAX_PREALLOC: u64 = 256 * 1024 * 1024;

/// Transfer settings for [`fetch`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below 1 KiB/s for this long.
    pub low_speed_time: Duration,
    /// Hard cap on a single attempt.
    pub total_timeout: Duration,
    pub max_bytes_per_sec: Option<u64>,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            total_timeout: Duration::from_secs(3600),
            max_bytes_per_sec: None,
            retry: RetryPolicy::default(),
            user_agent: concat!("opperup/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&OpperupConfig> for FetchOptions {
    fn from(cfg: &OpperupConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            max_bytes_per_sec: cfg.max_bytes_per_sec,
            retry: cfg.retry.as_ref().map(RetryPolicy::from).unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Download the artifact for `release`, retrying transport failures and
/// truncated bodies per `opts.retry`.
///
/// Returns the body only if its length matches the expected size (catalog size,
/// else the response `Content-Length`, when either is known). Digest checking is
/// left to the caller.
pub fn fetch(release: &Release, opts: &FetchOptions, cancel: &CancelToken) -> ReleaseResult<Vec<u8>> {
    run_with_retry(&opts.retry, cancel, |attempt| {
        tracing::info!(url = %release.url, attempt, "fetching artifact");
        let body = fetch_once(release, opts, cancel)?;
        tracing::info!(url = %release.url, bytes = body.len(), "artifact fetched");
        Ok(body)
    })
}

fn fetch_once(release: &Release, opts: &FetchOptions, cancel: &CancelToken) -> ReleaseResult<Vec<u8>> {
    let url = release.url.as_str();
    let net = |source: curl::Error| ReleaseError::Network {
        url: url.to_string(),
        source,
    };

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(net)?;
    easy.follow_location(true).map_err(net)?;
    easy.max_redirections(10).map_err(net)?;
    easy.useragent(&opts.user_agent).map_err(net)?;
    easy.connect_timeout(opts.connect_timeout).map_err(net)?;
    easy.low_speed_limit(1024).map_err(net)?;
    easy.low_speed_time(opts.low_speed_time).map_err(net)?;
    easy.timeout(opts.total_timeout).map_err(net)?;
    if let Some(speed) = opts.max_bytes_per_sec {
        easy.max_recv_speed(speed).map_err(net)?;
    }
    // Progress callbacks are how a stalled transfer notices cancellation.
    easy.progress(true).map_err(net)?;

    let mut body: Vec<u8> =
        Vec::with_capacity(release.expected_size.unwrap_or(0).min(MAX_PREALLOC) as usize);
    let mut header_lines: Vec<String> = Vec::new();

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(net)?;
        transfer
            .write_function(|data| {
                if cancel.is_cancelled() {
                    return Ok(0); // abort transfer
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(net)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(net)?;
        transfer.perform()
    };

    if cancel.is_cancelled() {
        tracing::info!(url, "fetch cancelled");
        return Err(ReleaseError::Cancelled);
    }

    let response = headers::parse_headers(&header_lines);
    let received = body.len() as u64;

    if let Err(e) = perform_result {
        if e.is_partial_file() {
            return Err(ReleaseError::TruncatedDownload {
                expected: release
                    .expected_size
                    .or(response.content_length)
                    .unwrap_or(received),
                received,
            });
        }
        return Err(net(e));
    }

    let code = easy.response_code().map_err(net)?;
    if !(200..300).contains(&code) {
        return Err(ReleaseError::HttpStatus {
            url: url.to_string(),
            status: code,
        });
    }

    if let Some(expected) = release.expected_size.or(response.content_length) {
        if received != expected {
            return Err(ReleaseError::TruncatedDownload { expected, received });
        }
    }
    if let Some(etag) = &response.etag {
        tracing::debug!(url, etag = %etag, "artifact etag");
    }

    Ok(body)
}
