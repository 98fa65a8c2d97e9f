//! Classify HTTP status, curl errors and release errors into retry kinds.

use super::policy::ErrorKind;
use crate::error::ReleaseError;

pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_partial_file() {
        return ErrorKind::Truncated;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

pub fn classify(e: &ReleaseError) -> ErrorKind {
    match e {
        ReleaseError::Network { source, .. } => match classify_curl_error(source) {
            // Unclassified transport failures still count as network errors.
            ErrorKind::Other => ErrorKind::Connection,
            kind => kind,
        },
        ReleaseError::HttpStatus { status, .. } => classify_http_status(*status),
        ReleaseError::TruncatedDownload { .. } => ErrorKind::Truncated,
        ReleaseError::UnsupportedPlatform { .. }
        | ReleaseError::UnknownVersion { .. }
        | ReleaseError::DigestMismatch { .. }
        | ReleaseError::Install { .. }
        | ReleaseError::SmokeTestFailed { .. }
        | ReleaseError::Cancelled
        | ReleaseError::Catalog(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn http_5xx_retryable() {
        assert!(matches!(classify_http_status(500), ErrorKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), ErrorKind::Http5xx(502)));
    }

    #[test]
    fn http_4xx_other() {
        assert_eq!(classify_http_status(404), ErrorKind::Other);
        assert_eq!(classify_http_status(403), ErrorKind::Other);
    }

    #[test]
    fn cancelled_and_mismatch_are_final() {
        assert_eq!(classify(&ReleaseError::Cancelled), ErrorKind::Other);
        let mismatch = ReleaseError::DigestMismatch {
            url: String::new(),
            expected: String::new(),
            actual: String::new(),
        };
        assert_eq!(classify(&mismatch), ErrorKind::Other);
    }

    #[test]
    fn http_status_error_uses_status_classification() {
        let e = ReleaseError::HttpStatus {
            url: "https://example.com".into(),
            status: 503,
        };
        assert_eq!(classify(&e), ErrorKind::Throttled);
    }
}
