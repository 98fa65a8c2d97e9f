//! Response header collection across redirects.

/// Metadata of the final response in a redirect chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    pub content_length: Option<u64>,
    pub etag: Option<String>,
}

/// Parse raw header lines as delivered by curl's header callback.
///
/// With redirects followed, curl reports every response in the chain; a status
/// line (`HTTP/...`) starts a new response, so only the last block counts.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                out.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("etag") {
                out.etag = Some(value.trim_matches('"').to_string());
            }
        }
    }

    out
}
