//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body for every GET path, with knobs for failure modes:
//! leading 503s, a fixed status, a lying `Content-Length`, and slow chunked writes.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status for successful responses.
    pub status: u16,
    /// Answer the first N requests with 503.
    pub fail_first: usize,
    /// Announce this `Content-Length` instead of the real one.
    pub declared_len: Option<u64>,
    /// Write the body in 1 KiB chunks with this pause between them.
    pub chunk_delay: Option<Duration>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            fail_first: 0,
            declared_len: None,
            chunk_delay: None,
        }
    }
}

pub struct ArtifactServer {
    /// Base URL ending in `/`, e.g. `http://127.0.0.1:12345/`.
    pub base_url: String,
    requests: Arc<AtomicUsize>,
}

impl ArtifactServer {
    pub fn start(body: Vec<u8>) -> Self {
        Self::start_with_options(body, ServerOptions::default())
    }

    pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let body = Arc::new(body);
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let body = Arc::clone(&body);
                thread::spawn(move || handle(stream, &body, opts, n));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}/", port),
            requests,
        }
    }

    /// Number of connections accepted so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: ServerOptions, index: usize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }

    if index < opts.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    if opts.status != 200 {
        let _ = stream.write_all(
            format!(
                "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                opts.status,
                reason(opts.status)
            )
            .as_bytes(),
        );
        return;
    }

    let len = opts.declared_len.unwrap_or(body.len() as u64);
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        len
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    match opts.chunk_delay {
        Some(delay) => {
            for chunk in body.chunks(1024) {
                if stream.write_all(chunk).is_err() {
                    return;
                }
                let _ = stream.flush();
                thread::sleep(delay);
            }
        }
        None => {
            let _ = stream.write_all(body);
        }
    }
    let _ = stream.flush();
}
