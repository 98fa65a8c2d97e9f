//! `--version` smoke test of an installed (or staged) binary.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{ReleaseError, ReleaseResult};
use crate::version::Version;

const SMOKE_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `<path> --version`; succeeds only on exit status 0. Returns the trimmed output.
///
/// Both pipes are drained on reader threads while the child runs, so chatty
/// binaries cannot stall on a full pipe.
pub fn smoke_test(path: &Path) -> ReleaseResult<String> {
    let fail = |detail: String| ReleaseError::SmokeTestFailed {
        path: path.to_path_buf(),
        detail,
    };

    let mut child = spawn_version(path).map_err(|e| fail(e.to_string()))?;
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + SMOKE_TIMEOUT;
    let status = loop {
        match child.try_wait().map_err(|e| fail(e.to_string()))? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                // Reader threads end once every holder of the pipe exits; not joined here.
                return Err(fail(format!("no exit within {}s", SMOKE_TIMEOUT.as_secs())));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let stdout = collect(stdout);
    let stderr = collect(stderr);

    if !status.success() {
        return Err(fail(format!("{status}: {}", stderr.trim())));
    }

    let text = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };
    tracing::debug!(path = %path.display(), output_len = text.len(), "smoke test passed");
    Ok(text.to_string())
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

/// True when exec failed because the file is still open for writing somewhere.
#[cfg(unix)]
fn is_text_busy(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(libc::ETXTBSY)
}

#[cfg(not(unix))]
fn is_text_busy(_e: &std::io::Error) -> bool {
    false
}

fn spawn_version(path: &Path) -> std::io::Result<Child> {
    let mut attempts = 0;
    loop {
        let res = Command::new(path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        match res {
            Err(e) if is_text_busy(&e) && attempts < 10 => {
                attempts += 1;
                thread::sleep(POLL_INTERVAL);
            }
            other => return other,
        }
    }
}

/// Version reported by the binary at `path`, if it exists and answers `--version`.
pub fn installed_version(path: &Path) -> Option<Version> {
    if !path.is_file() {
        return None;
    }
    match smoke_test(path) {
        Ok(out) => Version::find_in(&out),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine installed version");
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn text_busy_matches_platform_errno() {
        assert!(is_text_busy(&std::io::Error::from_raw_os_error(libc::ETXTBSY)));
        assert!(!is_text_busy(&std::io::Error::from_raw_os_error(libc::ENOENT)));
    }
}
