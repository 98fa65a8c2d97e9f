//! Placing a verified binary on disk.
//!
//! Bytes are written to a uniquely named temp file in the target's directory,
//! marked executable and synced, then renamed over the target. Until the rename
//! the previous binary (if any) is untouched; a dropped [`StagedBinary`]
//! removes its temp file.

mod smoke;

pub use smoke::{installed_version, smoke_test};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{ReleaseError, ReleaseResult};

/// Mode for installed binaries (rwxr-xr-x).
#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// A fully written, executable temp file waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedBinary {
    temp: TempPath,
    target: PathBuf,
}

impl StagedBinary {
    /// Path of the staged temp file (executable, closed).
    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically rename the staged file over the target.
    pub fn commit(self) -> ReleaseResult<PathBuf> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| ReleaseError::install(&target, e.error))?;
        sync_parent_dir(&target);
        tracing::info!(path = %target.display(), "binary installed");
        Ok(target)
    }
}

/// Write `bytes` next to `target` without touching `target` itself.
pub fn stage(bytes: &[u8], target: &Path) -> ReleaseResult<StagedBinary> {
    let dir = parent_dir(target);
    fs::create_dir_all(dir).map_err(|e| ReleaseError::install(dir, e))?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "binary".to_string());
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| ReleaseError::install(dir, e))?;

    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(bytes)
        .map_err(|e| ReleaseError::install(&tmp_path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ReleaseError::install(&tmp_path, e))?;
    set_executable(tmp.as_file()).map_err(|e| ReleaseError::install(&tmp_path, e))?;

    tracing::debug!(temp = %tmp_path.display(), bytes = bytes.len(), "binary staged");

    // Close the write handle so the staged file can be executed.
    Ok(StagedBinary {
        temp: tmp.into_temp_path(),
        target: target.to_path_buf(),
    })
}

/// Stage and commit in one step.
pub fn install(bytes: &[u8], target: &Path) -> ReleaseResult<PathBuf> {
    stage(bytes, target)?.commit()
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn set_executable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn set_executable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Persist the rename itself; failure here is logged, not fatal.
#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    if let Err(e) = fs::File::open(parent_dir(target)).and_then(|d| d.sync_all()) {
        tracing::debug!(error = %e, "directory sync after install failed");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}
