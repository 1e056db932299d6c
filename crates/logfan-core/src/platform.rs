//! Platform shims: process/thread identity, clocks and path helpers.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{MAX_HOST, MAX_TID};
use crate::error::{LogError, Result};
use crate::validate::copy_truncated;

pub fn process_id() -> u32 {
    std::process::id()
}

/// Kernel thread id of the calling thread.
#[cfg(target_os = "linux")]
pub fn thread_id() -> u64 {
    nix::unistd::gettid().as_raw() as u64
}

/// Process-local sequential id of the calling thread.
#[cfg(not(target_os = "linux"))]
pub fn thread_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    }
    THREAD_ID.with(|id| *id)
}

/// Copy the calling thread's name into `out`; false if the thread is unnamed.
pub fn thread_name(out: &mut String) -> bool {
    match std::thread::current().name() {
        Some(name) if !name.is_empty() => {
            copy_truncated(out, name, MAX_TID);
            true
        }
        _ => false,
    }
}

/// Wall-clock time in the local zone.
pub fn current_time() -> DateTime<Local> {
    Local::now()
}

#[cfg(unix)]
pub fn hostname() -> String {
    let mut host = nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default();
    crate::validate::truncate_at_boundary(&mut host, MAX_HOST);
    host
}

#[cfg(not(unix))]
pub fn hostname() -> String {
    let mut host = std::env::var("COMPUTERNAME").unwrap_or_default();
    crate::validate::truncate_at_boundary(&mut host, MAX_HOST);
    host
}

pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| LogError::platform("current directory", &e))
}

pub fn executable_path() -> Result<PathBuf> {
    std::env::current_exe().map_err(|e| LogError::platform("executable path", &e))
}

/// File name of the running executable, if it can be resolved.
pub fn executable_basename() -> Option<String> {
    executable_path()
        .ok()
        .and_then(|path| basename(&path).map(str::to_string))
}

/// Final path component, or `None` for paths like `/` or `..`.
pub fn basename(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Directory containing `path`; `.` when there is none.
pub fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn is_path_relative(path: &Path) -> bool {
    path.is_relative()
}

/// Whether `path` exists, and its size in bytes if it does.
pub fn path_exists(path: &Path) -> Result<(bool, u64)> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok((true, meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((false, 0)),
        Err(e) => Err(LogError::platform(&path.display().to_string(), &e)),
    }
}

/// Anchor a relative path at the current directory and drop `.`/`..` lexically.
///
/// The file does not need to exist.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    let absolute = if is_path_relative(path) {
        current_dir()?.join(path)
    } else {
        path.to_path_buf()
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Open `path` for appending, creating it if needed.
pub fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::platform(&path.display().to_string(), &e))
}
