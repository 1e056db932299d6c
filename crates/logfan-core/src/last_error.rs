//! Per-thread last-error channel.
//!
//! Every public operation clears the calling thread's record when it starts
//! and stores the failure (with the caller's source location) when it fails.
//! Records are never shared between threads, so two threads racing on
//! different calls cannot observe each other's errors.

use std::cell::RefCell;
use std::panic::Location;

use crate::config::MAX_ERROR;
use crate::error::{ErrorCode, LogError};
use crate::validate::truncate_at_boundary;

/// Snapshot of the calling thread's most recent error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    /// Error code
    pub code: ErrorCode,
    /// Raw OS error number, for platform errors
    pub os_code: Option<i32>,
    /// Human-readable message including the call site
    pub message: String,
    /// Source file of the failing call
    pub file: Option<&'static str>,
    /// Source line of the failing call
    pub line: Option<u32>,
}

#[derive(Debug, Default)]
struct ThreadError {
    error: Option<LogError>,
    location: Option<&'static Location<'static>>,
}

thread_local! {
    static THREAD_ERROR: RefCell<ThreadError> = RefCell::new(ThreadError::default());
}

/// Reset the calling thread's record to "no error".
pub(crate) fn clear() {
    THREAD_ERROR.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.error = None;
        slot.location = None;
    });
}

/// Store `err` as the calling thread's last error, remembering the caller.
#[track_caller]
pub(crate) fn set(err: &LogError) {
    let location = Location::caller();
    THREAD_ERROR.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.error = Some(err.clone());
        slot.location = Some(location);
    });
}

/// Record the outcome of a public operation and hand it back unchanged.
#[track_caller]
pub(crate) fn capture<T>(result: Result<T, LogError>) -> Result<T, LogError> {
    if let Err(err) = &result {
        set(err);
    }
    result
}

/// Code and message of the calling thread's last error.
///
/// Querying does not clear the record, so repeated calls return the same
/// answer until the thread makes another call into the engine.
pub fn get_last_error() -> (ErrorCode, String) {
    let last = last_error();
    (last.code, last.message)
}

/// Full detail of the calling thread's last error.
pub fn last_error() -> LastError {
    THREAD_ERROR.with(|cell| {
        let slot = cell.borrow();
        match &slot.error {
            None => LastError {
                code: ErrorCode::NoError,
                os_code: None,
                message: "The operation completed successfully".to_string(),
                file: None,
                line: None,
            },
            Some(err) => {
                let os_code = match err {
                    LogError::Platform { code, .. } => Some(*code),
                    _ => None,
                };
                let mut message = match slot.location {
                    Some(loc) => format!("Error at {}:{}: '{}'", loc.file(), loc.line(), err),
                    None => format!("Error: '{}'", err),
                };
                truncate_at_boundary(&mut message, MAX_ERROR);
                LastError {
                    code: err.code(),
                    os_code,
                    message,
                    file: slot.location.map(|loc| loc.file()),
                    line: slot.location.map(|loc| loc.line()),
                }
            }
        }
    })
}
