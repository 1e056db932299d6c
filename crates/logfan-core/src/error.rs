//! Error types for logfan

use thiserror::Error;

/// Stable numeric error codes reported through the per-thread error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// The operation completed successfully
    NoError = 0,
    /// The engine has not been initialized
    NotReady = 1,
    /// The engine is already initialized
    AlreadyInitialized = 2,
    /// The file is already managed by the file cache
    DuplicateFile = 3,
    /// The file is not managed by the file cache
    FileNotFound = 4,
    /// The file cache is at capacity
    CacheFull = 5,
    /// Option flags are invalid
    InvalidOptions = 6,
    /// Level flags are invalid
    InvalidLevels = 7,
    /// Text style is invalid
    InvalidStyle = 8,
    /// Invalid string argument
    InvalidString = 9,
    /// Null handle argument
    NullPointer = 10,
    /// Invalid argument
    InvalidArgument = 11,
    /// No destination is registered for the level
    NoDestination = 12,
    /// Feature is disabled or unavailable on this platform
    Unavailable = 13,
    /// Error reported by the operating system
    Platform = 14,
    /// Error is not known
    Unknown = 4095,
}

impl ErrorCode {
    /// Numeric value of the code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Map a raw numeric code back to its variant; unmapped values become `Unknown`.
    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => Self::NoError,
            1 => Self::NotReady,
            2 => Self::AlreadyInitialized,
            3 => Self::DuplicateFile,
            4 => Self::FileNotFound,
            5 => Self::CacheFull,
            6 => Self::InvalidOptions,
            7 => Self::InvalidLevels,
            8 => Self::InvalidStyle,
            9 => Self::InvalidString,
            10 => Self::NullPointer,
            11 => Self::InvalidArgument,
            12 => Self::NoDestination,
            13 => Self::Unavailable,
            14 => Self::Platform,
            _ => Self::Unknown,
        }
    }
}

/// Main error type for logfan operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// An operation other than initialize was attempted before initialize
    #[error("logfan has not been initialized")]
    NotReady,

    /// Initialize was called twice without an intervening shutdown
    #[error("logfan is already initialized")]
    AlreadyInitialized,

    /// The path is already present in the file cache
    #[error("File already managed: {0}")]
    DuplicateFile(String),

    /// No managed file carries the identifier
    #[error("File not managed: {0}")]
    FileNotFound(u32),

    /// The file cache holds the maximum number of files
    #[error("Maximum number of files ({0}) already managed")]
    CacheFull(usize),

    /// Option bitmask contains unknown bits
    #[error("Option flags are invalid: {0:#x}")]
    InvalidOptions(u32),

    /// Level bitmask contains unknown bits
    #[error("Level flags are invalid: {0:#x}")]
    InvalidLevels(u16),

    /// Text style combination is not legal
    #[error("Text style is invalid: {0}")]
    InvalidStyle(String),

    /// String argument is empty, too long or contains NUL
    #[error("Invalid string argument: {0}")]
    InvalidString(String),

    /// The null file identifier was passed
    #[error("Null handle argument")]
    NullPointer,

    /// Argument is otherwise invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No destination's level mask includes the message level
    #[error("No destinations registered for level {0}")]
    NoDestination(&'static str),

    /// Feature is disabled or unavailable on this platform
    #[error("Feature is disabled or unavailable: {0}")]
    Unavailable(&'static str),

    /// Error reported by the operating system
    #[error("Platform error code {code}: {message}")]
    Platform {
        /// Raw OS error number, or -1 when the OS reported none
        code: i32,
        /// Human-readable description
        message: String,
    },

    /// Fallback for unmapped internal failures
    #[error("Error is not known")]
    Unknown,
}

impl LogError {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotReady => ErrorCode::NotReady,
            Self::AlreadyInitialized => ErrorCode::AlreadyInitialized,
            Self::DuplicateFile(_) => ErrorCode::DuplicateFile,
            Self::FileNotFound(_) => ErrorCode::FileNotFound,
            Self::CacheFull(_) => ErrorCode::CacheFull,
            Self::InvalidOptions(_) => ErrorCode::InvalidOptions,
            Self::InvalidLevels(_) => ErrorCode::InvalidLevels,
            Self::InvalidStyle(_) => ErrorCode::InvalidStyle,
            Self::InvalidString(_) => ErrorCode::InvalidString,
            Self::NullPointer => ErrorCode::NullPointer,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NoDestination(_) => ErrorCode::NoDestination,
            Self::Unavailable(_) => ErrorCode::Unavailable,
            Self::Platform { .. } => ErrorCode::Platform,
            Self::Unknown => ErrorCode::Unknown,
        }
    }

    /// Build a platform error from an I/O error, attaching what was being attempted.
    pub(crate) fn platform(context: &str, err: &std::io::Error) -> Self {
        Self::Platform {
            code: err.raw_os_error().unwrap_or(-1),
            message: format!("{context}: {err}"),
        }
    }

    /// Build a platform error from any error, walking its source chain.
    ///
    /// The first `io::Error` carrying a raw OS code supplies `code`; every
    /// cause is appended to the message.
    #[cfg_attr(not(unix), allow(dead_code))]
    pub(crate) fn chained(context: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut code = None;
        let mut message = format!("{context}: {err}");
        let mut cause = Some(err);
        let mut first = true;
        while let Some(current) = cause {
            if code.is_none() {
                code = current
                    .downcast_ref::<std::io::Error>()
                    .and_then(std::io::Error::raw_os_error);
            }
            if !first {
                message.push_str(": ");
                message.push_str(&current.to_string());
            }
            first = false;
            cause = current.source();
        }
        Self::Platform {
            code: code.unwrap_or(-1),
            message,
        }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        Self::Platform {
            code: err.raw_os_error().unwrap_or(-1),
            message: err.to_string(),
        }
    }
}

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;
