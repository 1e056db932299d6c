//! logfan core library
//!
//! Synchronous multi-destination logging: each message is fanned out to the
//! console streams, the system logger and any number of managed log files,
//! each with its own level filter and field options.
//!
//! ## Overview
//!
//! - **Destinations**: stdout, stderr, syslog (Unix) and up to
//!   [`config::MAX_FILES`] files. Files roll over to a date-stamped archive
//!   once they reach [`config::FILE_ROLL_SIZE`].
//! - **Synchronous**: a log call returns after every wanted destination has
//!   been written. It fails if no destination accepts the level, or if any
//!   wanted destination could not be written.
//! - **Per-thread errors**: every operation returns a `Result` and also
//!   records its failure on the calling thread, queryable with
//!   [`get_last_error`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use logfan_core::{make_default_config, Levels, Options};
//!
//! fn main() -> logfan_core::Result<()> {
//!     logfan_core::initialize(make_default_config())?;
//!     let id = logfan_core::add_file("app.log", Levels::DEFAULT, Options::DEFAULT)?;
//!
//!     logfan_core::info!("listening on port {}", 8080)?;
//!
//!     logfan_core::remove_file(id)?;
//!     logfan_core::shutdown()
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod filecache;
pub mod global;
pub mod last_error;
pub mod logger;
pub mod platform;
pub mod record;
pub mod store;
pub mod style;
pub mod syslog;
pub mod types;
pub mod validate;

// Re-exports
pub use config::{make_default_config, Config, DestinationConfig, SyslogConfig};
pub use error::{ErrorCode, LogError, Result};
pub use filecache::FileInfo;
pub use global::{
    add_file, file_levels, file_opts, files, get_style, initialize, is_ready, logger, remove_file,
    reset_styles, set_file_levels, set_file_opts, set_stderr_levels, set_stderr_opts,
    set_stdout_levels, set_stdout_opts, set_style, set_syslog_category, set_syslog_identity,
    set_syslog_levels, set_syslog_opts, shutdown, stderr_levels, stderr_opts, stdout_levels,
    stdout_opts, syslog_category, syslog_identity, syslog_levels, syslog_opts,
};
pub use last_error::{get_last_error, last_error, LastError};
pub use logger::Logger;
pub use style::default_style;
pub use types::*;
