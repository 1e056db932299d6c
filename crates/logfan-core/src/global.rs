//! Process-wide logger and the free-function API over it.
//!
//! Every function here forwards to one static [`Logger`]. Use the macros
//! ([`info!`](crate::info) and friends) for `format!`-style messages.

use std::fmt;

use crate::config::Config;
use crate::error::Result;
use crate::filecache::FileInfo;
use crate::logger::Logger;
use crate::types::{FileId, Level, Levels, Options, TextStyle};

static LOGGER: Logger = Logger::new();

/// The process-wide logger.
pub fn logger() -> &'static Logger {
    &LOGGER
}

#[track_caller]
pub fn initialize(config: Config) -> Result<()> {
    LOGGER.initialize(config)
}

#[track_caller]
pub fn shutdown() -> Result<()> {
    LOGGER.shutdown()
}

pub fn is_ready() -> bool {
    LOGGER.is_ready()
}

#[track_caller]
pub fn log(level: Level, args: fmt::Arguments<'_>) -> Result<()> {
    LOGGER.log(level, args)
}

#[track_caller]
pub fn add_file(path: &str, levels: Levels, opts: Options) -> Result<FileId> {
    LOGGER.add_file(path, levels, opts)
}

#[track_caller]
pub fn remove_file(id: FileId) -> Result<()> {
    LOGGER.remove_file(id)
}

#[track_caller]
pub fn set_file_levels(id: FileId, levels: Levels) -> Result<()> {
    LOGGER.set_file_levels(id, levels)
}

#[track_caller]
pub fn set_file_opts(id: FileId, opts: Options) -> Result<()> {
    LOGGER.set_file_opts(id, opts)
}

#[track_caller]
pub fn file_levels(id: FileId) -> Result<Levels> {
    LOGGER.file_levels(id)
}

#[track_caller]
pub fn file_opts(id: FileId) -> Result<Options> {
    LOGGER.file_opts(id)
}

#[track_caller]
pub fn files() -> Result<Vec<FileInfo>> {
    LOGGER.files()
}

#[track_caller]
pub fn set_style(level: Level, style: TextStyle) -> Result<()> {
    LOGGER.set_style(level, style)
}

#[track_caller]
pub fn reset_styles() -> Result<()> {
    LOGGER.reset_styles()
}

#[track_caller]
pub fn get_style(level: Level) -> Result<TextStyle> {
    LOGGER.get_style(level)
}

#[track_caller]
pub fn set_stdout_levels(levels: Levels) -> Result<()> {
    LOGGER.set_stdout_levels(levels)
}

#[track_caller]
pub fn set_stdout_opts(opts: Options) -> Result<()> {
    LOGGER.set_stdout_opts(opts)
}

#[track_caller]
pub fn set_stderr_levels(levels: Levels) -> Result<()> {
    LOGGER.set_stderr_levels(levels)
}

#[track_caller]
pub fn set_stderr_opts(opts: Options) -> Result<()> {
    LOGGER.set_stderr_opts(opts)
}

#[track_caller]
pub fn set_syslog_levels(levels: Levels) -> Result<()> {
    LOGGER.set_syslog_levels(levels)
}

#[track_caller]
pub fn set_syslog_opts(opts: Options) -> Result<()> {
    LOGGER.set_syslog_opts(opts)
}

#[track_caller]
pub fn set_syslog_identity(identity: &str) -> Result<()> {
    LOGGER.set_syslog_identity(identity)
}

#[track_caller]
pub fn set_syslog_category(category: &str) -> Result<()> {
    LOGGER.set_syslog_category(category)
}

#[track_caller]
pub fn stdout_levels() -> Result<Levels> {
    LOGGER.stdout_levels()
}

#[track_caller]
pub fn stdout_opts() -> Result<Options> {
    LOGGER.stdout_opts()
}

#[track_caller]
pub fn stderr_levels() -> Result<Levels> {
    LOGGER.stderr_levels()
}

#[track_caller]
pub fn stderr_opts() -> Result<Options> {
    LOGGER.stderr_opts()
}

#[track_caller]
pub fn syslog_levels() -> Result<Levels> {
    LOGGER.syslog_levels()
}

#[track_caller]
pub fn syslog_opts() -> Result<Options> {
    LOGGER.syslog_opts()
}

#[track_caller]
pub fn syslog_identity() -> Result<String> {
    LOGGER.syslog_identity()
}

#[track_caller]
pub fn syslog_category() -> Result<String> {
    LOGGER.syslog_category()
}

/// Log through the process-wide logger at an explicit level.
///
/// ```ignore
/// logfan_core::log!(Level::Notice, "{} jobs queued", jobs.len())?;
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::global::log($level, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Debug, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Info, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! notice {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Notice, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Warn, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Error, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! crit {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Crit, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! alert {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Alert, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! emerg {
    ($($arg:tt)+) => {
        $crate::global::log($crate::Level::Emerg, ::std::format_args!($($arg)+))
    };
}
