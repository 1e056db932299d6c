//! Engine configuration, compiled-in defaults and limits.
//!
//! A [`Config`] may carry the `DEFAULT` sentinels for any level or option
//! field. [`Config::resolve`] replaces them with the per-destination
//! defaults below and validates the result; the engine only ever stores
//! resolved configurations.

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};
use crate::types::{Levels, Options};
use crate::validate::{validate_levels, validate_options};

/// Maximum number of simultaneously managed log files.
pub const MAX_FILES: usize = 16;
/// Size in bytes at which a managed file is archived and restarted.
pub const FILE_ROLL_SIZE: u64 = 5 * 1024 * 1024;
/// Maximum bytes of a formatted message body.
pub const MAX_MESSAGE: usize = 4096;
/// Maximum bytes of the process name.
pub const MAX_NAME: usize = 32;
/// Maximum bytes of a log file path.
pub const MAX_PATH: usize = 4096;
/// Maximum bytes of the system logger identity.
pub const MAX_SYSLOG_ID: usize = 128;
/// Maximum bytes of the system logger category.
pub const MAX_SYSLOG_CAT: usize = 64;
/// Maximum bytes of the thread id/name segment.
pub const MAX_TID: usize = 16;
/// Maximum bytes of the host name segment.
pub const MAX_HOST: usize = 64;
/// Maximum bytes of an error message returned by `get_last_error`.
pub const MAX_ERROR: usize = 256;

/// Identity used for the system logger when nothing better is known.
pub const FALLBACK_SYSLOG_ID: &str = "logfan";
/// Category used for the system logger when none is configured.
pub const FALLBACK_SYSLOG_CAT: &str = "general";

pub const STDOUT_DEFAULT_LEVELS: Levels = Levels::DEBUG
    .union(Levels::INFO)
    .union(Levels::NOTICE)
    .union(Levels::WARN);
pub const STDOUT_DEFAULT_OPTIONS: Options = Options::NOTIME
    .union(Options::NOHOST)
    .union(Options::NOPID)
    .union(Options::NOTID);

pub const STDERR_DEFAULT_LEVELS: Levels = Levels::ERROR
    .union(Levels::CRIT)
    .union(Levels::ALERT)
    .union(Levels::EMERG);
pub const STDERR_DEFAULT_OPTIONS: Options = STDOUT_DEFAULT_OPTIONS;

pub const SYSLOG_DEFAULT_LEVELS: Levels = Levels::NOTICE
    .union(Levels::WARN)
    .union(Levels::ERROR)
    .union(Levels::CRIT)
    .union(Levels::ALERT)
    .union(Levels::EMERG);
pub const SYSLOG_DEFAULT_OPTIONS: Options = Options::MSGONLY;

pub const FILE_DEFAULT_LEVELS: Levels = Levels::ALL;
pub const FILE_DEFAULT_OPTIONS: Options = Options::NOHOST;

/// Level and formatting configuration of one destination.
///
/// Fields missing from a serialized form keep their `DEFAULT` sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub levels: Levels,
    pub opts: Options,
}

impl DestinationConfig {
    pub const fn new(levels: Levels, opts: Options) -> Self {
        Self { levels, opts }
    }

    fn resolve(&mut self, levels: Levels, opts: Options) -> Result<()> {
        self.levels = validate_levels(self.levels.or_default(levels))?;
        self.opts = validate_options(self.opts.or_default(opts))?;
        Ok(())
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self::new(Levels::DEFAULT, Options::DEFAULT)
    }
}

/// System logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogConfig {
    pub levels: Levels,
    pub opts: Options,
    /// Identity reported to the system logger; empty means "derive one".
    pub identity: String,
    /// Category for loggers that group messages; empty means the fallback.
    pub category: String,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            levels: Levels::DEFAULT,
            opts: Options::DEFAULT,
            identity: String::new(),
            category: String::new(),
        }
    }
}

/// Initialization data handed to `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stdout: DestinationConfig,
    pub stderr: DestinationConfig,
    pub syslog: SyslogConfig,
    /// Name shown in stdio and file output; empty means the executable's name.
    pub process_name: String,
}

impl Default for Config {
    fn default() -> Self {
        make_default_config()
    }
}

/// A configuration using the default levels and options everywhere.
pub fn make_default_config() -> Config {
    Config {
        stdout: DestinationConfig::default(),
        stderr: DestinationConfig::default(),
        syslog: SyslogConfig::default(),
        process_name: String::new(),
    }
}

impl Config {
    /// Replace every sentinel with its destination default, then validate.
    pub fn resolve(&mut self) -> Result<()> {
        self.stdout
            .resolve(STDOUT_DEFAULT_LEVELS, STDOUT_DEFAULT_OPTIONS)?;
        self.stderr
            .resolve(STDERR_DEFAULT_LEVELS, STDERR_DEFAULT_OPTIONS)?;

        self.syslog.levels = validate_levels(self.syslog.levels.or_default(SYSLOG_DEFAULT_LEVELS))?;
        self.syslog.opts = validate_options(self.syslog.opts.or_default(SYSLOG_DEFAULT_OPTIONS))?;

        for (value, what) in [
            (&self.process_name, "process name"),
            (&self.syslog.identity, "syslog identity"),
            (&self.syslog.category, "syslog category"),
        ] {
            if value.contains('\0') {
                return Err(LogError::InvalidString(format!("{what} contains a NUL byte")));
            }
        }
        Ok(())
    }

    /// Builder-style helper: set stdout levels and options.
    pub fn with_stdout(mut self, levels: Levels, opts: Options) -> Self {
        self.stdout = DestinationConfig::new(levels, opts);
        self
    }

    /// Builder-style helper: set stderr levels and options.
    pub fn with_stderr(mut self, levels: Levels, opts: Options) -> Self {
        self.stderr = DestinationConfig::new(levels, opts);
        self
    }

    /// Builder-style helper: set syslog levels and options.
    pub fn with_syslog(mut self, levels: Levels, opts: Options) -> Self {
        self.syslog.levels = levels;
        self.syslog.opts = opts;
        self
    }

    /// Builder-style helper: set the process name.
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = name.into();
        self
    }
}
