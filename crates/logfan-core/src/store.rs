//! Global configuration store.
//!
//! Holds the resolved console/syslog destination configuration, the process
//! identity and the syslog connection between `initialize` and `shutdown`.
//! Readers never keep the lock across formatting or I/O: the dispatch path
//! copies what it needs into a [`Snapshot`] and releases the lock.

use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;

use crate::config::{
    Config, DestinationConfig, FALLBACK_SYSLOG_CAT, FALLBACK_SYSLOG_ID, MAX_NAME, MAX_SYSLOG_CAT,
    MAX_SYSLOG_ID, STDERR_DEFAULT_LEVELS, STDERR_DEFAULT_OPTIONS, STDOUT_DEFAULT_LEVELS,
    STDOUT_DEFAULT_OPTIONS, SYSLOG_DEFAULT_LEVELS, SYSLOG_DEFAULT_OPTIONS,
};
use crate::error::{LogError, Result};
use crate::platform;
use crate::syslog::{self, SyslogSink};
use crate::types::{Levels, Options};
use crate::validate::{truncate_at_boundary, validate_levels, validate_options, validate_str};

/// Destination addressed by an update or getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
    Syslog,
}

impl Target {
    fn default_levels(self) -> Levels {
        match self {
            Target::Stdout => STDOUT_DEFAULT_LEVELS,
            Target::Stderr => STDERR_DEFAULT_LEVELS,
            Target::Syslog => SYSLOG_DEFAULT_LEVELS,
        }
    }

    fn default_options(self) -> Options {
        match self {
            Target::Stdout => STDOUT_DEFAULT_OPTIONS,
            Target::Stderr => STDERR_DEFAULT_OPTIONS,
            Target::Syslog => SYSLOG_DEFAULT_OPTIONS,
        }
    }
}

bitflags! {
    /// Fields an [`Update`] applies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpdateFields: u8 {
        const LEVELS = 0x01;
        const OPTIONS = 0x02;
        const SYSLOG_ID = 0x04;
        const SYSLOG_CAT = 0x08;
    }
}

/// New values for a runtime update; only the fields named in `fields` are read.
#[derive(Debug, Clone, Copy)]
pub struct Update<'a> {
    pub target: Target,
    pub fields: UpdateFields,
    pub levels: Levels,
    pub opts: Options,
    pub identity: &'a str,
    pub category: &'a str,
}

impl<'a> Update<'a> {
    pub fn levels(target: Target, levels: Levels) -> Self {
        Self::empty(target, UpdateFields::LEVELS).with_levels(levels)
    }

    pub fn options(target: Target, opts: Options) -> Self {
        let mut update = Self::empty(target, UpdateFields::OPTIONS);
        update.opts = opts;
        update
    }

    pub fn identity(identity: &'a str) -> Self {
        let mut update = Self::empty(Target::Syslog, UpdateFields::SYSLOG_ID);
        update.identity = identity;
        update
    }

    pub fn category(category: &'a str) -> Self {
        let mut update = Self::empty(Target::Syslog, UpdateFields::SYSLOG_CAT);
        update.category = category;
        update
    }

    fn empty(target: Target, fields: UpdateFields) -> Self {
        Self {
            target,
            fields,
            levels: Levels::DEFAULT,
            opts: Options::DEFAULT,
            identity: "",
            category: "",
        }
    }

    fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    /// Resolve sentinels and check every present field.
    fn validated(mut self) -> Result<Self> {
        if self.fields.intersects(UpdateFields::SYSLOG_ID | UpdateFields::SYSLOG_CAT)
            && self.target != Target::Syslog
        {
            return Err(LogError::InvalidArgument(
                "identity and category only apply to syslog".to_string(),
            ));
        }
        if self.target == Target::Syslog {
            syslog::ensure_available()?;
        }
        if self.fields.contains(UpdateFields::LEVELS) {
            self.levels = validate_levels(self.levels.or_default(self.target.default_levels()))?;
        }
        if self.fields.contains(UpdateFields::OPTIONS) {
            self.opts = validate_options(self.opts.or_default(self.target.default_options()))?;
        }
        if self.fields.contains(UpdateFields::SYSLOG_ID) {
            validate_str(self.identity, MAX_SYSLOG_ID, "syslog identity")?;
        }
        if self.fields.contains(UpdateFields::SYSLOG_CAT) {
            validate_str(self.category, MAX_SYSLOG_CAT, "syslog category")?;
        }
        Ok(self)
    }
}

#[derive(Debug)]
struct StoreState {
    config: Config,
    hostname: String,
    syslog: Option<Arc<SyslogSink>>,
}

impl StoreState {
    fn destination_mut(&mut self, target: Target) -> (&mut Levels, &mut Options) {
        match target {
            Target::Stdout => (&mut self.config.stdout.levels, &mut self.config.stdout.opts),
            Target::Stderr => (&mut self.config.stderr.levels, &mut self.config.stderr.opts),
            Target::Syslog => (&mut self.config.syslog.levels, &mut self.config.syslog.opts),
        }
    }

    fn destination(&self, target: Target) -> DestinationConfig {
        match target {
            Target::Stdout => self.config.stdout,
            Target::Stderr => self.config.stderr,
            Target::Syslog => {
                DestinationConfig::new(self.config.syslog.levels, self.config.syslog.opts)
            }
        }
    }

    /// Open or close the syslog connection to match the current level mask.
    fn sync_syslog(&mut self) {
        let wanted = syslog::available() && !self.config.syslog.levels.is_empty();
        match (&self.syslog, wanted) {
            (None, true) => {
                self.syslog = Some(Arc::new(SyslogSink::open(&self.config.syslog.identity)));
                tracing::debug!(identity = %self.config.syslog.identity, "syslog opened");
            }
            (Some(_), false) => {
                self.syslog = None;
                tracing::debug!("syslog closed");
            }
            _ => {}
        }
    }
}

/// Per-call copy of the store taken by the dispatch path.
///
/// Refilled in place with `clone_from`, so a thread-local snapshot reuses
/// its string buffers from call to call.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub stdout: DestinationConfig,
    pub stderr: DestinationConfig,
    pub syslog: DestinationConfig,
    pub process_name: String,
    pub hostname: String,
    pub syslog_sink: Option<Arc<SyslogSink>>,
}

/// Mutex-guarded singleton record of destination configuration.
#[derive(Debug)]
pub struct ConfigStore {
    inner: Mutex<Option<StoreState>>,
}

impl ConfigStore {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Install a resolved configuration.
    ///
    /// Derives the process name and syslog identity when the config leaves
    /// them empty, and opens syslog if it accepts any level. A syslog
    /// connect failure is not fatal.
    pub fn install(&self, mut config: Config) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.is_some() {
            return Err(LogError::AlreadyInitialized);
        }

        if config.process_name.is_empty() {
            config.process_name = platform::executable_basename().unwrap_or_default();
        }
        truncate_at_boundary(&mut config.process_name, MAX_NAME);

        if config.syslog.identity.is_empty() {
            config.syslog.identity = if config.process_name.is_empty() {
                FALLBACK_SYSLOG_ID.to_string()
            } else {
                config.process_name.clone()
            };
        }
        truncate_at_boundary(&mut config.syslog.identity, MAX_SYSLOG_ID);

        if config.syslog.category.is_empty() {
            config.syslog.category = FALLBACK_SYSLOG_CAT.to_string();
        }
        truncate_at_boundary(&mut config.syslog.category, MAX_SYSLOG_CAT);

        if !syslog::available() && !config.syslog.levels.is_empty() {
            tracing::debug!("no system logger on this platform; syslog levels cleared");
            config.syslog.levels = Levels::NONE;
        }

        let mut state = StoreState {
            config,
            hostname: platform::hostname(),
            syslog: None,
        };
        state.sync_syslog();
        *inner = Some(state);
        Ok(())
    }

    /// Forget the configuration and close syslog. Returns false if nothing was installed.
    pub fn clear(&self) -> bool {
        self.inner.lock().take().is_some()
    }

    pub fn is_installed(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Copy the current configuration into `snapshot`.
    pub fn snapshot_into(&self, snapshot: &mut Snapshot) -> Result<()> {
        let inner = self.inner.lock();
        let state = inner.as_ref().ok_or(LogError::NotReady)?;
        snapshot.stdout = state.config.stdout;
        snapshot.stderr = state.config.stderr;
        snapshot.syslog = state.destination(Target::Syslog);
        snapshot.process_name.clone_from(&state.config.process_name);
        snapshot.hostname.clone_from(&state.hostname);
        snapshot.syslog_sink.clone_from(&state.syslog);
        Ok(())
    }

    /// Apply the fields of `update`. Unchanged values are a no-op.
    pub fn update(&self, update: Update<'_>) -> Result<()> {
        let update = update.validated()?;

        let mut inner = self.inner.lock();
        let state = inner.as_mut().ok_or(LogError::NotReady)?;

        {
            let (levels, opts) = state.destination_mut(update.target);
            if update.fields.contains(UpdateFields::LEVELS) && *levels != update.levels {
                *levels = update.levels;
            }
            if update.fields.contains(UpdateFields::OPTIONS) && *opts != update.opts {
                *opts = update.opts;
            }
        }

        if update.fields.contains(UpdateFields::SYSLOG_CAT)
            && state.config.syslog.category != update.category
        {
            state.config.syslog.category = update.category.to_string();
        }

        if update.fields.contains(UpdateFields::SYSLOG_ID)
            && state.config.syslog.identity != update.identity
        {
            state.config.syslog.identity = update.identity.to_string();
            if state.syslog.take().is_some() {
                tracing::debug!(identity = update.identity, "syslog identity changed; reconnecting");
            }
        }

        if update.target == Target::Syslog {
            state.sync_syslog();
        }
        Ok(())
    }

    pub fn destination(&self, target: Target) -> Result<DestinationConfig> {
        let inner = self.inner.lock();
        inner
            .as_ref()
            .map(|state| state.destination(target))
            .ok_or(LogError::NotReady)
    }

    pub fn process_name(&self) -> Result<String> {
        self.read(|state| state.config.process_name.clone())
    }

    pub fn syslog_identity(&self) -> Result<String> {
        self.read(|state| state.config.syslog.identity.clone())
    }

    pub fn syslog_category(&self) -> Result<String> {
        self.read(|state| state.config.syslog.category.clone())
    }

    /// True while a syslog sink exists (connected or awaiting reconnect).
    pub fn syslog_open(&self) -> Result<bool> {
        self.read(|state| state.syslog.is_some())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T> {
        let inner = self.inner.lock();
        inner.as_ref().map(f).ok_or(LogError::NotReady)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
