//! The [`Logger`] handle: lifecycle and every public operation.
//!
//! Each operation clears the calling thread's last error on entry and
//! records its failure, with the caller's location, on exit.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::Config;
use crate::dispatch::{self, Sections, Tally};
use crate::error::{LogError, Result};
use crate::filecache::{FileCache, FileInfo};
use crate::last_error;
use crate::store::{ConfigStore, Target, Update};
use crate::style::StyleTable;
use crate::types::{FileId, Level, Levels, Options, TextStyle};

/// A complete logging engine: configuration store, file cache and style table.
///
/// All locks are built in a `const fn`, so a `Logger` can live in a
/// `static` (see [`crate::global`]) or be owned by a caller.
#[derive(Debug)]
pub struct Logger {
    ready: AtomicBool,
    lifecycle: Mutex<()>,
    store: ConfigStore,
    files: FileCache,
    styles: StyleTable,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            store: ConfigStore::new(),
            files: FileCache::new(),
            styles: StyleTable::new(),
        }
    }

    /// True between a successful `initialize` and the next `shutdown`.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(LogError::NotReady)
        }
    }

    /// Run `f` while holding the lifecycle lock, so a concurrent `shutdown`
    /// cannot clear state between the readiness check and the mutation.
    fn with_lifecycle<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _lifecycle = self.lifecycle.lock();
        self.ensure_ready()?;
        f()
    }

    fn sections(&self) -> Sections<'_> {
        Sections {
            store: &self.store,
            files: &self.files,
            styles: &self.styles,
        }
    }

    // Lifecycle

    /// Resolve defaults in `config`, install it and mark the engine ready.
    #[track_caller]
    pub fn initialize(&self, config: Config) -> Result<()> {
        last_error::clear();
        last_error::capture(self.try_initialize(config))
    }

    fn try_initialize(&self, mut config: Config) -> Result<()> {
        if self.is_ready() {
            return Err(LogError::AlreadyInitialized);
        }
        config.resolve()?;

        let _lifecycle = self.lifecycle.lock();
        if self.is_ready() {
            return Err(LogError::AlreadyInitialized);
        }
        self.store.install(config)?;
        self.ready.store(true, Ordering::Release);
        tracing::debug!("logfan initialized");
        Ok(())
    }

    /// Close every file and syslog, restore default styles, and mark the engine not ready.
    #[track_caller]
    pub fn shutdown(&self) -> Result<()> {
        last_error::clear();
        last_error::capture(self.try_shutdown())
    }

    fn try_shutdown(&self) -> Result<()> {
        self.ensure_ready()?;
        let _lifecycle = self.lifecycle.lock();
        self.ensure_ready()?;

        let closed = self.files.destroy();
        self.store.clear();
        self.styles.reset();
        self.ready.store(false, Ordering::Release);
        tracing::debug!(files_closed = closed, "logfan shut down");
        Ok(())
    }

    // Logging

    /// Deliver a message at `level` to every destination that accepts it.
    ///
    /// Fails with `NoDestination` if none does, or with the first
    /// destination failure if any wanted destination was not written.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) -> Result<()> {
        last_error::clear();
        let result = self.dispatch(level, args).and_then(|tally| tally.finish(level));
        last_error::capture(result)
    }

    pub(crate) fn dispatch(&self, level: Level, args: fmt::Arguments<'_>) -> Result<Tally> {
        self.ensure_ready()?;
        if args.as_str() == Some("") {
            return Err(LogError::InvalidString("format string is empty".to_string()));
        }
        dispatch::dispatch(self.sections(), level, args)
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Debug, args)
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Info, args)
    }

    #[track_caller]
    pub fn notice(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Notice, args)
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Warn, args)
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Error, args)
    }

    #[track_caller]
    pub fn crit(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Crit, args)
    }

    #[track_caller]
    pub fn alert(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Alert, args)
    }

    #[track_caller]
    pub fn emerg(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Emerg, args)
    }

    // Files

    /// Start writing to `path`. `Levels::DEFAULT` / `Options::DEFAULT`
    /// select every level and every field except the host name.
    #[track_caller]
    pub fn add_file(&self, path: &str, levels: Levels, opts: Options) -> Result<FileId> {
        last_error::clear();
        let result = self.with_lifecycle(|| self.files.add(path, levels, opts));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn remove_file(&self, id: FileId) -> Result<()> {
        last_error::clear();
        let result = self.ensure_ready().and_then(|()| self.files.remove(id));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn set_file_levels(&self, id: FileId, levels: Levels) -> Result<()> {
        last_error::clear();
        let result = self
            .ensure_ready()
            .and_then(|()| self.files.set_levels(id, levels));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn set_file_opts(&self, id: FileId, opts: Options) -> Result<()> {
        last_error::clear();
        let result = self
            .ensure_ready()
            .and_then(|()| self.files.set_opts(id, opts));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn file_levels(&self, id: FileId) -> Result<Levels> {
        last_error::clear();
        let result = self.ensure_ready().and_then(|()| self.files.levels(id));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn file_opts(&self, id: FileId) -> Result<Options> {
        last_error::clear();
        let result = self.ensure_ready().and_then(|()| self.files.opts(id));
        last_error::capture(result)
    }

    /// Snapshot of every managed file.
    #[track_caller]
    pub fn files(&self) -> Result<Vec<FileInfo>> {
        last_error::clear();
        let result = self.ensure_ready().map(|()| self.files.files());
        last_error::capture(result)
    }

    // Styles

    #[track_caller]
    pub fn set_style(&self, level: Level, style: TextStyle) -> Result<()> {
        last_error::clear();
        let result = self.with_lifecycle(|| self.styles.set(level, style));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn reset_styles(&self) -> Result<()> {
        last_error::clear();
        let result = self.ensure_ready().map(|()| self.styles.reset());
        last_error::capture(result)
    }

    #[track_caller]
    pub fn get_style(&self, level: Level) -> Result<TextStyle> {
        last_error::clear();
        let result = self.ensure_ready().map(|()| self.styles.get(level));
        last_error::capture(result)
    }

    // Console and syslog destinations

    #[track_caller]
    fn apply(&self, update: Update<'_>) -> Result<()> {
        last_error::clear();
        let result = self.ensure_ready().and_then(|()| self.store.update(update));
        last_error::capture(result)
    }

    #[track_caller]
    fn read<T>(&self, f: impl FnOnce(&ConfigStore) -> Result<T>) -> Result<T> {
        last_error::clear();
        let result = self.ensure_ready().and_then(|()| f(&self.store));
        last_error::capture(result)
    }

    #[track_caller]
    pub fn set_stdout_levels(&self, levels: Levels) -> Result<()> {
        self.apply(Update::levels(Target::Stdout, levels))
    }

    #[track_caller]
    pub fn set_stdout_opts(&self, opts: Options) -> Result<()> {
        self.apply(Update::options(Target::Stdout, opts))
    }

    #[track_caller]
    pub fn set_stderr_levels(&self, levels: Levels) -> Result<()> {
        self.apply(Update::levels(Target::Stderr, levels))
    }

    #[track_caller]
    pub fn set_stderr_opts(&self, opts: Options) -> Result<()> {
        self.apply(Update::options(Target::Stderr, opts))
    }

    /// Setting any level opens the syslog connection; `Levels::NONE` closes it.
    #[track_caller]
    pub fn set_syslog_levels(&self, levels: Levels) -> Result<()> {
        self.apply(Update::levels(Target::Syslog, levels))
    }

    #[track_caller]
    pub fn set_syslog_opts(&self, opts: Options) -> Result<()> {
        self.apply(Update::options(Target::Syslog, opts))
    }

    /// Change the syslog identity; an open connection is re-established under it.
    #[track_caller]
    pub fn set_syslog_identity(&self, identity: &str) -> Result<()> {
        self.apply(Update::identity(identity))
    }

    #[track_caller]
    pub fn set_syslog_category(&self, category: &str) -> Result<()> {
        self.apply(Update::category(category))
    }

    #[track_caller]
    pub fn stdout_levels(&self) -> Result<Levels> {
        self.read(|store| store.destination(Target::Stdout).map(|d| d.levels))
    }

    #[track_caller]
    pub fn stdout_opts(&self) -> Result<Options> {
        self.read(|store| store.destination(Target::Stdout).map(|d| d.opts))
    }

    #[track_caller]
    pub fn stderr_levels(&self) -> Result<Levels> {
        self.read(|store| store.destination(Target::Stderr).map(|d| d.levels))
    }

    #[track_caller]
    pub fn stderr_opts(&self) -> Result<Options> {
        self.read(|store| store.destination(Target::Stderr).map(|d| d.opts))
    }

    #[track_caller]
    pub fn syslog_levels(&self) -> Result<Levels> {
        self.read(|store| store.destination(Target::Syslog).map(|d| d.levels))
    }

    #[track_caller]
    pub fn syslog_opts(&self) -> Result<Options> {
        self.read(|store| store.destination(Target::Syslog).map(|d| d.opts))
    }

    #[track_caller]
    pub fn syslog_identity(&self) -> Result<String> {
        self.read(ConfigStore::syslog_identity)
    }

    #[track_caller]
    pub fn syslog_category(&self) -> Result<String> {
        self.read(ConfigStore::syslog_category)
    }

    /// Name shown in stdio and file output.
    #[track_caller]
    pub fn process_name(&self) -> Result<String> {
        self.read(ConfigStore::process_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{make_default_config, STDERR_DEFAULT_LEVELS, STDOUT_DEFAULT_LEVELS};
    use crate::dispatch::Reached;
    use crate::error::ErrorCode;
    use crate::last_error::get_last_error;
    use crate::types::Color;
    use tempfile::TempDir;

    fn no_syslog() -> Config {
        make_default_config().with_syslog(Levels::NONE, Options::DEFAULT)
    }

    #[test]
    fn test_not_ready_before_initialize() {
        let logger = Logger::new();
        assert_eq!(logger.info(format_args!("early")), Err(LogError::NotReady));
        assert_eq!(get_last_error().0, ErrorCode::NotReady);
        assert_eq!(logger.shutdown(), Err(LogError::NotReady));
    }

    #[test]
    fn test_double_initialize_keeps_first_config() {
        let logger = Logger::new();
        logger.initialize(no_syslog().with_process_name("one")).unwrap();
        assert_eq!(
            logger.initialize(no_syslog().with_process_name("two")),
            Err(LogError::AlreadyInitialized)
        );
        assert_eq!(logger.process_name().unwrap(), "one");
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_lifecycle_can_repeat() {
        let logger = Logger::new();
        for _ in 0..3 {
            logger.initialize(no_syslog()).unwrap();
            assert!(logger.is_ready());
            logger.shutdown().unwrap();
            assert!(!logger.is_ready());
        }
    }

    #[test]
    fn test_success_clears_previous_error() {
        let logger = Logger::new();
        let _ = logger.remove_file(FileId::from_raw(1));
        assert_eq!(get_last_error().0, ErrorCode::NotReady);

        logger.initialize(no_syslog()).unwrap();
        assert_eq!(get_last_error().0, ErrorCode::NoError);
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_error_location_is_caller() {
        let logger = Logger::new();
        let _ = logger.set_stdout_levels(Levels::ALL);
        let (_, message) = get_last_error();
        assert!(message.contains("logger.rs"), "{message}");
    }

    #[test]
    fn test_info_goes_to_stdout_and_file_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.log");
        let logger = Logger::new();
        logger.initialize(no_syslog()).unwrap();
        logger
            .add_file(path.to_str().unwrap(), Levels::ALL, Options::DEFAULT)
            .unwrap();

        let tally = logger.dispatch(Level::Info, format_args!("hello {}", 1)).unwrap();
        assert_eq!(tally.reached, Reached::STDOUT | Reached::FILES);
        assert_eq!(tally.delivered, tally.wanted);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.ends_with("hello 1\n"));
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_no_destination_for_silenced_level() {
        let logger = Logger::new();
        logger
            .initialize(no_syslog().with_stdout(Levels::ERROR, Options::DEFAULT))
            .unwrap();
        assert_eq!(
            logger.debug(format_args!("unheard")),
            Err(LogError::NoDestination("debug"))
        );
        assert_eq!(get_last_error().0, ErrorCode::NoDestination);
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_empty_format_rejected() {
        let logger = Logger::new();
        logger.initialize(no_syslog()).unwrap();
        assert!(matches!(
            logger.info(format_args!("")),
            Err(LogError::InvalidString(_))
        ));
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_console_setters_resolve_sentinels() {
        let logger = Logger::new();
        logger.initialize(no_syslog()).unwrap();

        logger.set_stdout_levels(Levels::NONE).unwrap();
        assert_eq!(logger.stdout_levels().unwrap(), Levels::NONE);
        logger.set_stdout_levels(Levels::DEFAULT).unwrap();
        assert_eq!(logger.stdout_levels().unwrap(), STDOUT_DEFAULT_LEVELS);
        assert_eq!(logger.stderr_levels().unwrap(), STDERR_DEFAULT_LEVELS);

        logger.set_stderr_opts(Options::MSGONLY).unwrap();
        assert_eq!(logger.stderr_opts().unwrap(), Options::MSGONLY);
        logger.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_resets_styles_and_files() {
        let temp = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.initialize(no_syslog()).unwrap();
        logger
            .add_file(
                temp.path().join("s.log").to_str().unwrap(),
                Levels::ALL,
                Options::ALL,
            )
            .unwrap();
        let custom = TextStyle::fg(Color::Green).bright();
        logger.set_style(Level::Info, custom).unwrap();
        assert_eq!(logger.get_style(Level::Info).unwrap(), custom);

        logger.shutdown().unwrap();
        logger.initialize(no_syslog()).unwrap();
        assert_ne!(logger.get_style(Level::Info).unwrap(), custom);
        assert!(logger.files().unwrap().is_empty());
        logger.shutdown().unwrap();
    }
}
