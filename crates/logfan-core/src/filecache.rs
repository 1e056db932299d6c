//! Bounded cache of managed log files with size-based rotation.
//!
//! The cache mutex is held for an entire dispatch pass over the files, so
//! rotation is atomic with respect to concurrent appends, adds and removes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::config::{FILE_DEFAULT_LEVELS, FILE_DEFAULT_OPTIONS, FILE_ROLL_SIZE, MAX_FILES, MAX_PATH};
use crate::dispatch::Tally;
use crate::error::{LogError, Result};
use crate::platform;
use crate::record::FormattedRecord;
use crate::types::{FileId, Level, Levels, Options};
use crate::validate::{validate_file_id, validate_levels, validate_options, validate_str};

/// Identifiers are process-wide and never reused.
static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(1);

const ARCHIVE_STAMP: &str = "%Y%m%d-%H%M%S";
const HEADER_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Public view of one managed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub id: FileId,
    pub path: PathBuf,
    pub levels: Levels,
    pub opts: Options,
    /// Bytes in the active file.
    pub size: u64,
}

#[derive(Debug)]
struct ManagedFile {
    id: FileId,
    path: PathBuf,
    levels: Levels,
    opts: Options,
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl ManagedFile {
    fn open(id: FileId, path: PathBuf, levels: Levels, opts: Options) -> Result<Self> {
        let file = platform::open_append(&path)?;
        let size = file
            .metadata()
            .map_err(|e| LogError::platform(&path.display().to_string(), &e))?
            .len();
        Ok(Self {
            id,
            path,
            levels,
            opts,
            writer: Some(BufWriter::new(file)),
            size,
        })
    }

    fn info(&self) -> FileInfo {
        FileInfo {
            id: self.id,
            path: self.path.clone(),
            levels: self.levels,
            opts: self.opts,
            size: self.size,
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| LogError::platform(&self.path.display().to_string(), &e)),
            None => Ok(()),
        }
    }

    /// Append one line, rolling the file first if it would pass the threshold.
    ///
    /// A failed roll is returned as the result even when the line itself
    /// was written to the best-effort handle.
    fn write(&mut self, line: &str) -> Result<()> {
        let len = line.len() as u64;
        let mut rolled = Ok(());
        if self.size > 0 && self.size + len > FILE_ROLL_SIZE {
            rolled = self.roll(platform::current_time());
            if let Err(err) = &rolled {
                tracing::warn!(id = %self.id, path = %self.path.display(), error = %err, "rollover failed");
            }
        }

        self.append(line.as_bytes())?;
        rolled
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(BufWriter::new(platform::open_append(&self.path)?));
        }
        let path = &self.path;
        let writer = self.writer.as_mut().ok_or(LogError::Unknown)?;
        writer
            .write_all(bytes)
            .and_then(|_| writer.flush())
            .map_err(|e| LogError::platform(&path.display().to_string(), &e))?;
        self.size += bytes.len() as u64;
        Ok(())
    }

    /// Archive the active file under a date-stamped name and start a fresh one.
    fn roll(&mut self, now: DateTime<Local>) -> Result<()> {
        self.flush()?;
        let archive = archive_path(&self.path, now)?;

        // Close before renaming.
        self.writer = None;
        let renamed = std::fs::rename(&self.path, &archive)
            .map_err(|e| LogError::platform(&archive.display().to_string(), &e));

        let file = platform::open_append(&self.path)?;
        self.size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.writer = Some(BufWriter::new(file));
        renamed?;

        tracing::debug!(id = %self.id, archive = %archive.display(), "log file rolled over");

        if self.opts.wants_header() {
            let name = platform::basename(&archive).unwrap_or_default();
            let header = format!(
                "----- archived as {} due to size @ {} -----\n",
                name,
                now.format(HEADER_TIME)
            );
            self.append(header.as_bytes())?;
        }
        Ok(())
    }
}

/// Date-stamped archive path next to `path`, unique on disk.
///
/// `dir/app.log` becomes `dir/app-20240309-140507.log`; if that is taken,
/// `dir/app-20240309-140507-1.log` and so on.
pub fn archive_path(path: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let dir = platform::dirname(path);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LogError::InvalidString(format!("{} has no file name", path.display())))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let stamp = now.format(ARCHIVE_STAMP).to_string();

    let mut candidate = dir.join(format!("{stem}-{stamp}{ext}"));
    let mut seq = 1u32;
    while platform::path_exists(&candidate)?.0 {
        candidate = dir.join(format!("{stem}-{stamp}-{seq}{ext}"));
        seq += 1;
    }
    Ok(candidate)
}

/// Mutex-guarded, bounded collection of managed files.
#[derive(Debug)]
pub struct FileCache {
    files: Mutex<Vec<ManagedFile>>,
}

impl FileCache {
    pub const fn new() -> Self {
        Self {
            files: Mutex::new(Vec::new()),
        }
    }

    /// Start managing `path`. Sentinel levels/options select the file defaults.
    pub fn add(&self, path: &str, levels: Levels, opts: Options) -> Result<FileId> {
        validate_str(path, MAX_PATH, "file path")?;
        let levels = validate_levels(levels.or_default(FILE_DEFAULT_LEVELS))?;
        let opts = validate_options(opts.or_default(FILE_DEFAULT_OPTIONS))?;
        let resolved = platform::resolve_path(path)?;

        let mut files = self.files.lock();
        if files.len() >= MAX_FILES {
            return Err(LogError::CacheFull(MAX_FILES));
        }
        if files.iter().any(|f| f.path == resolved) {
            return Err(LogError::DuplicateFile(path.to_string()));
        }

        let id = FileId::from_raw(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed));
        let file = ManagedFile::open(id, resolved, levels, opts)?;
        tracing::debug!(%id, path = %file.path.display(), size = file.size, "file added");
        files.push(file);
        Ok(id)
    }

    /// Flush, close and forget the file. The entry is removed even if the flush fails.
    pub fn remove(&self, id: FileId) -> Result<()> {
        validate_file_id(id)?;
        let mut files = self.files.lock();
        let idx = files
            .iter()
            .position(|f| f.id == id)
            .ok_or(LogError::FileNotFound(id.as_u32()))?;
        let mut file = files.remove(idx);
        drop(files);

        tracing::debug!(%id, path = %file.path.display(), "file removed");
        file.flush()
    }

    pub fn set_levels(&self, id: FileId, levels: Levels) -> Result<()> {
        validate_file_id(id)?;
        let levels = validate_levels(levels.or_default(FILE_DEFAULT_LEVELS))?;
        self.with_file(id, |f| f.levels = levels)
    }

    pub fn set_opts(&self, id: FileId, opts: Options) -> Result<()> {
        validate_file_id(id)?;
        let opts = validate_options(opts.or_default(FILE_DEFAULT_OPTIONS))?;
        self.with_file(id, |f| f.opts = opts)
    }

    pub fn levels(&self, id: FileId) -> Result<Levels> {
        validate_file_id(id)?;
        self.with_file(id, |f| f.levels)
    }

    pub fn opts(&self, id: FileId) -> Result<Options> {
        validate_file_id(id)?;
        self.with_file(id, |f| f.opts)
    }

    pub fn info(&self, id: FileId) -> Result<FileInfo> {
        validate_file_id(id)?;
        self.with_file(id, |f| f.info())
    }

    /// Every managed file, in insertion order.
    pub fn files(&self) -> Vec<FileInfo> {
        self.files.lock().iter().map(ManagedFile::info).collect()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush and close every file; returns how many were managed.
    pub fn destroy(&self) -> usize {
        let mut files = self.files.lock();
        let count = files.len();
        for mut file in files.drain(..) {
            if let Err(err) = file.flush() {
                tracing::warn!(id = %file.id, error = %err, "flush on close failed");
            }
        }
        count
    }

    /// Write `record` to every file accepting `level`, counting into `tally`.
    ///
    /// A failing file does not stop the pass.
    pub fn dispatch(&self, level: Level, record: &mut FormattedRecord, tally: &mut Tally) {
        let mut files = self.files.lock();
        for file in files.iter_mut().filter(|f| f.levels.accepts(level)) {
            tally.want();
            let line = record.format(false, file.opts);
            match file.write(line) {
                Ok(()) => tally.deliver(),
                Err(err) => {
                    tracing::warn!(id = %file.id, error = %err, "file write failed");
                    tally.failed(err);
                }
            }
        }
    }

    fn with_file<T>(&self, id: FileId, f: impl FnOnce(&mut ManagedFile) -> T) -> Result<T> {
        let mut files = self.files.lock();
        files
            .iter_mut()
            .find(|file| file.id == id)
            .map(f)
            .ok_or(LogError::FileNotFound(id.as_u32()))
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::types::TextStyle;

    fn path_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    fn record(message: &str) -> FormattedRecord {
        let mut rec = FormattedRecord::new();
        rec.build(Level::Info, TextStyle::default(), "", "test", format_args!("{message}"));
        rec
    }

    #[test]
    fn test_add_uses_file_defaults() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        let id = cache
            .add(&path_in(&temp, "a.log"), Levels::DEFAULT, Options::DEFAULT)
            .unwrap();

        assert!(!id.is_null());
        assert_eq!(cache.levels(id).unwrap(), FILE_DEFAULT_LEVELS);
        assert_eq!(cache.opts(id).unwrap(), FILE_DEFAULT_OPTIONS);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        let path = path_in(&temp, "dup.log");
        cache.add(&path, Levels::ALL, Options::ALL).unwrap();

        // Same file through a non-normalized path.
        let sneaky = format!("{}/./dup.log", temp.path().display());
        assert!(matches!(
            cache.add(&sneaky, Levels::ALL, Options::ALL),
            Err(LogError::DuplicateFile(_))
        ));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_full_never_opens_extra_file() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        for n in 0..MAX_FILES {
            cache
                .add(&path_in(&temp, &format!("f{n}.log")), Levels::ALL, Options::ALL)
                .unwrap();
        }

        let extra = path_in(&temp, "extra.log");
        assert_eq!(
            cache.add(&extra, Levels::ALL, Options::ALL),
            Err(LogError::CacheFull(MAX_FILES))
        );
        assert!(!Path::new(&extra).exists());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        let path = path_in(&temp, "reuse.log");
        let first = cache.add(&path, Levels::ALL, Options::ALL).unwrap();
        cache.remove(first).unwrap();
        let second = cache.add(&path, Levels::ALL, Options::ALL).unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.remove(first), Err(LogError::FileNotFound(first.as_u32())));
    }

    #[test]
    fn test_null_id_and_bad_masks() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        let id = cache
            .add(&path_in(&temp, "m.log"), Levels::ALL, Options::ALL)
            .unwrap();

        assert_eq!(cache.remove(FileId::NULL), Err(LogError::NullPointer));
        assert_eq!(
            cache.set_levels(id, Levels::from_bits_retain(0x0800)),
            Err(LogError::InvalidLevels(0x0800))
        );
        assert_eq!(cache.levels(id).unwrap(), Levels::ALL);

        cache.set_opts(id, Options::MSGONLY).unwrap();
        assert_eq!(cache.opts(id).unwrap(), Options::MSGONLY);
    }

    #[test]
    fn test_dispatch_filters_by_level() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        let errors = path_in(&temp, "errors.log");
        let all = path_in(&temp, "all.log");
        cache.add(&errors, Levels::ERROR, Options::MSGONLY).unwrap();
        cache.add(&all, Levels::ALL, Options::MSGONLY).unwrap();

        let mut rec = record("only info");
        let mut tally = Tally::default();
        cache.dispatch(Level::Info, &mut rec, &mut tally);

        assert_eq!((tally.wanted, tally.delivered), (1, 1));
        assert_eq!(std::fs::read_to_string(&all).unwrap(), "only info\n");
        assert_eq!(std::fs::read_to_string(&errors).unwrap(), "");
    }

    #[test]
    fn test_archive_name_collision() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("app.log");
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single().unwrap();

        let first = archive_path(&base, now).unwrap();
        assert_eq!(first, temp.path().join("app-20240309-140507.log"));

        std::fs::write(&first, b"").unwrap();
        let second = archive_path(&base, now).unwrap();
        assert_eq!(second, temp.path().join("app-20240309-140507-1.log"));
    }

    #[test]
    fn test_rollover_writes_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roll.log");
        let file = File::create(&path).unwrap();
        file.set_len(FILE_ROLL_SIZE - 4).unwrap();
        drop(file);

        let cache = FileCache::new();
        let id = cache
            .add(path.to_str().unwrap(), Levels::ALL, Options::MSGONLY)
            .unwrap();
        assert_eq!(cache.info(id).unwrap().size, FILE_ROLL_SIZE - 4);

        let mut rec = record("over the edge");
        let mut tally = Tally::default();
        cache.dispatch(Level::Info, &mut rec, &mut tally);
        assert_eq!(tally.delivered, 1);

        let fresh = std::fs::read_to_string(&path).unwrap();
        assert!(fresh.starts_with("----- archived as roll-"));
        assert!(fresh.ends_with("over the edge\n"));

        let count = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_destroy_closes_everything() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new();
        cache
            .add(&path_in(&temp, "x.log"), Levels::ALL, Options::ALL)
            .unwrap();
        cache
            .add(&path_in(&temp, "y.log"), Levels::ALL, Options::ALL)
            .unwrap();
        assert_eq!(cache.destroy(), 2);
        assert!(cache.is_empty());
        assert!(cache.files().is_empty());
    }
}
