//! The synchronous per-call dispatch pipeline.
//!
//! snapshot config -> build shared fields -> format and write for stdout,
//! stderr, syslog, then every managed file -> aggregate. Readiness and
//! argument checks happen in the caller before any of this runs.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};

use bitflags::bitflags;

use crate::error::{LogError, Result};
use crate::filecache::FileCache;
use crate::record::FormattedRecord;
use crate::store::{ConfigStore, Snapshot};
use crate::style::StyleTable;
use crate::types::Level;

bitflags! {
    /// Destinations a dispatch wrote to successfully.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Reached: u8 {
        const STDOUT = 0x01;
        const STDERR = 0x02;
        const SYSLOG = 0x04;
        const FILES = 0x08;
    }
}

/// Counts of wanted and delivered destinations for one log call.
#[derive(Debug, Default)]
pub struct Tally {
    pub wanted: usize,
    pub delivered: usize,
    pub reached: Reached,
    first_error: Option<LogError>,
}

impl Tally {
    pub fn want(&mut self) {
        self.wanted += 1;
    }

    pub fn deliver(&mut self) {
        self.delivered += 1;
    }

    /// Record a failed destination; the first failure is the one reported.
    pub fn failed(&mut self, err: LogError) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    fn outcome(&mut self, dest: Reached, result: Result<()>) {
        match result {
            Ok(()) => {
                self.deliver();
                self.reached |= dest;
            }
            Err(err) => self.failed(err),
        }
    }

    /// Success iff at least one destination was wanted and all were delivered.
    pub fn finish(self, level: Level) -> Result<()> {
        if self.wanted == 0 {
            return Err(LogError::NoDestination(level.as_str()));
        }
        if self.delivered == self.wanted {
            Ok(())
        } else {
            Err(self.first_error.unwrap_or(LogError::Unknown))
        }
    }
}

/// The three shared sections a dispatch reads.
#[derive(Clone, Copy)]
pub(crate) struct Sections<'a> {
    pub store: &'a ConfigStore,
    pub files: &'a FileCache,
    pub styles: &'a StyleTable,
}

#[derive(Default)]
struct Buffers {
    snapshot: Snapshot,
    record: FormattedRecord,
}

thread_local! {
    static BUFFERS: RefCell<Buffers> = RefCell::new(Buffers::default());
}

/// Run `f` with this thread's reusable buffers, or fresh ones when they are
/// already in use (a log call made while formatting another) or gone
/// (thread teardown).
fn with_buffers<R>(mut f: impl FnMut(&mut Snapshot, &mut FormattedRecord) -> R) -> R {
    let pooled = BUFFERS.try_with(|cell| {
        cell.try_borrow_mut().ok().map(|mut bufs| {
            let bufs = &mut *bufs;
            f(&mut bufs.snapshot, &mut bufs.record)
        })
    });
    match pooled {
        Ok(Some(result)) => result,
        _ => f(&mut Snapshot::default(), &mut FormattedRecord::new()),
    }
}

/// Deliver one message to every destination accepting `level`.
pub(crate) fn dispatch(sections: Sections<'_>, level: Level, args: fmt::Arguments<'_>) -> Result<Tally> {
    with_buffers(|snapshot, record| {
        let result = run(sections, level, args, snapshot, record);
        // Don't keep the syslog connection alive from an idle thread.
        snapshot.syslog_sink = None;
        result
    })
}

fn run(
    sections: Sections<'_>,
    level: Level,
    args: fmt::Arguments<'_>,
    snapshot: &mut Snapshot,
    record: &mut FormattedRecord,
) -> Result<Tally> {
    sections.store.snapshot_into(snapshot)?;

    let style = sections.styles.get(level);
    let issues = record.build(level, style, &snapshot.hostname, &snapshot.process_name, args);
    if issues.any() {
        tracing::warn!(
            %level,
            truncated = issues.truncated,
            format_error = issues.format_error,
            "message formatted incompletely; delivering anyway"
        );
    }

    let mut tally = Tally::default();

    if snapshot.stdout.levels.accepts(level) {
        tally.want();
        let line = record.format(true, snapshot.stdout.opts);
        tally.outcome(Reached::STDOUT, write_console(io::stdout().lock(), line));
    }

    if snapshot.stderr.levels.accepts(level) {
        tally.want();
        let line = record.format(true, snapshot.stderr.opts);
        tally.outcome(Reached::STDERR, write_console(io::stderr().lock(), line));
    }

    if snapshot.syslog.levels.accepts(level) {
        tally.want();
        // Syslog is fire-and-forget: the sink reports its own failures and
        // the destination counts as delivered either way.
        let sent = match &snapshot.syslog_sink {
            Some(sink) => {
                let line = record.format(false, snapshot.syslog.opts);
                sink.write(level, line.strip_suffix('\n').unwrap_or(line))
                    .is_ok()
            }
            None => {
                tracing::debug!(%level, "syslog accepts the level but no sink is open");
                false
            }
        };
        tally.deliver();
        if sent {
            tally.reached |= Reached::SYSLOG;
        }
    }

    let before = tally.delivered;
    sections.files.dispatch(level, record, &mut tally);
    if tally.delivered > before {
        tally.reached |= Reached::FILES;
    }

    Ok(tally)
}

fn write_console(mut out: impl Write, line: &str) -> Result<()> {
    out.write_all(line.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| LogError::platform("console write", &e))
}
