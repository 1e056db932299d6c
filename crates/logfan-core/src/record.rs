//! The per-call formatted record.
//!
//! Shared fields (style escape, time, host, level tag, name, pid, tid and
//! message) are built once per log call; [`FormattedRecord::format`] then
//! assembles a destination-specific line from them according to that
//! destination's options. All buffers are reused across calls.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, Timelike};

use crate::config::{MAX_HOST, MAX_MESSAGE, MAX_NAME};
use crate::platform;
use crate::style::{render_style_escape, END_STYLE};
use crate::types::{Level, Options, TextStyle};
use crate::validate::{copy_truncated, truncate_at_boundary};

const TIME_FORMAT: &str = "%H:%M:%S";
const PID_SEPARATOR: char = '.';

/// What went wrong while building a record. The record is still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildIssues {
    /// The message body exceeded the maximum and was cut.
    pub truncated: bool,
    /// A `Display` implementation in the arguments reported an error.
    pub format_error: bool,
}

impl BuildIssues {
    pub fn any(self) -> bool {
        self.truncated || self.format_error
    }
}

/// Reusable buffers for one log call.
#[derive(Debug, Default)]
pub struct FormattedRecord {
    style: String,
    timestamp: String,
    msec: String,
    host: String,
    level: String,
    name: String,
    pid: String,
    tid: String,
    message: String,
    output: String,
}

impl FormattedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the shared fields for a message at `level`.
    pub fn build(
        &mut self,
        level: Level,
        style: TextStyle,
        host: &str,
        name: &str,
        args: fmt::Arguments<'_>,
    ) -> BuildIssues {
        self.build_at(platform::current_time(), level, style, host, name, args)
    }

    pub(crate) fn build_at(
        &mut self,
        now: DateTime<Local>,
        level: Level,
        style: TextStyle,
        host: &str,
        name: &str,
        args: fmt::Arguments<'_>,
    ) -> BuildIssues {
        let mut issues = BuildIssues::default();

        render_style_escape(style, &mut self.style);

        self.timestamp.clear();
        if write!(self.timestamp, "{}", now.format(TIME_FORMAT)).is_err() {
            issues.format_error = true;
            self.timestamp.clear();
        }
        self.msec.clear();
        let _ = write!(self.msec, ".{:03}", (now.nanosecond() / 1_000_000).min(999));

        copy_truncated(&mut self.host, host, MAX_HOST);

        self.level.clear();
        self.level.push('[');
        self.level.push_str(level.as_str());
        self.level.push(']');

        copy_truncated(&mut self.name, name, MAX_NAME);

        let pid = platform::process_id();
        self.pid.clear();
        let _ = write!(self.pid, "{pid}");

        let tid = platform::thread_id();
        self.tid.clear();
        if tid != u64::from(pid) && !platform::thread_name(&mut self.tid) {
            let _ = write!(self.tid, "{tid}");
        }

        self.message.clear();
        if self.message.write_fmt(args).is_err() {
            issues.format_error = true;
        }
        issues.truncated = truncate_at_boundary(&mut self.message, MAX_MESSAGE);
        issues
    }

    /// The message body alone.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Assemble the line for one destination.
    ///
    /// Layout: `[style]time.msec host [level] name(pid.tid): message[reset]\n`,
    /// with each segment present only when `opts` allows it and it has a value.
    pub fn format(&mut self, styling: bool, opts: Options) -> &str {
        let out = &mut self.output;
        out.clear();

        if styling {
            out.push_str(&self.style);
        }

        let mut first = true;
        if opts.wants_time() && !self.timestamp.is_empty() {
            out.push_str(&self.timestamp);
            if opts.wants_msec() {
                out.push_str(&self.msec);
            }
            first = false;
        }

        if opts.wants_host() && !self.host.is_empty() {
            if !first {
                out.push(' ');
            }
            out.push_str(&self.host);
            first = false;
        }

        if opts.wants_level() {
            if !first {
                out.push(' ');
            }
            out.push_str(&self.level);
            first = false;
        }

        let mut named = false;
        if opts.wants_name() && !self.name.is_empty() {
            if !first {
                out.push(' ');
            }
            out.push_str(&self.name);
            first = false;
            named = true;
        }

        let want_pid = opts.wants_pid() && !self.pid.is_empty();
        let want_tid = opts.wants_tid() && !self.tid.is_empty();
        if want_pid || want_tid {
            if named {
                out.push('(');
            } else if !first {
                out.push(' ');
            }
            if want_pid {
                out.push_str(&self.pid);
            }
            if want_tid {
                if want_pid {
                    out.push(PID_SEPARATOR);
                }
                out.push_str(&self.tid);
            }
            if named {
                out.push(')');
            }
            first = false;
        }

        if !first {
            out.push_str(": ");
        }
        out.push_str(&self.message);

        if styling {
            out.push_str(END_STYLE);
        }
        out.push('\n');
        &self.output
    }
}
