//! System logger destination.
//!
//! On Unix the connection goes through the `syslog` crate (RFC 3164 over the
//! local socket). The connection is opened when the destination gets a
//! non-empty level mask and dropped when the sink is dropped. A failed
//! connect is not fatal: the sink retries on the next write.

use parking_lot::Mutex;

use crate::error::{LogError, Result};
use crate::types::Level;

#[cfg(unix)]
mod imp {
    use syslog::{Facility, Formatter3164, Logger, LoggerBackend};

    use crate::error::{LogError, Result};
    use crate::types::Level;

    pub struct Connection(Logger<LoggerBackend, Formatter3164>);

    fn platform(err: syslog::Error) -> LogError {
        LogError::chained("syslog", &err)
    }

    pub fn connect(identity: &str) -> Result<Connection> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_USER,
            hostname: None,
            process: identity.to_string(),
            pid: std::process::id(),
        };
        syslog::unix(formatter).map(Connection).map_err(platform)
    }

    impl Connection {
        pub fn send(&mut self, level: Level, message: &str) -> Result<()> {
            let logger = &mut self.0;
            match level {
                Level::Emerg => logger.emerg(message),
                Level::Alert => logger.alert(message),
                Level::Crit => logger.crit(message),
                Level::Error => logger.err(message),
                Level::Warn => logger.warning(message),
                Level::Notice => logger.notice(message),
                Level::Info => logger.info(message),
                Level::Debug => logger.debug(message),
            }
            .map_err(platform)
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use crate::error::{LogError, Result};
    use crate::types::Level;

    pub struct Connection;

    pub fn connect(_identity: &str) -> Result<Connection> {
        Err(LogError::Unavailable("system logger"))
    }

    impl Connection {
        pub fn send(&mut self, _level: Level, _message: &str) -> Result<()> {
            Err(LogError::Unavailable("system logger"))
        }
    }
}

/// True if this build can talk to a system logger.
pub const fn available() -> bool {
    cfg!(unix)
}

/// Fail with `Unavailable` on builds without a system logger.
pub fn ensure_available() -> Result<()> {
    if available() {
        Ok(())
    } else {
        Err(LogError::Unavailable("system logger"))
    }
}

/// Open (or pending) connection to the system logger under one identity.
pub struct SyslogSink {
    identity: String,
    state: Mutex<SinkState>,
}

struct SinkState {
    conn: Option<imp::Connection>,
    /// Set after a failure has been reported; cleared by the next success.
    failing: bool,
}

impl SyslogSink {
    /// Connect under `identity`. A connect failure is logged and retried later.
    pub fn open(identity: &str) -> Self {
        let state = match imp::connect(identity) {
            Ok(conn) => SinkState {
                conn: Some(conn),
                failing: false,
            },
            Err(err) => {
                tracing::warn!(identity, error = %err, "syslog connection failed; will retry");
                SinkState {
                    conn: None,
                    failing: true,
                }
            }
        };
        Self {
            identity: identity.to_string(),
            state: Mutex::new(state),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().conn.is_some()
    }

    /// Send one message at `level`, reconnecting first if needed.
    ///
    /// Only the first failure of an outage is logged at `warn`; repeats
    /// go to `debug` until a send succeeds again.
    pub fn write(&self, level: Level, message: &str) -> Result<()> {
        let mut state = self.state.lock();
        let result = Self::send(&mut state, &self.identity, level, message);
        match &result {
            Ok(()) if state.failing => {
                state.failing = false;
                tracing::info!(identity = %self.identity, "syslog delivery restored");
            }
            Ok(()) => {}
            Err(err) if state.failing => {
                tracing::debug!(identity = %self.identity, error = %err, "syslog write failed");
            }
            Err(err) => {
                state.failing = true;
                tracing::warn!(identity = %self.identity, error = %err, "syslog write failed");
            }
        }
        result
    }

    fn send(state: &mut SinkState, identity: &str, level: Level, message: &str) -> Result<()> {
        if state.conn.is_none() {
            state.conn = Some(imp::connect(identity)?);
            tracing::debug!(identity, "syslog reconnected");
        }
        let result = match state.conn.as_mut() {
            Some(conn) => conn.send(level, message),
            None => Err(LogError::Unknown),
        };
        if result.is_err() {
            // Drop a broken connection so the next write reconnects.
            state.conn = None;
        }
        result
    }
}

impl std::fmt::Debug for SyslogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyslogSink")
            .field("identity", &self.identity)
            .field("connected", &self.is_connected())
            .finish()
    }
}
