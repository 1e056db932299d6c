//! logfan CLI
//!
//! Thin wrapper around logfan-core for driving the engine from a shell.
//!
//! ## Usage
//!
//! ```bash
//! # Log one message to the console and a file
//! logfan log warn "disk almost full" --file /var/tmp/app.log
//!
//! # Hammer the engine from several threads, then verify every file
//! logfan race --threads 8 --messages 1000 --dir /tmp/race
//!
//! # Measure stdout and file throughput
//! logfan perf --lines 100000 --dir /tmp/perf
//!
//! # Start from a JSON configuration, without the system logger
//! logfan --config logfan.json --no-syslog log info "hello"
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use logfan_core::{
    get_last_error, make_default_config, Color, Config, Level, Levels, LogError, Logger, Options,
    TextStyle,
};
use rand::Rng;

/// logfan - multi-destination logging engine
#[derive(Parser)]
#[command(name = "logfan")]
#[command(version = "0.1.0")]
#[command(about = "logfan - multi-destination logging engine")]
#[command(
    long_about = "Fans each message out to stdout, stderr, the system logger and managed log files, each with its own level filter and formatting."
)]
struct Cli {
    /// Increase verbosity of logfan's own diagnostics (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file holding the engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Don't send anything to the system logger
    #[arg(long, global = true)]
    no_syslog: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a single message
    Log {
        /// Severity (debug, info, notice, warn, error, crit, alert, emerg)
        level: Level,

        /// Message text
        message: String,

        /// Also write to this file (repeatable)
        #[arg(short, long)]
        file: Vec<PathBuf>,
    },

    /// Log from several threads while files and options change underneath
    Race {
        /// Number of threads, one per severity level
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(1..=8))]
        threads: u8,

        /// Messages per thread
        #[arg(short, long, default_value_t = 1000)]
        messages: usize,

        /// Directory for the per-thread log files
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Measure dispatch throughput to stdout and to a file
    Perf {
        /// Lines per destination
        #[arg(short, long, default_value_t = 100_000)]
        lines: usize,

        /// Directory for the log file
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Build the engine configuration from `--config` and `--no-syslog`.
fn load_config(path: Option<&Path>, no_syslog: bool) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => make_default_config(),
    };
    if no_syslog {
        config.syslog.levels = Levels::NONE;
    }
    Ok(config)
}

/// Turn an engine failure into an error carrying the thread's last-error message.
fn engine_error(err: LogError) -> anyhow::Error {
    let (code, message) = get_last_error();
    anyhow!("{message} (code {})", code.as_u16()).context(err)
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", path.display()))
}

fn run_log(logger: &Logger, level: Level, message: &str, files: &[PathBuf]) -> Result<()> {
    for file in files {
        logger
            .add_file(path_arg(file)?, Levels::DEFAULT, Options::DEFAULT)
            .map_err(engine_error)?;
    }
    logger
        .log(level, format_args!("{message}"))
        .map_err(engine_error)
}

/// Per-thread outcome of a race run.
struct RaceReport {
    thread: usize,
    path: PathBuf,
    expected: usize,
    removals: usize,
}

fn race_thread(logger: &Logger, thread: usize, messages: usize, dir: &Path) -> Result<RaceReport> {
    let level = Level::ALL[thread];
    let path = dir.join(format!("race-{thread}.log"));
    let path_str = path_arg(&path)?.to_string();
    let mut rng = rand::rng();

    // Line counts are verified per run.
    match std::fs::remove_file(&path) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
            return Err(anyhow!(err).context(format!("clearing {}", path.display())));
        }
        _ => {}
    }

    let mut id = Some(
        logger
            .add_file(&path_str, level.bit(), Options::DEFAULT)
            .map_err(engine_error)?,
    );
    let mut report = RaceReport {
        thread,
        path: path.clone(),
        expected: 0,
        removals: 0,
    };

    for n in 0..messages {
        if rng.random_bool(0.05) {
            match id.take() {
                Some(current) => {
                    logger.remove_file(current).map_err(engine_error)?;
                    report.removals += 1;
                }
                None => {
                    id = Some(
                        logger
                            .add_file(&path_str, level.bit(), Options::DEFAULT)
                            .map_err(engine_error)?,
                    );
                }
            }
        }

        if let Some(current) = id {
            if rng.random_bool(0.05) {
                let opts = if rng.random_bool(0.5) {
                    Options::MSGONLY
                } else {
                    Options::DEFAULT
                };
                logger.set_file_opts(current, opts).map_err(engine_error)?;
            }
        }

        if rng.random_bool(0.02) {
            let fg = Color::ALL[rng.random_range(1..Color::ALL.len())];
            logger
                .set_style(level, TextStyle::fg(fg))
                .map_err(engine_error)?;
        }

        match logger.log(level, format_args!("[t{thread}] race message {n}")) {
            Ok(()) if id.is_some() => report.expected += 1,
            Ok(()) => {}
            Err(LogError::NoDestination(_)) if id.is_none() => {}
            Err(err) => return Err(engine_error(err)),
        }
    }

    if let Some(current) = id {
        logger.remove_file(current).map_err(engine_error)?;
    }
    Ok(report)
}

fn verify_race(report: &RaceReport) -> Result<()> {
    let contents = std::fs::read_to_string(&report.path)
        .with_context(|| format!("reading {}", report.path.display()))?;
    let tag = format!("[t{}] race message ", report.thread);
    let lines: Vec<&str> = contents.lines().collect();

    if lines.len() != report.expected {
        bail!(
            "{}: expected {} lines, found {}",
            report.path.display(),
            report.expected,
            lines.len()
        );
    }
    if let Some(bad) = lines.iter().find(|line| !line.contains(&tag)) {
        bail!("{}: foreign or corrupt line {:?}", report.path.display(), bad);
    }
    Ok(())
}

fn run_race(logger: &Logger, threads: usize, messages: usize, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    logger.set_stdout_levels(Levels::NONE).map_err(engine_error)?;
    logger.set_stderr_levels(Levels::NONE).map_err(engine_error)?;
    if logfan_core::syslog::available() {
        logger.set_syslog_levels(Levels::NONE).map_err(engine_error)?;
    }

    let started = Instant::now();
    let reports: Vec<Result<RaceReport>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|thread| {
                std::thread::Builder::new()
                    .name(format!("race-{thread}"))
                    .spawn_scoped(s, move || race_thread(logger, thread, messages, dir))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("race thread panicked"))),
                Err(err) => Err(anyhow!("spawning race thread: {err}")),
            })
            .collect()
    });
    let elapsed = started.elapsed();

    let mut failures = 0;
    for report in reports {
        match report.and_then(|r| verify_race(&r).map(|()| r)) {
            Ok(r) => println!(
                "thread {}: {} lines verified in {} ({} removals)",
                r.thread,
                r.expected,
                r.path.display(),
                r.removals
            ),
            Err(err) => {
                failures += 1;
                eprintln!("{err:#}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {threads} threads failed verification");
    }
    println!("race passed: {threads} threads x {messages} messages in {elapsed:?}");
    Ok(())
}

fn rate(lines: usize, elapsed: Duration) -> f64 {
    lines as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
}

fn run_perf(logger: &Logger, lines: usize, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    logger.set_stdout_levels(Levels::INFO).map_err(engine_error)?;
    logger.set_stderr_levels(Levels::NONE).map_err(engine_error)?;
    let started = Instant::now();
    for n in 0..lines {
        logger
            .info(format_args!("perf stdout line {n}"))
            .map_err(engine_error)?;
    }
    let stdout_elapsed = started.elapsed();

    let path = dir.join("perf.log");
    logger.set_stdout_levels(Levels::NONE).map_err(engine_error)?;
    let id = logger
        .add_file(path_arg(&path)?, Levels::INFO, Options::DEFAULT)
        .map_err(engine_error)?;
    let started = Instant::now();
    for n in 0..lines {
        logger
            .info(format_args!("perf file line {n}"))
            .map_err(engine_error)?;
    }
    let file_elapsed = started.elapsed();
    logger.remove_file(id).map_err(engine_error)?;

    println!(
        "stdout: {lines} lines in {stdout_elapsed:?} ({:.0} lines/sec)",
        rate(lines, stdout_elapsed)
    );
    println!(
        "file: {lines} lines in {file_elapsed:?} ({:.0} lines/sec)",
        rate(lines, file_elapsed)
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.no_syslog)?;
    let logger = logfan_core::logger();
    logger.initialize(config).map_err(engine_error)?;
    tracing::info!("engine initialized");

    let result = match cli.command {
        Commands::Log {
            level,
            message,
            file,
        } => run_log(logger, level, &message, &file),
        Commands::Race {
            threads,
            messages,
            dir,
        } => run_race(logger, usize::from(threads), messages, &dir),
        Commands::Perf { lines, dir } => run_perf(logger, lines, &dir),
    };

    let shutdown = logger.shutdown().map_err(engine_error);
    result.and(shutdown)
}
