//! Logger construction helpers.
//!
//! A [`Logger`] owns its own `tracing` dispatcher, built from a
//! `tracing_subscriber` fmt subscriber that writes to stdout, a log file or
//! a caller-supplied writer and drops events below the configured level.
//! Loggers are not installed globally; share them through a
//! [`LoggerRegistry`] instead.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use gag::BufferRedirect;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn, Dispatch};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::{Error, Result};

/// Severity of a log message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that did not stop the operation.
    Warning,
    /// An operation failed.
    Error,
    /// The program cannot continue. Emitted at tracing's `ERROR` level.
    Critical,
}

impl LogLevel {
    /// Returns the conventional numeric value (10 for `DEBUG` through 50
    /// for `CRITICAL`).
    pub fn as_number(self) -> u8 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Returns the canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(Error::invalid_argument(format!("unknown log level '{s}'"))),
        }
    }
}

/// Where a logger writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Console,
    /// Append to a file, creating it and its parent directories if needed.
    File(PathBuf),
    /// Console when `verbose` is set, otherwise `file`.
    ByVerbosity {
        /// Selects the console.
        verbose: bool,
        /// Log file used when not verbose.
        file: PathBuf,
    },
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Output target.
    pub target: LogTarget,
    /// Minimum severity written.
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Console,
            level: LogLevel::Info,
        }
    }
}

/// Resolved output of a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Standard output.
    Console,
    /// A log file.
    File(PathBuf),
    /// A caller-supplied writer.
    Custom,
}

/// A named logger with a fixed minimum level and output.
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: LogLevel,
    destination: LogDestination,
    dispatch: Dispatch,
}

impl Logger {
    /// Creates a logger writing through `writer`.
    pub fn with_writer(name: impl Into<String>, level: LogLevel, writer: BoxMakeWriter) -> Self {
        Self::assemble(name.into(), level, LogDestination::Custom, writer, false)
    }

    fn assemble(
        name: String,
        level: LogLevel,
        destination: LogDestination,
        writer: BoxMakeWriter,
        ansi: bool,
    ) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_max_level(level.level_filter())
            .with_ansi(ansi)
            .with_target(false)
            .finish();
        Self {
            name,
            level,
            destination,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Returns the logger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the minimum level this logger writes.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns where this logger writes.
    pub fn destination(&self) -> &LogDestination {
        &self.destination
    }

    /// Returns whether a message at `level` would be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Writes `message` at `level`.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let name = self.name.as_str();
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Debug => debug!(logger = %name, "{message}"),
            LogLevel::Info => info!(logger = %name, "{message}"),
            LogLevel::Warning => warn!(logger = %name, "{message}"),
            LogLevel::Error => error!(logger = %name, "{message}"),
            LogLevel::Critical => error!(logger = %name, critical = true, "{message}"),
        });
    }

    /// Writes `message` at `DEBUG`.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Writes `message` at `INFO`.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Writes `message` at `WARNING`.
    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Writes `message` at `ERROR`.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Writes `message` at `CRITICAL`.
    pub fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    let setup_error = |source: io::Error| Error::LogSetup {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(setup_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(setup_error)
}

/// Builds a logger from `config`.
///
/// Fails with [`Error::LogSetup`] if a log file or its directory cannot be
/// created.
pub fn build_logger(name: &str, config: &LogConfig) -> Result<Logger> {
    let file = match &config.target {
        LogTarget::Console | LogTarget::ByVerbosity { verbose: true, .. } => None,
        LogTarget::File(path) | LogTarget::ByVerbosity { file: path, .. } => Some(path),
    };

    match file {
        None => Ok(Logger::assemble(
            name.to_string(),
            config.level,
            LogDestination::Console,
            BoxMakeWriter::new(io::stdout),
            true,
        )),
        Some(path) => {
            let handle = open_log_file(path)?;
            Ok(Logger::assemble(
                name.to_string(),
                config.level,
                LogDestination::File(path.clone()),
                BoxMakeWriter::new(Mutex::new(handle)),
                false,
            ))
        }
    }
}

/// Builds a logger writing to stdout. `level` is a name such as `"INFO"`.
pub fn stdout_logger(name: &str, level: &str) -> Result<Logger> {
    build_logger(
        name,
        &LogConfig {
            target: LogTarget::Console,
            level: level.parse()?,
        },
    )
}

/// Builds a logger appending to `path`.
pub fn file_logger(name: &str, path: impl Into<PathBuf>, level: &str) -> Result<Logger> {
    build_logger(
        name,
        &LogConfig {
            target: LogTarget::File(path.into()),
            level: level.parse()?,
        },
    )
}

/// Builds a console logger when `verbose` is set, otherwise a file logger.
pub fn verbosity_logger(
    name: &str,
    verbose: bool,
    file: impl Into<PathBuf>,
    level: &str,
) -> Result<Logger> {
    build_logger(
        name,
        &LogConfig {
            target: LogTarget::ByVerbosity {
                verbose,
                file: file.into(),
            },
            level: level.parse()?,
        },
    )
}

/// Named loggers shared across a program.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the logger registered under `name`, building and registering
    /// one from `config` if there is none. An existing logger is returned
    /// unchanged even if `config` differs.
    pub fn get_or_create(&self, name: &str, config: &LogConfig) -> Result<Arc<Logger>> {
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = loggers.get(name) {
            return Ok(Arc::clone(logger));
        }
        let logger = Arc::new(build_logger(name, config)?);
        loggers.insert(name.to_string(), Arc::clone(&logger));
        Ok(logger)
    }

    /// Returns the logger registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registers `logger` under its own name, replacing any previous one.
    pub fn insert(&self, logger: Logger) -> Arc<Logger> {
        let logger = Arc::new(logger);
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(logger.name().to_string(), Arc::clone(&logger));
        logger
    }

    /// Removes and returns the logger registered under `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Returns the number of registered loggers.
    pub fn len(&self) -> usize {
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no loggers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Captures the process's standard output and re-emits it through a logger.
///
/// While the guard is alive, everything written to file descriptor 1 is
/// held in a temporary file. That covers `print!`, direct `io::stdout()`
/// writes and child processes that inherit stdout. When the guard is
/// finished or dropped, stdout is flushed, the original stream is restored
/// and each captured line is logged at the chosen level. Lines that are
/// blank after trimming trailing whitespace are skipped.
///
/// Only one capture can be active in a process at a time.
pub struct StdoutRedirect<'a> {
    logger: &'a Logger,
    level: LogLevel,
    capture: Option<BufferRedirect>,
}

impl<'a> StdoutRedirect<'a> {
    /// Starts capturing stdout for `logger` at `level`.
    ///
    /// Fails with [`Error::StdoutCapture`] if stdout is already captured or
    /// cannot be redirected.
    pub fn start(logger: &'a Logger, level: LogLevel) -> Result<Self> {
        io::stdout().flush().map_err(Error::StdoutCapture)?;
        let capture = BufferRedirect::stdout().map_err(Error::StdoutCapture)?;
        Ok(Self {
            logger,
            level,
            capture: Some(capture),
        })
    }

    /// Restores stdout and logs the captured output.
    pub fn finish(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let Some(mut capture) = self.capture.take() else {
            return Ok(());
        };
        let flushed = io::stdout().flush();
        let mut captured = Vec::new();
        let read = capture.read_to_end(&mut captured);
        // Restore fd 1 before logging so console loggers reach the terminal.
        drop(capture);

        for line in captured.split(|&b| b == b'\n') {
            self.emit(line);
        }
        flushed.map_err(Error::StdoutCapture)?;
        read.map_err(Error::StdoutCapture)?;
        Ok(())
    }

    fn emit(&self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let text = text.trim_end();
        if !text.is_empty() {
            self.logger.log(self.level, text);
        }
    }
}

impl Drop for StdoutRedirect<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(logger = %self.logger.name(), "Lost captured stdout: {e}");
        }
    }
}

/// Runs `body` with the process's stdout captured into `logger` at `level`.
///
/// Stdout is restored when `body` returns or unwinds; output written before
/// a panic is still logged.
pub fn redirect_stdout<R>(
    logger: &Logger,
    level: LogLevel,
    body: impl FnOnce() -> R,
) -> Result<R> {
    let redirect = StdoutRedirect::start(logger, level)?;
    let value = body();
    redirect.finish()?;
    Ok(value)
}
