//! Structured logging for the client and CLI.
//!
//! Goes to `$XDG_STATE_HOME/linkup/linkup.log` when possible; the CLI falls
//! back to stderr otherwise. `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,linkup=debug,linkup_core=debug";
const LOG_FILE: &str = "linkup.log";

/// Per-event writer: a handle on the shared log file, or stderr when the
/// handle could not be duplicated.
enum LogSink {
    File(File),
    Stderr,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct AppendLog(File);

impl<'a> MakeWriter<'a> for AppendLog {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Where `init_logging` writes.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("linkup")?;
    Ok(xdg_dirs.get_state_home().join(LOG_FILE))
}

/// Open (creating parents) a log file for appending.
fn open_log(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log dir {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// Log to the XDG state file. Errors (unwritable dir, subscriber already set)
/// are returned so the caller can fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    init_logging_at(&log_file_path()?)
}

/// Like `init_logging` but to an explicit file.
pub fn init_logging_at(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(AppendLog(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;
    tracing::info!("linkup logging to {}", path.display());
    Ok(())
}

/// Log to stderr only. Silently keeps an already-installed subscriber.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_path_is_under_linkup_state_dir() {
        let path = log_file_path().unwrap();
        assert_eq!(path.file_name().unwrap(), LOG_FILE);
        assert!(path.parent().unwrap().ends_with("linkup"));
    }

    #[test]
    fn sink_appends_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(LOG_FILE);
        let log = AppendLog(open_log(&path).unwrap());
        log.make_writer().write_all(b"first\n").unwrap();
        log.make_writer().write_all(b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
