//! Rolling Logger
//!
//! Installs a `tracing` subscriber (which also receives `log` records) that
//! writes either to stderr or to `<dir>/<app>.log`. The file rotates to
//! `<app>.1.log .. <app>.N.log` once it grows past `max_bytes`; the oldest
//! file is dropped, so disk usage stays bounded.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Logger errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to prepare log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a global logger is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Size after which the active file is rotated
    pub max_bytes: u64,
    /// Number of rotated files kept next to the active one
    pub max_files: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_files: 3,
        }
    }
}

/// Initialize logging; `None` logs to stderr
pub fn init_logger_with(
    log_dir: Option<PathBuf>,
    app_name: &str,
    config: &LoggerConfig,
) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let installed = match log_dir {
        Some(dir) => {
            let file = RollingFile::open(&dir, app_name, config.max_bytes, config.max_files)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };
    installed.map_err(|e| LoggerError::AlreadyInstalled(e.to_string()))?;

    tracing::info!(app = app_name, "logger initialized");
    Ok(())
}

/// Size-bounded log file with circular rotation
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir).map_err(|source| LoggerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = active_path(dir, app_name);
        let file = open_append(&path).map_err(|source| LoggerError::Io {
            path: path.clone(),
            source,
        })?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    /// Path of the file currently written to
    pub fn path(&self) -> PathBuf {
        active_path(&self.dir, &self.app_name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(self.path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = rotated_path(&self.dir, &self.app_name, self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = rotated_path(&self.dir, &self.app_name, index);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.dir, &self.app_name, index + 1))?;
            }
        }
        fs::rename(self.path(), rotated_path(&self.dir, &self.app_name, 1))?;

        self.file = open_append(&self.path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn active_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{}.log", app_name))
}

fn rotated_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    dir.join(format!("{}.{}.log", app_name, index))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
