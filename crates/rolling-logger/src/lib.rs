//! Rolling Logger
//!
//! File logger for the app's log directory:
//! - writes formatted `tracing` events (and bridged `log` records) to `<app>.log`
//! - rolls the file over once it grows past a size limit, keeping a few old files
//! - keeps the most recent lines in a circular buffer for in-app display

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

/// Default size at which the active log file is rolled
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Default number of rolled files kept next to the active one
pub const DEFAULT_KEEP_FILES: usize = 3;
/// Default number of lines kept in memory
pub const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

struct Inner {
    dir: PathBuf,
    app_name: String,
    file: File,
    written: u64,
    max_file_bytes: u64,
    keep_files: usize,
    recent: VecDeque<String>,
    buffer_lines: usize,
    partial: String,
}

/// Size-rolled log file plus a ring of recent lines
///
/// Cloning is cheap; all clones share the same file and buffer.
#[derive(Clone)]
pub struct RollingLogger {
    inner: Arc<Mutex<Inner>>,
}

impl RollingLogger {
    /// Open (or create) `<dir>/<app_name>.log` with default limits
    pub fn open(dir: impl Into<PathBuf>, app_name: &str) -> io::Result<Self> {
        Self::with_limits(dir, app_name, DEFAULT_MAX_FILE_BYTES, DEFAULT_KEEP_FILES, DEFAULT_BUFFER_LINES)
    }

    pub fn with_limits(
        dir: impl Into<PathBuf>,
        app_name: &str,
        max_file_bytes: u64,
        keep_files: usize,
        buffer_lines: usize,
    ) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let path = active_path(&dir, app_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                dir,
                app_name: app_name.to_string(),
                file,
                written,
                max_file_bytes: max_file_bytes.max(1),
                keep_files,
                recent: VecDeque::with_capacity(buffer_lines),
                buffer_lines,
                partial: String::new(),
            })),
        })
    }

    /// Path of the file currently written to
    pub fn log_path(&self) -> PathBuf {
        let inner = self.lock();
        active_path(&inner.dir, &inner.app_name)
    }

    /// Most recent complete lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        self.lock().recent.iter().cloned().collect()
    }

    /// Rolled files currently on disk, oldest first
    pub fn rolled_files(&self) -> io::Result<Vec<PathBuf>> {
        let inner = self.lock();
        rolled_files(&inner.dir, &inner.app_name)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock only loses log lines
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_file_bytes {
            self.roll()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.buffer_lines == 0 {
            return;
        }
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.recent.len() == self.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let rolled = self.unused_rolled_path(&stamp);
        fs::rename(active_path(&self.dir, &self.app_name), &rolled)?;

        let old = rolled_files(&self.dir, &self.app_name)?;
        if old.len() > self.keep_files {
            for path in &old[..old.len() - self.keep_files] {
                fs::remove_file(path)?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(active_path(&self.dir, &self.app_name))?;
        self.written = 0;
        Ok(())
    }

    /// `<app>.<stamp>-<n>.log` with the first counter not already on disk
    fn unused_rolled_path(&self, stamp: &str) -> PathBuf {
        let mut counter = 0u32;
        loop {
            let path = self
                .dir
                .join(format!("{}.{}-{:03}.log", self.app_name, stamp, counter));
            if !path.exists() {
                return path;
            }
            counter += 1;
        }
    }
}

fn active_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{}.log", app_name))
}

fn rolled_files(dir: &Path, app_name: &str) -> io::Result<Vec<PathBuf>> {
    let active = format!("{}.log", app_name);
    let prefix = format!("{}.", app_name);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name != active && name.starts_with(&prefix) && name.ends_with(".log") {
            files.push(path);
        }
    }
    // Timestamp then counter, so names sort chronologically
    files.sort();
    Ok(files)
}

/// Writer handed out to the fmt subscriber for each event
pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingLogger {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Install the global subscriber writing to `<log_dir>/<app_name>.log`
///
/// Records emitted through the `log` facade are forwarded to the same file,
/// except on Android where they go to logcat.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    let logger = RollingLogger::open(log_dir, app_name).map_err(|e| e.to_string())?;

    let builder = tracing_subscriber::fmt()
        .with_writer(logger.clone())
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::INFO);

    #[cfg(not(target_os = "android"))]
    builder.try_init().map_err(|e| e.to_string())?;

    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag(app_name.to_string()),
        );
        tracing::subscriber::set_global_default(builder.finish()).map_err(|e| e.to_string())?;
    }

    LOGGER
        .set(logger)
        .map_err(|_| "rolling logger already initialized".to_string())?;
    log::info!("{} logging to {}", app_name, logger_path().unwrap_or_default().display());
    Ok(())
}

/// Path of the active log file, if the logger was initialized
pub fn logger_path() -> Option<PathBuf> {
    LOGGER.get().map(RollingLogger::log_path)
}

/// Recent lines of the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err("rolling logger not initialized".to_string())
    }
}

pub fn info(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}
