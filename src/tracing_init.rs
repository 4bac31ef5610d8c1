//! Tracing initialization: console plus a daily log file.
//!
//! Console output honors `RUST_LOG`, falling back to the configured level.
//! The file layer always records DEBUG and rolls over at local midnight:
//! `{log_dir}/warden_{YYYY_MM_DD}.log`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::constants::LOG_FILE_PREFIX;

/// Append-mode log file that reopens under a new name when the date changes.
pub struct DailyFile {
    dir: PathBuf,
    prefix: String,
    date: NaiveDate,
    file: File,
}

impl DailyFile {
    pub fn open(dir: &Path, prefix: &str) -> io::Result<Self> {
        let date = today();
        std::fs::create_dir_all(dir)?;
        let file = open_append(&Self::path_for(dir, prefix, date))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            date,
            file,
        })
    }

    pub fn path_for(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
        dir.join(format!("{}_{}.log", prefix, date.format("%Y_%m_%d")))
    }

    pub fn current_path(&self) -> PathBuf {
        Self::path_for(&self.dir, &self.prefix, self.date)
    }

    fn roll_to(&mut self, date: NaiveDate) -> io::Result<()> {
        if date == self.date {
            return Ok(());
        }
        self.file.flush()?;
        self.file = open_append(&Self::path_for(&self.dir, &self.prefix, date))?;
        self.date = date;
        Ok(())
    }
}

impl Write for DailyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.roll_to(today())?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn open_append(path: &Path) -> io::Result<File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Call once, before anything logs.
///
/// If the log directory cannot be opened the daemon still runs with
/// console output only.
pub fn init_tracing(log_dir: &Path, console_level: &str) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_target(false).with_filter(console_filter);

    let file_layer = match DailyFile::open(log_dir, LOG_FILE_PREFIX) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,ureq=warn,ureq_proto=warn,rustls=warn")),
        ),
        Err(e) => {
            eprintln!("[comment-warden] Cannot open log dir {}: {}", log_dir.display(), e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
