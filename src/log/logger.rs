use crate::{
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError, TrySendError},
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Flush after this many lines even if the queue never goes idle.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 100;

#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 1_000;

/// Flush when nothing has arrived for this long.
const IDLE_FLUSH: Duration = Duration::from_millis(250);

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Bounded, non-blocking logger that writes to a per-process log file.
///
/// # Architecture
///
/// 1. **Producers**: relay threads log through cloned [`LoggerHandle`]s.
/// 2. **Queue**: a bounded `sync_channel` absorbs bursts; overflow is dropped.
/// 3. **Consumer**: a `logger-worker` thread appends to the file, flushing in
///    batches and whenever the queue goes idle.
/// 4. **Mirror**: warn/error lines are echoed to stderr (when `mirror_stderr`).
pub struct Logger {
    handle: LoggerHandle,
    _thread: Option<thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Starts the relay logger using the `[Logging]` section of `config`.
    ///
    /// Keys: `relay_log_path` (directory, `~` expanded), `relay_log_filename`
    /// (file prefix) and `queue_capacity`.
    #[must_use]
    pub fn start_relay(config: &Config) -> Self {
        let app_name = config
            .get_non_empty("Logging", "relay_log_filename")
            .unwrap_or("signaling_relay");
        let cap = config
            .get_parsed::<usize>("Logging", "queue_capacity")
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        match config.get_non_empty("Logging", "relay_log_path") {
            Some(dir) => Self::start_in_dir(expand_path(dir), Some(app_name), cap, true),
            None => Self::start_default(Some(app_name), cap),
        }
    }

    /// Creates a `logs/` directory next to the executable and logs there.
    ///
    /// Example file: `target/debug/logs/signaling_relay-20261018_093045-pid1234.log`
    #[must_use]
    pub fn start_default(app_name: Option<&str>, cap: usize) -> Self {
        let base = exe_dir_fallback_cwd().join("logs");
        Self::start_in_dir(base, app_name, cap, true)
    }

    /// Starts the logger in `dir`, creating it if missing.
    ///
    /// The worker never panics: if the target file cannot be opened it falls
    /// back to a file in the temp dir, then to `io::sink()`.
    pub fn start_in_dir<D: AsRef<Path>>(
        dir: D,
        app_name: Option<&str>,
        cap: usize,
        mirror_stderr: bool,
    ) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let ts = timestamp_for_filename();
        let pid = std::process::id();
        let fname = match app_name {
            Some(name) => format!("{name}-{ts}-pid{pid}.log"),
            None => format!("{ts}-pid{pid}.log"),
        };
        let file_path = dir.join(fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap.max(1));
        let handle = LoggerHandle { tx };

        let worker_path = file_path.clone();
        let _thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || run_worker(&worker_path, &rx, mirror_stderr))
            .ok();

        Self {
            handle,
            _thread,
            file_path,
        }
    }

    /// Enqueues a line without blocking; a full queue drops it.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), TrySendError<LogMsg>> {
        self.handle.try_log(level, text, target)
    }

    /// Cloneable sink for handing to the relay components.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn run_worker(path: &Path, rx: &mpsc::Receiver<LogMsg>, mirror_stderr: bool) {
    let writer: Box<dyn Write + Send> =
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Box::new(f),
            Err(_) => {
                let fallback = std::env::temp_dir().join("rtcrelay-fallback.log");
                match OpenOptions::new().create(true).append(true).open(&fallback) {
                    Ok(f) => Box::new(f),
                    Err(_) => Box::new(io::sink()),
                }
            }
        };
    let mut out = BufWriter::new(writer);
    let mut unflushed: u32 = 0;

    loop {
        match rx.recv_timeout(IDLE_FLUSH) {
            Ok(m) => {
                let line = m.render();
                let _ = writeln!(out, "{line}");
                if mirror_stderr && m.level >= LogLevel::Warn {
                    eprintln!("{line}");
                }
                unflushed += 1;
                if unflushed >= FLUSH_BATCH_SIZE {
                    let _ = out.flush();
                    unflushed = 0;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if unflushed > 0 {
                    let _ = out.flush();
                    unflushed = 0;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = out.flush();
}

fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// `YYYYMMDD_HHMMSS` in UTC, e.g. `20261018_093045`.
fn timestamp_for_filename() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    match civil_from_unix(secs) {
        Some(tm) => format!(
            "{:04}{:02}{:02}_{:02}{:02}{:02}",
            tm.year, tm.mon, tm.day, tm.hour, tm.min, tm.sec
        ),
        None => format!("unix_{secs}"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CivilTime {
    year: i32,
    mon: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
}

/// Days-from-civil inverse (proleptic Gregorian). `None` only if the year
/// overflows `i32`.
#[allow(clippy::many_single_char_names)]
fn civil_from_unix(secs: u64) -> Option<CivilTime> {
    let sec = (secs % 60) as u32;
    let min = ((secs / 60) % 60) as u32;
    let hour = ((secs / 3_600) % 24) as u32;
    let days = secs / 86_400;

    let z = i128::from(days) + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + i128::from(m <= 2);

    Some(CivilTime {
        year: i32::try_from(y).ok()?,
        mon: u32::try_from(m).ok()?,
        day: u32::try_from(d).ok()?,
        hour,
        min,
        sec,
    })
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = || {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from)
    };
    if path_str == "~" {
        if let Some(h) = home() {
            return h;
        }
    }
    if let Some(rest) = path_str
        .strip_prefix("~/")
        .or_else(|| path_str.strip_prefix("~\\"))
    {
        if let Some(mut h) = home() {
            h.push(rest);
            return h;
        }
    }
    PathBuf::from(path_str)
}
