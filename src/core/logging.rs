//! Logging setup.
//!
//! All modes write JSON lines to a daily rolling file under the data
//! directory. The TUI owns the terminal, so only the `status` command adds a
//! human-readable stderr layer. `log` macros are bridged into `tracing`, and
//! rotated files from earlier days are gzip-compressed in the background.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use is_terminal::IsTerminal;
use supports_color::Stream;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "cliptui.log";

/// `<data_dir>/cliptui/logs`, or `./logs` when there is no data directory.
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("cliptui").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logging for TUI mode: file only.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_tui() -> WorkerGuard {
    init(false)
}

/// Logging for one-shot commands: file plus compact stderr output.
pub fn init_cli() -> WorkerGuard {
    init(true)
}

fn init(with_stderr: bool) -> WorkerGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter());

    let stderr_layer = with_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .compact()
            .with_ansi(io::stderr().is_terminal())
            .with_filter(env_filter())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // `init()` usually installs the bridge already.
    if let Err(e) = tracing_log::LogTracer::init() {
        log::debug!("LogTracer not installed: {e}");
    }

    init_miette();

    let dir = log_dir.clone();
    std::thread::spawn(move || {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        compress_old_logs(&dir, &today);
    });

    log::info!("Logging to {:?} (daily rolling)", log_dir.join(LOG_FILE));
    guard
}

/// Gzip every rotated log in `log_dir` that is not from `today`.
/// Returns how many files were compressed.
pub fn compress_old_logs(log_dir: &Path, today: &str) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };
    let prefix = format!("{LOG_FILE}.");
    let mut compressed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(&prefix) || name.ends_with(today) || name.ends_with(".gz") {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => {
                log::info!("Compressed old log: {:?}", path);
                compressed += 1;
            }
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
    compressed
}

fn compress_file(path: &Path) -> io::Result<()> {
    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path.with_file_name(gz_name);
    if gz_path.exists() {
        return Ok(());
    }

    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
}

fn init_miette() {
    let color = io::stderr().is_terminal() && supports_color::on(Stream::Stderr).is_some();
    let truecolor = supports_color::on(Stream::Stderr).is_some_and(|s| s.has_16m);

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(truecolor)
                .context_lines(2)
                .color(color)
                .build(),
        )
    }))
    .ok();
}
