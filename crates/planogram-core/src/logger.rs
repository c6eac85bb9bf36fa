//! Stderr backend for the `log` facade used by the CLI.
//!
//! One line per record: seconds since the logger was installed, the level,
//! the emitting crate (first path segment of the target) and the message.
//! Library code never installs a logger; it only calls the `log` macros.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target().split("::").next().unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Route `log` records up to `level` to stderr.
///
/// The first call wins: once installed, the level passed to later calls is
/// ignored. Fails only if a different logger was registered beforehand.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if INSTALLED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }
    let logger = Box::new(StderrLogger {
        level,
        started: Instant::now(),
    });
    if let Err(err) = log::set_boxed_logger(logger) {
        INSTALLED.store(false, Ordering::Release);
        return Err(err);
    }
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
