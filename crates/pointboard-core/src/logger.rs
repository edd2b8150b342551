//! Stderr logger for the `pointboard` crates.
//!
//! Prints `[elapsed LEVEL component] message`, where `component` is the
//! pointboard crate the record came from (`core`, `detect`, `calib`, or
//! `tracker` for the top-level crate and binary). Records from the crate
//! family honour the requested level; everything else is held at `warn`
//! so dependency chatter stays out of a verbose run.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const CRATE_PREFIX: &str = "pointboard";
const FOREIGN_CAP: LevelFilter = LevelFilter::Warn;

/// Crate name of a log target (`pointboard_detect::analyzer` -> `pointboard_detect`).
fn crate_of(target: &str) -> &str {
    target.split("::").next().unwrap_or_default()
}

/// Short component label, or `None` for targets outside the crate family.
fn component(target: &str) -> Option<&str> {
    let name = crate_of(target).strip_prefix(CRATE_PREFIX)?;
    match name {
        "" => Some("tracker"),
        _ => name.strip_prefix('_'),
    }
}

/// Most verbose level let through for `target` when `requested` is asked for.
fn limit_for(target: &str, requested: LevelFilter) -> LevelFilter {
    match component(target) {
        Some(_) => requested,
        None => requested.min(FOREIGN_CAP),
    }
}

struct BoardLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for BoardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= limit_for(metadata.target(), self.level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target();
        let label = component(target).unwrap_or_else(|| crate_of(target));
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {:<7}] {}",
            elapsed,
            record.level(),
            label,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<BoardLogger> = OnceLock::new();

/// Install the stderr logger. `level` applies to the pointboard crates;
/// other crates are capped at `warn`.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| BoardLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber with the same crate split as
/// [`init_with_level`]. `RUST_LOG` overrides the default filter.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,pointboard=info,pointboard_core=info,pointboard_detect=info,pointboard_calib=info")
    });
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
