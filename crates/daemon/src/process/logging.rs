use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::ServiceConfig;

/// Daily-rolled file name prefix under `log_dir`
pub const LOG_FILE_PREFIX: &str = "gallery.log";

/// Flushes buffered log writers on drop. Hold it for the life of the process.
#[must_use]
pub struct LogGuard {
    _writers: Vec<WorkerGuard>,
}

/// Install the global subscriber: compact stdout, plus an uncoloured
/// file layer with span timings when `log_dir` is set. `RUST_LOG`
/// overrides the configured level.
pub fn init_logging(config: &ServiceConfig) -> LogGuard {
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(config.log_level.into())
            .from_env_lossy()
    };

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut writers = vec![stdout_guard];

    let file_layer = config
        .log_dir
        .as_deref()
        .and_then(file_writer)
        .map(|(writer, guard)| {
            writers.push(guard);
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(filter())
        });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_writer(stdout)
                .with_filter(filter()),
        )
        .with(file_layer)
        .init();

    install_panic_hook();
    log_build_info();

    LogGuard { _writers: writers }
}

fn file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "warning: cannot create log directory {}: {}; logging to stdout only",
            dir.display(),
            e
        );
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => tracing::error!(
            message = %panic,
            panic.file = loc.file(),
            panic.line = loc.line(),
            panic.column = loc.column(),
        ),
        None => tracing::error!(message = %panic),
    }));
}

fn log_build_info() {
    let build = common::prelude::build_info();
    tracing::info!(
        build_profile = %build.build_profile,
        version = %build.version,
        built_at = %build.build_timestamp,
        "gallery daemon starting"
    );
}
