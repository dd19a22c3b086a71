//! Tracing initialization: console and log file share the fmt layer's full format (level, target, span, fields).

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Installs the global tracing subscriber.
///
/// Output is written to stdout and, when `log_file_path` is given, appended to that file as well.
/// The filter comes from `RUST_LOG`; when unset, `default_level` is used (e.g. "info", "debug").
/// Load `.env` (dotenvy) before calling this, otherwise `RUST_LOG` from the file is ignored.
pub fn init_tracing(log_file_path: Option<&str>, default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
    let writer = match log_file_path {
        Some(path) => {
            if let Some(dir) = Path::new(path).parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(io::stdout.and(Arc::new(file)))
        }
        None => BoxMakeWriter::new(io::stdout),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
