// Console and optional JSON file logging, plus span timing for `on_close = true` spans
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{Id, Subscriber, debug, field::Field, field::Visit, span};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Context, Layer, SubscriberExt},
    util::SubscriberInitExt,
};

// Keeps the file writer flushing until the process exits
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const CRATE_TARGET: &str = "cot_seasonality";
const DEFAULT_LEVEL: &str = "INFO";

/// Log levels and destinations, read from `CONSOLE_LOG_LEVEL`, `LOG_TO_FILE`,
/// `FILE_LOG_LEVEL` and `LOG_DIR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub console_level: String,
    /// `None` unless `LOG_TO_FILE` is set
    pub file_level: Option<String>,
    pub log_dir: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = |key: &str| lookup(key).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let log_to_file = lookup("LOG_TO_FILE")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        LogSettings {
            console_level: level("CONSOLE_LOG_LEVEL"),
            file_level: log_to_file.then(|| level("FILE_LOG_LEVEL")),
            log_dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

/// Install the global subscriber. `app_name` prefixes the log file name.
pub fn init_logging(app_name: String) -> eyre::Result<()> {
    let settings = LogSettings::from_env();

    let console_layer = fmt::layer().pretty().with_filter(build_filter(&settings.console_level));

    let file_layer = match &settings.file_level {
        Some(level) => Some(
            fmt::layer()
                .json()
                .with_writer(file_writer(&settings.log_dir, &app_name)?)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(build_filter(level)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(SpanTimingLayer)
        .try_init()?;

    debug!(?settings, "Logging initialised");
    Ok(())
}

/// One file per run: `<log_dir>/<app_name>_<local start time>.log`
fn file_writer(log_dir: &Path, app_name: &str) -> eyre::Result<NonBlocking> {
    fs::create_dir_all(log_dir)?;
    let file_name = format!("{app_name}_{}.log", chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, file_name));
    FILE_GUARD.set(guard).ok();
    Ok(writer)
}

/// Dependencies (sqlx etc.) at `warn`, this crate at `level`
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("warn,{CRATE_TARGET}={level}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("{CRATE_TARGET}=info")))
}

/// Reports busy and idle time of spans created with `on_close = true` when they close
struct SpanTimingLayer;

struct SpanTiming {
    opened: Instant,
    last_transition: Instant,
    busy: Duration,
    idle: Duration,
}

#[derive(Default)]
struct OnCloseVisitor {
    on_close: bool,
}

impl Visit for OnCloseVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "on_close" {
            self.on_close = value;
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S> Layer<S> for SpanTimingLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = OnCloseVisitor::default();
        attrs.record(&mut visitor);
        if !visitor.on_close {
            return;
        }
        if let Some(span) = ctx.span(id) {
            let now = Instant::now();
            span.extensions_mut().insert(SpanTiming {
                opened: now,
                last_transition: now,
                busy: Duration::ZERO,
                idle: Duration::ZERO,
            });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(timing) = span.extensions_mut().get_mut::<SpanTiming>() {
                timing.idle += timing.last_transition.elapsed();
                timing.last_transition = Instant::now();
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(timing) = span.extensions_mut().get_mut::<SpanTiming>() {
                timing.busy += timing.last_transition.elapsed();
                timing.last_transition = Instant::now();
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            if let Some(timing) = span.extensions_mut().remove::<SpanTiming>() {
                debug!(
                    span = span.name(),
                    busy_time = ?timing.busy,
                    idle_time = ?timing.idle,
                    total_time = ?timing.opened.elapsed(),
                    "span closed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> LogSettings {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn console_only_by_default() {
        let settings = settings_from(&[]);
        assert_eq!(settings.console_level, "INFO");
        assert_eq!(settings.file_level, None);
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn file_level_applies_only_when_file_logging_is_on() {
        let off = settings_from(&[("FILE_LOG_LEVEL", "TRACE")]);
        assert_eq!(off.file_level, None);

        let on = settings_from(&[("LOG_TO_FILE", "True"), ("FILE_LOG_LEVEL", "TRACE"), ("CONSOLE_LOG_LEVEL", "WARN")]);
        assert_eq!(on.file_level.as_deref(), Some("TRACE"));
        assert_eq!(on.console_level, "WARN");

        let default_level = settings_from(&[("LOG_TO_FILE", "1")]);
        assert_eq!(default_level.file_level.as_deref(), Some("INFO"));
    }

    #[test]
    fn file_writer_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        file_writer(&log_dir, "cot_seasonality").unwrap();
        assert!(log_dir.is_dir());
    }

    #[test]
    fn falls_back_to_info_on_bad_level() {
        let filter = build_filter("not a level!!");
        assert!(filter.to_string().contains(CRATE_TARGET));
    }

    #[test]
    fn timing_layer_tolerates_untracked_spans() {
        let subscriber = tracing_subscriber::registry().with(SpanTimingLayer);
        tracing::subscriber::with_default(subscriber, || {
            let tracked = tracing::info_span!("tracked", on_close = true);
            tracked.in_scope(|| {
                let untracked = tracing::info_span!("untracked");
                let _guard = untracked.enter();
            });
        });
    }
}
