//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fmt::{self, Write as _};
use std::fs;
use std::io::{IsTerminal as _, Write as _};
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::types::Mark;
use super::utils::{format_utc_datetime, format_utc_time, log_file_path};

/// Target for stage headers.
pub(super) const STAGE_TARGET: &str = "away::stage";
/// Target for dry-run description lines.
pub(super) const DRY_RUN_TARGET: &str = "away::dry_run";

/// Environment variable that overrides the console filter, in
/// `tracing_subscriber::EnvFilter` syntax.
pub const LOG_ENV: &str = "AWAY_LOG";

/// The fields away puts on its events.
#[derive(Default)]
struct Fields {
    message: String,
    mark: Option<Mark>,
}

impl Fields {
    fn of(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "mark" => self.mark = Mark::from_label(value),
            _ => {}
        }
    }
}

/// Plain-text rendering of one event, shared by the file layer and tests.
fn plain_line(level: Level, target: &str, fields: &Fields) -> String {
    let msg = &fields.message;
    if let Some(mark) = fields.mark {
        return format!("    {} {msg}", mark.symbol());
    }
    match (level, target) {
        (Level::INFO, STAGE_TARGET) => format!("==> {msg}"),
        (Level::INFO, DRY_RUN_TARGET) => format!("    [dry run] {msg}"),
        (Level::ERROR, _) => format!("    [error] {msg}"),
        (Level::WARN, _) => format!("    [warn] {msg}"),
        (Level::DEBUG | Level::TRACE, _) => format!("    [debug] {msg}"),
        _ => format!("    {msg}"),
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run's log
/// file, timestamped and without colour.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command`, write a run header, and return a
    /// layer that appends to it.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let header = format!(
            "# away {} started {} UTC\n",
            crate::cli::version(),
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let line = plain_line(*metadata.level(), metadata.target(), &Fields::of(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", format_utc_time()).ok();
        }
    }
}

/// Console [`FormatEvent`] for away's output.
///
/// With `ansi` off the output is exactly the plain text written to the log
/// file, minus the timestamp.
#[derive(Debug, Clone, Copy)]
struct AwayFormatter {
    ansi: bool,
}

impl AwayFormatter {
    fn paint(self, out: &mut String, sgr: &str, text: &str) {
        if self.ansi {
            let _ = write!(out, "\x1b[{sgr}m{text}\x1b[0m");
        } else {
            out.push_str(text);
        }
    }

    fn render(self, level: Level, target: &str, fields: &Fields) -> String {
        if !self.ansi {
            return plain_line(level, target, fields);
        }
        let msg = &fields.message;
        let mut out = String::new();
        if let Some(mark) = fields.mark {
            out.push_str("    ");
            self.paint(&mut out, mark.color(), &mark.symbol().to_string());
            out.push(' ');
            out.push_str(msg);
            return out;
        }
        match level {
            Level::ERROR => {
                self.paint(&mut out, "31", "error:");
                let _ = write!(out, " {msg}");
            }
            Level::WARN => {
                self.paint(&mut out, "33", "warning:");
                let _ = write!(out, " {msg}");
            }
            Level::INFO if target == STAGE_TARGET => {
                self.paint(&mut out, "1;34", "==>");
                out.push(' ');
                self.paint(&mut out, "1", msg);
            }
            Level::INFO if target == DRY_RUN_TARGET => {
                out.push_str("    ");
                self.paint(&mut out, "33", "[dry run]");
                let _ = write!(out, " {msg}");
            }
            Level::INFO => {
                let _ = write!(out, "    {msg}");
            }
            _ => {
                out.push_str("    ");
                self.paint(&mut out, "2", msg);
            }
        }
        out
    }
}

impl<S, N> FormatEvent<S, N> for AwayFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let line = self.render(*metadata.level(), metadata.target(), &Fields::of(event));
        writeln!(writer, "{line}")
    }
}

/// Whether console output should carry colour: stdout is a terminal and
/// `NO_COLOR` is unset or empty.
fn use_color() -> bool {
    std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none_or(|value| value.is_empty())
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console shows `info` and above (`debug` with `verbose`), unless
/// [`LOG_ENV`] holds a filter directive. Warnings and errors go to stderr,
/// everything else to stdout. Independently, every event at `debug` and
/// above is appended to `$XDG_CACHE_HOME/away/<command>.log`.
///
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(AwayFormatter { ansi: use_color() })
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
