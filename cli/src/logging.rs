//! Terminal log output.

use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// One line per event: a colored level marker, the target, then the fields.
pub struct CompactFormatter;

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let (marker, paint): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("TRACE", |s| s.dimmed()),
            Level::DEBUG => ("DEBUG", |s| s.blue()),
            Level::INFO => (" INFO", |s| s.green().bold()),
            Level::WARN => (" WARN", |s| s.yellow().bold()),
            Level::ERROR => ("ERROR", |s| s.red().bold()),
        };

        write!(
            writer,
            "{} {} ",
            paint(marker.into()),
            meta.target().dimmed()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to deckfill and
/// `warn` to everything else. Each `-v` raises the default by one level.
pub fn init(default_level: Level, verbose: u8) {
    const LEVELS: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];
    let start = LEVELS
        .iter()
        .position(|l| *l == default_level)
        .unwrap_or(2);
    let level = LEVELS[(start + verbose as usize).min(LEVELS.len() - 1)];

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,deckfill={level},tower_http={level}",
            level = level.as_str().to_lowercase()
        ))
    });

    // Ignore a second initialisation (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(CompactFormatter)
        .try_init();
}
