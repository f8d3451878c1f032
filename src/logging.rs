//! @acp:module "Logging"
//! @acp:summary "Process-wide tracing setup with a compact line format"
//! @acp:domain cli
//! @acp:layer config
//!
//! Lines look like `[I 01.01.1999 18:00] (cmdscan::discovery) message`:
//! first letter of the level, local time in minutes, target, message.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "CMDSCAN_LOG";

/// Timestamp format used in log lines
pub const TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// @acp:summary "Single-letter level, minute timestamp, target, message"
#[derive(Debug, Clone, Default)]
pub struct ShortLevelFormat;

impl<S, N> FormatEvent<S, N> for ShortLevelFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "[{} {}] ({}) ",
            level_letter(metadata.level()),
            chrono::Local::now().format(TIME_FORMAT),
            metadata.target()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_letter(level: &Level) -> char {
    match *level {
        Level::ERROR => 'E',
        Level::WARN => 'W',
        Level::INFO => 'I',
        Level::DEBUG => 'D',
        Level::TRACE => 'T',
    }
}

/// Install the stdout subscriber at `level`.
///
/// `CMDSCAN_LOG` takes precedence when set. A subscriber that is already
/// installed stays in place.
pub fn setup_logging(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ShortLevelFormat)
        .with_writer(std::io::stdout)
        .try_init();
}
