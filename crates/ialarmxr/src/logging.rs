use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events follow `--log-level`; everything else is capped at warn.
const PANEL_TARGETS: [&str; 5] = [
    "ialarmxr",
    "ialarmxr_session",
    "ialarmxr_frame",
    "ialarmxr_message",
    "ialarmxr_transport",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    /// Includes per-frame events.
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn filter(level: LogLevel) -> Targets {
    let level = LevelFilter::from(level);
    PANEL_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(*target, level)
        })
        .with_default(level.min(LevelFilter::WARN))
}

/// Install the stderr subscriber. Stdout stays reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let registry = tracing_subscriber::registry().with(filter(level));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = match format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn panel_crates_follow_requested_level() {
        let targets = filter(LogLevel::Debug);
        assert!(targets.would_enable("ialarmxr_session::session", &Level::DEBUG));
        assert!(!targets.would_enable("ialarmxr_frame::writer", &Level::TRACE));
    }

    #[test]
    fn other_crates_stay_at_warn() {
        let targets = filter(LogLevel::Trace);
        assert!(targets.would_enable("mio::poll", &Level::WARN));
        assert!(!targets.would_enable("mio::poll", &Level::INFO));
    }

    #[test]
    fn off_silences_everything() {
        let targets = filter(LogLevel::Off);
        assert!(!targets.would_enable("ialarmxr", &Level::ERROR));
        assert!(!targets.would_enable("other", &Level::ERROR));
    }
}
