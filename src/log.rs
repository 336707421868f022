use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "TASKTIMER_LOG";

fn level_from(value: Option<&str>) -> Level {
    value
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

/// Logs go to stderr, stdout is reserved for protocol messages
pub fn init_tracing() {
    let level = level_from(std::env::var(LOG_ENV).ok().as_deref());

    Registry::default()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::from_level(level)),
        )
        .init()
}

#[cfg(test)]
mod test {
    use super::level_from;
    use tracing::Level;

    #[test]
    fn test_level_from() {
        assert_eq!(level_from(None), Level::INFO);
        assert_eq!(level_from(Some("debug")), Level::DEBUG);
        assert_eq!(level_from(Some("TRACE")), Level::TRACE);
        assert_eq!(level_from(Some("chatty")), Level::INFO);
    }
}
