use std::fmt;

pub const IFIT_LOG_PREFIX: &str = "IFIT";

/// Constant for the environment variable selecting the log verbosity
pub const ENV_LOG_LEVEL: &str = "IFIT_LOG_LEVEL";

/// Log verbosity steps recognized by the crate.
///
/// Discriminants double as indices into [LEVELS], so the numeric form, the
/// environment-variable spelling, and the `log` facade filter always agree.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LogLevel {
    #[default]
    Off = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// One row per verbosity step; every conversion reads this table.
const LEVELS: [(LogLevel, &str, log::LevelFilter); 6] = [
    (LogLevel::Off, "off", log::LevelFilter::Off),
    (LogLevel::Error, "error", log::LevelFilter::Error),
    (LogLevel::Warn, "warn", log::LevelFilter::Warn),
    (LogLevel::Info, "info", log::LevelFilter::Info),
    (LogLevel::Debug, "debug", log::LevelFilter::Debug),
    (LogLevel::Trace, "trace", log::LevelFilter::Trace),
];

impl From<u32> for LogLevel {
    fn from(level: u32) -> Self {
        LEVELS
            .get(level as usize)
            .map(|row| row.0)
            .unwrap_or_default()
    }
}

impl From<&str> for LogLevel {
    fn from(level: &str) -> Self {
        let level = level.trim().to_lowercase();
        LEVELS
            .iter()
            .find(|row| row.1 == level)
            .map(|row| row.0)
            .unwrap_or_default()
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        LEVELS[level as usize].2
    }
}

impl From<LogLevel> for &'static str {
    fn from(level: LogLevel) -> Self {
        LEVELS[level as usize].1
    }
}

impl From<&LogLevel> for &'static str {
    fn from(level: &LogLevel) -> Self {
        (*level).into()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

/// Gets the log level selected by the environment, [LogLevel::Off] when unset
/// or unrecognized.
pub fn env_log_level() -> LogLevel {
    std::env::var(ENV_LOG_LEVEL)
        .map(|level| LogLevel::from(level.as_str()))
        .unwrap_or(LogLevel::Off)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_is_aligned() {
        for (i, row) in LEVELS.iter().enumerate() {
            assert_eq!(row.0 as usize, i, "discriminant of {} drifted", row.1);
            assert_eq!(LogLevel::from(i as u32), row.0);
            assert_eq!(LogLevel::from(row.1), row.0);
            assert_eq!(log::LevelFilter::from(row.0), row.2);
            assert_eq!(<&'static str>::from(row.0), row.1);
        }
    }

    #[test]
    fn test_spelling_variants() {
        assert_eq!(LogLevel::from("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from(" debug "), LogLevel::Debug);
        assert_eq!(LogLevel::from("Trace"), LogLevel::Trace);
    }

    #[test]
    fn test_unknown_levels_fall_back_to_off() {
        assert_eq!(LogLevel::from(42u32), LogLevel::Off);
        assert_eq!(LogLevel::from("loud"), LogLevel::Off);
        assert_eq!(LogLevel::from(""), LogLevel::Off);
    }
}
