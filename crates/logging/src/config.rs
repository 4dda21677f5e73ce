//! crates/logging/src/config.rs
//! Verbosity configuration derived from the `-v` flag count.

use tracing::level_filters::LevelFilter;

/// Log level selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerbosityConfig {
    /// Number of `-v` flags that produced this configuration.
    pub verbose: u8,
    /// Most verbose level that is rendered.
    pub level: LevelFilter,
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self::from_verbose_level(0)
    }
}

impl VerbosityConfig {
    /// Maps a `-v` count to a level: none shows warnings, `-v` adds info,
    /// `-vv` adds debug, and anything beyond traces.
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        let filter = match level {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            verbose: level,
            level: filter,
        }
    }

    /// Returns `true` when events at `level` are rendered.
    #[must_use]
    pub fn enables(&self, level: tracing::Level) -> bool {
        self.level >= level
    }
}
