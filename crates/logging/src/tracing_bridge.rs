//! crates/logging/src/tracing_bridge.rs
//! Installation of the process-wide tracing subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::config::VerbosityConfig;

/// Environment variable holding filter directives that override `-v`.
pub const LOG_ENV: &str = "FACL_LOG";

/// Builds the event filter for `config`.
///
/// `directives` uses the `EnvFilter` syntax (`debug`, `acl::io=trace`, ...).
/// When it is absent or empty the level from `config` applies; malformed
/// directives are skipped.
#[must_use]
pub fn build_filter(config: &VerbosityConfig, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.level.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Installs a registry with the verbosity filter and a stderr formatter.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one stays active.
pub fn init_tracing(config: &VerbosityConfig) -> bool {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(config, directives.as_deref());
    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_directive_follows_verbosity() {
        let filter = build_filter(&VerbosityConfig::from_verbose_level(2), None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = build_filter(&VerbosityConfig::from_verbose_level(0), Some(""));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn explicit_directives_override_verbosity() {
        let filter = build_filter(&VerbosityConfig::default(), Some("acl::io=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert!(filter.to_string().contains("acl::io"));
    }

    #[test]
    fn malformed_directives_fall_back_to_verbosity() {
        let filter = build_filter(&VerbosityConfig::from_verbose_level(1), Some("=~=~"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
