//! Integration tests for the mapping from `-v` counts to rendered levels.

use logging::{VerbosityConfig, build_filter, init_tracing};
use tracing::Level;
use tracing::level_filters::LevelFilter;

#[test]
fn each_flag_adds_one_level() {
    let expected = [
        (0, LevelFilter::WARN),
        (1, LevelFilter::INFO),
        (2, LevelFilter::DEBUG),
        (3, LevelFilter::TRACE),
        (4, LevelFilter::TRACE),
    ];
    for (count, level) in expected {
        assert_eq!(
            VerbosityConfig::from_verbose_level(count).level,
            level,
            "-v x{count}"
        );
    }
}

#[test]
fn debug_events_need_two_flags() {
    assert!(!VerbosityConfig::from_verbose_level(1).enables(Level::DEBUG));
    assert!(VerbosityConfig::from_verbose_level(2).enables(Level::DEBUG));
    assert!(!VerbosityConfig::from_verbose_level(2).enables(Level::TRACE));
}

#[test]
fn filter_and_config_agree() {
    for count in 0..4 {
        let config = VerbosityConfig::from_verbose_level(count);
        assert_eq!(build_filter(&config, None).max_level_hint(), Some(config.level));
    }
}

#[test]
fn repeated_initialisation_is_tolerated() {
    let config = VerbosityConfig::from_verbose_level(1);
    init_tracing(&config);
    assert!(!init_tracing(&config), "a second subscriber is refused");
    tracing::info!(target: "acl::io", "still usable after a second init");
}
