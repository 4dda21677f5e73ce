#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` turns the `-v` count of the command line into a tracing level and
//! installs the process-wide subscriber that renders events on stderr.
//!
//! # Design
//!
//! [`VerbosityConfig`] holds the level chosen from the flag count. The
//! [`init_tracing`] entry point combines it with the `FACL_LOG` environment
//! variable, which takes precedence when set, and installs a
//! `tracing_subscriber` registry with an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! and a formatting layer.
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, init_tracing};
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! init_tracing(&config);
//! tracing::debug!(target: "acl::io", "visible at -vv");
//! ```

mod config;
mod tracing_bridge;

pub use config::VerbosityConfig;
pub use tracing_bridge::{LOG_ENV, build_filter, init_tracing};
