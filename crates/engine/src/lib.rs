#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::EngineConfig;

mod context;
pub use context::SeriesContext;

mod error;
pub use error::EngineError;

/// Re-export commonly used types.
pub mod prelude {
    pub use tessera_traits::{CalendarSource, SeriesStore, SeriesWriter};

    pub use super::{EngineConfig, EngineError, SeriesContext};
}
