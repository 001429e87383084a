#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod schema;

mod sqlite;
pub use sqlite::SqliteStore;

mod memory;
pub use memory::MemoryStore;
