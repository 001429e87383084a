#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod frame;
pub use frame::{date_column, matrix_frame, series_frame};

mod csv;
pub use csv::{read_series_csv, write_frame_csv};

mod error;
pub use error::UtilsError;
