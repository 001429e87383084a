#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod business;
pub use business::{business_days, is_business_day, shift_business_days};

mod calendar;
pub use calendar::{Calendar, CalendarConfig};

mod horizon;
pub use horizon::Horizon;

mod error;
pub use error::CalendarError;
