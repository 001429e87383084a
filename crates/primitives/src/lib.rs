#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod key;
pub use key::{AssetClass, DtypeCode, ParseKeyError, SeriesKey, Uid};

mod range;
pub use range::DateRange;

mod series;
pub use series::{SeriesError, SeriesView, TimeSeries};

mod frequency;
pub use frequency::{
    BDAYS_IN_1M, BDAYS_IN_1Q, BDAYS_IN_1W, BDAYS_IN_1Y, DAYS_IN_1M, DAYS_IN_1Q, DAYS_IN_1W,
    DAYS_IN_1Y, Frequency, MONTHS_IN_1Q, MONTHS_IN_1Y, WEEKS_IN_1M, WEEKS_IN_1Q, WEEKS_IN_1Y,
};

mod datatype;
pub use datatype::DatatypeMap;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
