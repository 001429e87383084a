#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod slice;
pub use slice::{mask_trim_pos, search_trim_pos, trim_rows, trim_ts, trim_view};

mod valid;
pub use valid::{
    ScanPolicy, ValidPoint, last_valid_index, last_valid_index_from, last_valid_index_with,
    last_valid_value, next_valid_index, next_valid_value,
};

mod rolling;
pub use rolling::{
    Rolling, RollingOptions, SumMethod, rolling_mean, rolling_mean_with, rolling_sum,
    rolling_sum_with,
};

mod resample;
pub use resample::{Aggregation, MissingPolicy, resample};

mod covariance;
pub use covariance::{Covariance, correlation, covariance, drop_incomplete_rows};

mod align;
pub use align::{align_columns, align_to_grid};

mod fill;
pub use fill::{dropna, ffill, fillna};

mod returns;
pub use returns::{log_returns, simple_returns, total_return};

mod beta;
pub use beta::{BetaResult, RollingBeta, beta, rolling_beta};

mod error;
pub use error::MathError;
