//! # groupfold
//!
//! Deterministic, group-aware cross-validation splits for time-ordered data.
//!
//! ## Features
//!
//! - **Group integrity**: every sample of a group lands entirely in train or
//!   entirely in test
//! - **Chronological order**: train always precedes test, and test windows
//!   advance strictly from split to split
//! - **Any label type**: timestamps, batch ids, strings; anything `Ord + Hash`
//! - **Lazy**: splits are produced one at a time by an exact-size iterator
//! - **Dtype downcasting**: narrow numeric columns of a [`Frame`] before fitting
//!
//! ## Quick Start
//!
//! ```
//! use groupfold::GroupedOrdinalSplitter;
//!
//! // Three samples per trading day, four days.
//! let days = ["2024-01-02", "2024-01-02", "2024-01-02",
//!             "2024-01-03", "2024-01-03", "2024-01-03",
//!             "2024-01-04", "2024-01-04", "2024-01-04",
//!             "2024-01-05", "2024-01-05", "2024-01-05"];
//!
//! let splitter = GroupedOrdinalSplitter::new(3).unwrap();
//! for split in splitter.split(&days, Some(&days[..])).unwrap() {
//!     // train days are always strictly before the test day
//!     let last_train = split.train.iter().map(|&i| days[i]).max().unwrap();
//!     let first_test = split.test.iter().map(|&i| days[i]).min().unwrap();
//!     assert!(last_train < first_test);
//! }
//! ```
//!
//! ## Fold Geometry
//!
//! With `g` distinct labels and `n_splits = k`:
//!
//! | Quantity | Value |
//! |----------|-------|
//! | folds | `k + 1` |
//! | test window (groups) | `g / (k + 1)` |
//! | first threshold | `window + g % (k + 1)` |
//! | thresholds | `first, first + window, ...` while `< g` |
//!
//! ```
//! use groupfold::{ConfigurationError, GroupedOrdinalSplitter};
//!
//! // n_splits must be at least 2
//! assert!(GroupedOrdinalSplitter::new(1).is_err());
//!
//! // group labels are mandatory
//! let splitter = GroupedOrdinalSplitter::new(3).unwrap();
//! let err = splitter.split(&[1.0, 2.0], None::<&[u32]>).unwrap_err();
//! assert_eq!(err, ConfigurationError::MissingGroups);
//! ```

pub mod cv;
mod error;
pub mod frame;

// Re-export public API
pub use cv::{
    GroupSplits, GroupedOrdinalSplitter, NumSamples, OrdinalEncoding, Split, time_series_split,
    total_order_key,
};
pub use error::{ConfigurationError, FrameError};
pub use frame::{BitWidth, Column, ColumnData, Dtype, Frame, downcast_dtypes};
