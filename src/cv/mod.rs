//! Cross-validation splitting strategies for time series.
//!
//! Two splitters are provided:
//!
//! - [`GroupedOrdinalSplitter`]: expanding-window splits over *groups* of
//!   samples (for example every row sharing one timestamp). A group is
//!   always entirely in train or entirely in test, and test windows advance
//!   through the sorted distinct labels.
//! - [`time_series_split`]: the sample-level expanding window, replacing
//!   `sklearn.model_selection.TimeSeriesSplit`.
//!
//! When every sample carries its own strictly increasing label both
//! produce identical splits.
//!
//! # References
//!
//! - scikit-learn source: `sklearn/model_selection/_split.py`
//!   <https://github.com/scikit-learn/scikit-learn/blob/main/sklearn/model_selection/_split.py>

mod group;

pub use group::{DEFAULT_N_SPLITS, GroupSplits, GroupedOrdinalSplitter, OrdinalEncoding};

/// One train/test partition produced by a splitter.
///
/// Indices are ascending and refer to rows of the input collection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Split {
    /// First position belonging to the test window. For grouped splits this
    /// is a group ordinal; for [`time_series_split`] it is a sample index.
    pub threshold: usize,
    /// Training indices.
    pub train: Vec<usize>,
    /// Test indices.
    pub test: Vec<usize>,
}

impl Split {
    /// Consume the split into a `(train, test)` tuple.
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.train, self.test)
    }
}

impl From<Split> for (Vec<usize>, Vec<usize>) {
    fn from(split: Split) -> Self {
        split.into_parts()
    }
}

/// Anything whose number of rows is known.
///
/// Splitters only look at the length of the data they are asked to split;
/// the contents are never inspected.
pub trait NumSamples {
    /// Number of samples (rows).
    fn n_samples(&self) -> usize;
}

impl<T> NumSamples for [T] {
    fn n_samples(&self) -> usize {
        self.len()
    }
}

impl<T> NumSamples for Vec<T> {
    fn n_samples(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> NumSamples for [T; N] {
    fn n_samples(&self) -> usize {
        N
    }
}

/// A bare row count.
impl NumSamples for usize {
    fn n_samples(&self) -> usize {
        *self
    }
}

impl<S: NumSamples + ?Sized> NumSamples for &S {
    fn n_samples(&self) -> usize {
        (**self).n_samples()
    }
}

/// Map an `f64` to an `i64` whose integer order matches [`f64::total_cmp`].
///
/// Float labels are not `Ord`; keying them this way lets them be grouped
/// by [`GroupedOrdinalSplitter`]. `-0.0` and `0.0` get distinct keys, and
/// NaN sorts after positive infinity.
pub fn total_order_key(x: f64) -> i64 {
    let bits = x.to_bits() as i64;
    bits ^ ((((bits >> 63) as u64) >> 1) as i64)
}

/// Expanding-window time series cross-validation splits.
///
/// Matches sklearn's `TimeSeriesSplit` behavior:
/// - `test_size = n_samples / (n_splits + 1)` (integer floor division).
/// - Each fold expands the training window by `test_size`.
/// - The division remainder is absorbed by the first training window.
///
/// Returns an empty vector when `n_splits < 2`, `n_samples < 2`, or the
/// test size rounds down to zero.
///
/// # Example
///
/// ```
/// use groupfold::cv::time_series_split;
///
/// let splits = time_series_split(10, 3);
/// assert_eq!(splits.len(), 3);
///
/// // Fold 0: train=[0..4], test=[4,5]
/// // Fold 1: train=[0..6], test=[6,7]
/// // Fold 2: train=[0..8], test=[8,9]
/// assert_eq!(splits[0].train, vec![0, 1, 2, 3]);
/// assert_eq!(splits[0].test, vec![4, 5]);
/// ```
pub fn time_series_split(n_samples: usize, n_splits: usize) -> Vec<Split> {
    if n_splits < 2 || n_samples < 2 {
        return vec![];
    }

    let test_size = n_samples / (n_splits + 1);
    if test_size == 0 {
        return vec![];
    }

    // test_starts = range(n - n_splits*test_size, n, test_size)
    let first_test_start = n_samples - n_splits * test_size;

    (first_test_start..n_samples)
        .step_by(test_size)
        .map(|test_start| Split {
            threshold: test_start,
            train: (0..test_start).collect(),
            test: (test_start..test_start + test_size).collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
