//! Group-aware expanding-window splits.

use std::hash::Hash;
use std::iter::{FusedIterator, StepBy};
use std::ops::Range;
use std::str::FromStr;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::{NumSamples, Split};
use crate::error::ConfigurationError;

/// Split count used by [`GroupedOrdinalSplitter::default`].
pub const DEFAULT_N_SPLITS: usize = 5;

/// Time series cross-validator that keeps groups intact.
///
/// Every distinct group label is ranked in ascending order to obtain its
/// *ordinal*. The ordinal range is cut into `n_splits + 1` folds of
/// `n_groups / (n_splits + 1)` groups each; the remainder goes to the first
/// training window. Each split trains on all groups below a threshold `T`
/// and tests on the next window of groups, with `T` strictly increasing.
///
/// The splitter only stores its configuration, so it is `Copy` and may be
/// shared freely across threads.
///
/// # Example
///
/// ```
/// use groupfold::GroupedOrdinalSplitter;
///
/// let groups = [0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3];
/// let splitter = GroupedOrdinalSplitter::new(3).unwrap();
///
/// let splits: Vec<_> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();
/// assert_eq!(splits.len(), 3);
/// assert_eq!(splits[0].train, vec![0, 1, 2]);
/// assert_eq!(splits[0].test, vec![3, 4, 5]);
/// assert_eq!(splits[2].test, vec![9, 10, 11]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "SplitterRepr", into = "SplitterRepr")
)]
pub struct GroupedOrdinalSplitter {
    n_splits: usize,
}

impl GroupedOrdinalSplitter {
    /// Create a splitter yielding `n_splits` train/test pairs.
    ///
    /// Fails with [`ConfigurationError::TooFewSplits`] when `n_splits <= 1`.
    pub fn new(n_splits: i64) -> Result<Self, ConfigurationError> {
        if n_splits <= 1 {
            return Err(ConfigurationError::TooFewSplits { n_splits });
        }
        // Counts beyond usize cannot fit any input; `split` rejects them as
        // TooManySplits.
        let n_splits = usize::try_from(n_splits).unwrap_or(usize::MAX);
        Ok(Self { n_splits })
    }

    /// The configured split count.
    ///
    /// This is the value given at construction, not the number of pairs a
    /// particular call to [`split`](Self::split) produces; use
    /// [`GroupSplits::len`] for that.
    pub fn get_n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate train/test indices for `samples`, grouped by `groups`.
    ///
    /// `groups` must hold exactly one label per sample. All validation runs
    /// before the iterator is returned, so a successful call never fails
    /// mid-iteration. Call again to restart from the first split.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingGroups`] when `groups` is `None`.
    /// - [`ConfigurationError::InconsistentLength`] when the label count
    ///   differs from the sample count.
    /// - [`ConfigurationError::TooManySplits`] when `n_splits` exceeds the
    ///   number of distinct labels.
    /// - [`ConfigurationError::EmptyTestWindow`] when there are fewer than
    ///   `n_splits + 1` distinct labels, leaving no room for a test window.
    pub fn split<S, G>(
        &self,
        samples: &S,
        groups: Option<&[G]>,
    ) -> Result<GroupSplits, ConfigurationError>
    where
        S: NumSamples + ?Sized,
        G: Ord + Hash,
    {
        let groups = groups.ok_or(ConfigurationError::MissingGroups)?;
        let n_samples = samples.n_samples();
        if groups.len() != n_samples {
            return Err(ConfigurationError::InconsistentLength {
                n_samples,
                n_labels: groups.len(),
            });
        }

        let encoding = OrdinalEncoding::fit(groups);
        let n_groups = encoding.n_groups();
        if self.n_splits > n_groups {
            return Err(ConfigurationError::TooManySplits {
                n_splits: self.n_splits,
                n_groups,
            });
        }

        let n_folds = self.n_splits + 1;
        let window = n_groups / n_folds;
        if window == 0 {
            return Err(ConfigurationError::EmptyTestWindow { n_groups, n_folds });
        }
        let first_threshold = window + n_groups % n_folds;

        debug!(
            "grouped split: {n_samples} samples, {n_groups} groups, {n_folds} folds, \
             window={window}, first threshold={first_threshold}"
        );

        Ok(GroupSplits {
            ordinals: encoding.into_ordinals(),
            n_groups,
            window,
            next_threshold: first_threshold,
        })
    }
}

impl Default for GroupedOrdinalSplitter {
    fn default() -> Self {
        Self {
            n_splits: DEFAULT_N_SPLITS,
        }
    }
}

impl TryFrom<i64> for GroupedOrdinalSplitter {
    type Error = ConfigurationError;

    fn try_from(n_splits: i64) -> Result<Self, Self::Error> {
        Self::new(n_splits)
    }
}

/// Serialized form; deserializing goes through [`GroupedOrdinalSplitter::new`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SplitterRepr {
    n_splits: i64,
}

#[cfg(feature = "serde")]
impl TryFrom<SplitterRepr> for GroupedOrdinalSplitter {
    type Error = ConfigurationError;

    fn try_from(repr: SplitterRepr) -> Result<Self, Self::Error> {
        Self::new(repr.n_splits)
    }
}

#[cfg(feature = "serde")]
impl From<GroupedOrdinalSplitter> for SplitterRepr {
    fn from(splitter: GroupedOrdinalSplitter) -> Self {
        Self {
            n_splits: i64::try_from(splitter.n_splits).unwrap_or(i64::MAX),
        }
    }
}

/// Parses an integer split count. Text that is not an integer (including
/// `"3.0"`) is rejected as [`ConfigurationError::NonIntegral`].
impl FromStr for GroupedOrdinalSplitter {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let n_splits = s
            .parse::<i64>()
            .map_err(|_| ConfigurationError::NonIntegral { value: s.into() })?;
        Self::new(n_splits)
    }
}

// ---------------------------------------------------------------------------
// Ordinal encoding
// ---------------------------------------------------------------------------

/// Dense 0-based ranks of group labels, aligned with the input samples.
///
/// Ordinal 0 is the smallest distinct label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrdinalEncoding {
    ordinals: Vec<usize>,
    n_groups: usize,
}

impl OrdinalEncoding {
    /// Rank the distinct values of `labels` and map each sample to its rank.
    ///
    /// Runs in `O(n + g log g)`: labels are deduplicated through a hash map
    /// and only the `g` distinct labels are sorted.
    pub fn fit<G: Ord + Hash>(labels: &[G]) -> Self {
        let mut first_seen: FxHashMap<&G, usize> = FxHashMap::default();
        let ids: Vec<usize> = labels
            .iter()
            .map(|label| {
                let next = first_seen.len();
                *first_seen.entry(label).or_insert(next)
            })
            .collect();

        let mut distinct: Vec<(&G, usize)> = first_seen.into_iter().collect();
        distinct.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut rank_of_id = vec![0; distinct.len()];
        for (ordinal, &(_, id)) in distinct.iter().enumerate() {
            rank_of_id[id] = ordinal;
        }

        Self {
            ordinals: ids.into_iter().map(|id| rank_of_id[id]).collect(),
            n_groups: distinct.len(),
        }
    }

    /// Number of distinct labels.
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Per-sample ordinals.
    pub fn ordinals(&self) -> &[usize] {
        &self.ordinals
    }

    pub fn into_ordinals(self) -> Vec<usize> {
        self.ordinals
    }
}

// ---------------------------------------------------------------------------
// Lazy split sequence
// ---------------------------------------------------------------------------

/// Iterator over the splits of one [`GroupedOrdinalSplitter::split`] call.
///
/// Each step scans the ordinal array once to build the train and test index
/// lists. The iterator is not rewindable; call `split` again to start over.
#[derive(Clone, Debug)]
pub struct GroupSplits {
    ordinals: Vec<usize>,
    n_groups: usize,
    window: usize,
    next_threshold: usize,
}

impl GroupSplits {
    /// Number of distinct groups in the input.
    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of samples in the input.
    pub fn n_samples(&self) -> usize {
        self.ordinals.len()
    }

    /// Width of every test window, in groups.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Per-sample group ordinals.
    pub fn ordinals(&self) -> &[usize] {
        &self.ordinals
    }

    /// Thresholds of the splits not yet yielded, ascending.
    pub fn thresholds(&self) -> StepBy<Range<usize>> {
        (self.next_threshold..self.n_groups).step_by(self.window)
    }

    fn remaining(&self) -> usize {
        self.n_groups
            .saturating_sub(self.next_threshold)
            .div_ceil(self.window)
    }
}

impl Iterator for GroupSplits {
    type Item = Split;

    fn next(&mut self) -> Option<Split> {
        if self.next_threshold >= self.n_groups {
            return None;
        }
        let threshold = self.next_threshold;
        let test_end = threshold + self.window;
        self.next_threshold = test_end;

        let mut train = Vec::new();
        let mut test = Vec::new();
        for (index, &ordinal) in self.ordinals.iter().enumerate() {
            if ordinal < threshold {
                train.push(index);
            } else if ordinal < test_end {
                test.push(index);
            }
        }

        trace!(
            "threshold {threshold}: {} train / {} test samples",
            train.len(),
            test.len()
        );

        Some(Split {
            threshold,
            train,
            test,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for GroupSplits {}

impl FusedIterator for GroupSplits {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::time_series_split;

    fn blocks() -> Vec<u32> {
        vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]
    }

    #[test]
    fn construction_rejects_small_counts() {
        for n in [-3, 0, 1] {
            assert_eq!(
                GroupedOrdinalSplitter::new(n),
                Err(ConfigurationError::TooFewSplits { n_splits: n })
            );
        }
        assert_eq!(GroupedOrdinalSplitter::new(2).unwrap().get_n_splits(), 2);
    }

    #[test]
    fn parse_split_count() {
        let splitter: GroupedOrdinalSplitter = " 4 ".parse().unwrap();
        assert_eq!(splitter.get_n_splits(), 4);

        assert!(matches!(
            "3.0".parse::<GroupedOrdinalSplitter>(),
            Err(ConfigurationError::NonIntegral { .. })
        ));
        assert!(matches!(
            "five".parse::<GroupedOrdinalSplitter>(),
            Err(ConfigurationError::NonIntegral { .. })
        ));
        assert_eq!(
            "1".parse::<GroupedOrdinalSplitter>(),
            Err(ConfigurationError::TooFewSplits { n_splits: 1 })
        );
    }

    #[test]
    fn default_is_five() {
        assert_eq!(GroupedOrdinalSplitter::default().get_n_splits(), 5);
    }

    #[test]
    fn three_splits_over_four_groups() {
        let groups = blocks();
        let splitter = GroupedOrdinalSplitter::new(3).unwrap();
        let splits: Vec<Split> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();

        assert_eq!(splits.len(), 3);
        assert_eq!(splits[0].threshold, 1);
        assert_eq!(splits[0].train, vec![0, 1, 2]);
        assert_eq!(splits[0].test, vec![3, 4, 5]);

        assert_eq!(splits[1].threshold, 2);
        assert_eq!(splits[1].train, (0..6).collect::<Vec<_>>());
        assert_eq!(splits[1].test, vec![6, 7, 8]);

        assert_eq!(splits[2].threshold, 3);
        assert_eq!(splits[2].train, (0..9).collect::<Vec<_>>());
        assert_eq!(splits[2].test, vec![9, 10, 11]);
    }

    #[test]
    fn missing_groups() {
        let splitter = GroupedOrdinalSplitter::new(3).unwrap();
        let err = splitter.split(&blocks(), None::<&[u32]>).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingGroups);
    }

    #[test]
    fn inconsistent_length() {
        let splitter = GroupedOrdinalSplitter::new(2).unwrap();
        let groups = blocks();
        let err = splitter.split(&10usize, Some(&groups[..])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InconsistentLength {
                n_samples: 10,
                n_labels: 12
            }
        );
    }

    #[test]
    fn too_many_splits() {
        let splitter = GroupedOrdinalSplitter::new(5).unwrap();
        let groups = blocks();
        let err = splitter.split(&groups, Some(&groups[..])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::TooManySplits {
                n_splits: 5,
                n_groups: 4
            }
        );
    }

    #[test]
    fn splits_equal_to_groups_leave_empty_window() {
        // n_groups == n_splits always gives window = n / (n + 1) = 0.
        let splitter = GroupedOrdinalSplitter::new(4).unwrap();
        let groups = blocks();
        let err = splitter.split(&groups, Some(&groups[..])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::EmptyTestWindow {
                n_groups: 4,
                n_folds: 5
            }
        );
    }

    #[test]
    fn one_more_group_than_splits_yields_all_splits() {
        // 5 groups, 4 splits: window = 1, remainder = 0, thresholds 1..5.
        let groups: Vec<u8> = vec![0, 1, 2, 3, 4];
        let splitter = GroupedOrdinalSplitter::new(4).unwrap();
        let splits = splitter.split(&groups, Some(&groups[..])).unwrap();
        assert_eq!(splits.len(), 4);
        assert_eq!(splits.thresholds().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn remainder_goes_to_first_train_window() {
        // 9 groups, 3 splits: window = 2, remainder = 1, thresholds 3, 5, 7.
        let groups: Vec<u32> = (0..9).collect();
        let splitter = GroupedOrdinalSplitter::new(3).unwrap();
        let splits: Vec<Split> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();

        let thresholds: Vec<usize> = splits.iter().map(|s| s.threshold).collect();
        assert_eq!(thresholds, vec![3, 5, 7]);
        assert_eq!(splits[0].train, vec![0, 1, 2]);
        for split in &splits {
            assert_eq!(split.test.len(), 2);
        }
        assert_eq!(splits[2].test, vec![7, 8]);
    }

    #[test]
    fn unsorted_string_labels() {
        let groups = ["b", "a", "c", "a", "d", "b", "c", "d"];
        let splitter = GroupedOrdinalSplitter::new(3).unwrap();
        let splits: Vec<Split> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();

        assert_eq!(splits.len(), 3);
        // "a" at 1, 3; "b" at 0, 5
        assert_eq!(splits[0].train, vec![1, 3]);
        assert_eq!(splits[0].test, vec![0, 5]);
        assert_eq!(splits[1].test, vec![2, 6]);
        assert_eq!(splits[2].train, vec![0, 1, 2, 3, 5, 6]);
        assert_eq!(splits[2].test, vec![4, 7]);
    }

    #[test]
    fn exact_size_and_fused() {
        let groups: Vec<u32> = (0..10).flat_map(|g| [g, g]).collect();
        let splitter = GroupedOrdinalSplitter::new(4).unwrap();
        let mut splits = splitter.split(&groups, Some(&groups[..])).unwrap();

        assert_eq!(splits.n_groups(), 10);
        assert_eq!(splits.n_samples(), 20);
        assert_eq!(splits.window(), 2);
        assert_eq!(splits.len(), 4);
        splits.next();
        assert_eq!(splits.len(), 3);
        assert_eq!(splits.by_ref().count(), 3);
        assert!(splits.next().is_none());
        assert_eq!(splits.len(), 0);
    }

    #[test]
    fn restart_by_calling_again() {
        let groups = blocks();
        let splitter = GroupedOrdinalSplitter::new(2).unwrap();
        let first: Vec<Split> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();
        let second: Vec<Split> = splitter.split(&groups, Some(&groups[..])).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_labels_match_sample_level_split() {
        let labels: Vec<i64> = (100..130).collect();
        let splitter = GroupedOrdinalSplitter::new(4).unwrap();
        let grouped: Vec<Split> = splitter.split(&labels, Some(&labels[..])).unwrap().collect();
        assert_eq!(grouped, time_series_split(30, 4));
    }

    #[test]
    fn ordinal_encoding() {
        let encoding = OrdinalEncoding::fit(&[30, 10, 20, 10, 30]);
        assert_eq!(encoding.n_groups(), 3);
        assert_eq!(encoding.ordinals(), &[2, 0, 1, 0, 2]);

        let empty = OrdinalEncoding::fit::<u8>(&[]);
        assert_eq!(empty.n_groups(), 0);
        assert!(empty.ordinals().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn splitter_serde_roundtrip() {
        let splitter = GroupedOrdinalSplitter::new(4).unwrap();
        let json = serde_json::to_string(&splitter).unwrap();
        assert_eq!(json, r#"{"n_splits":4}"#);
        let back: GroupedOrdinalSplitter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, splitter);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_enforces_minimum_splits() {
        for json in [r#"{"n_splits":0}"#, r#"{"n_splits":1}"#, r#"{"n_splits":-3}"#] {
            let err = serde_json::from_str::<GroupedOrdinalSplitter>(json).unwrap_err();
            assert!(err.to_string().contains("n_splits"), "{json}: {err}");
        }
        let splitter: GroupedOrdinalSplitter = serde_json::from_str(r#"{"n_splits":2}"#).unwrap();
        assert_eq!(splitter.get_n_splits(), 2);
    }

    #[test]
    fn huge_split_count_rejected_at_split_time() {
        let splitter = GroupedOrdinalSplitter::try_from(i64::MAX).unwrap();
        let groups = blocks();
        assert!(matches!(
            splitter.split(&groups, Some(&groups[..])),
            Err(ConfigurationError::TooManySplits { n_groups: 4, .. })
        ));
    }

    #[test]
    fn splitter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GroupedOrdinalSplitter>();
        assert_send_sync::<GroupSplits>();
    }
}
