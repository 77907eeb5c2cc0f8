//! Errors for splitter configuration, dtype downcasting and frame assembly.

/// Errors raised when a splitter or a downcast is configured with values
/// it cannot honour.
///
/// Every variant is reported synchronously by the call that received the
/// offending value; no partial results are produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigurationError {
    /// `n_splits` was not an integral value.
    #[error("the number of folds must be of integral type, {value} was passed")]
    NonIntegral {
        /// Textual rendering of the rejected value.
        value: String,
    },

    /// `n_splits` was below 2.
    #[error(
        "cross-validation requires at least one train/test split by setting n_splits=2 or more, got n_splits={n_splits}"
    )]
    TooFewSplits { n_splits: i64 },

    /// `split` was called without group labels.
    #[error("groups parameter must not be absent")]
    MissingGroups,

    /// The label array and the sample collection disagree on length.
    #[error("found input variables with inconsistent numbers of samples: [{n_samples}, {n_labels}]")]
    InconsistentLength { n_samples: usize, n_labels: usize },

    /// More splits were requested than there are distinct groups.
    #[error("cannot have number of splits n_splits={n_splits} greater than the number of groups: {n_groups}")]
    TooManySplits { n_splits: usize, n_groups: usize },

    /// `n_groups / (n_splits + 1)` is zero, so no test window can be formed.
    #[error("{n_groups} groups cannot fill {n_folds} folds: test window would be empty")]
    EmptyTestWindow { n_groups: usize, n_folds: usize },

    /// Downcast bit width outside {8, 16, 32, 64}.
    #[error("bit width must be one of 8, 16, 32, 64, got {0}")]
    UnsupportedBitWidth(u32),
}

/// Errors raised while assembling a [`Frame`](crate::frame::Frame).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameError {
    #[error("column '{name}' has {found} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ConfigurationError::MissingGroups.to_string(),
            "groups parameter must not be absent"
        );
        assert_eq!(
            ConfigurationError::TooManySplits {
                n_splits: 5,
                n_groups: 3
            }
            .to_string(),
            "cannot have number of splits n_splits=5 greater than the number of groups: 3"
        );
        assert!(
            ConfigurationError::TooFewSplits { n_splits: 1 }
                .to_string()
                .contains("n_splits=1")
        );
        assert_eq!(
            ConfigurationError::UnsupportedBitWidth(12).to_string(),
            "bit width must be one of 8, 16, 32, 64, got 12"
        );
    }

    #[test]
    fn frame_error_display() {
        let err = FrameError::LengthMismatch {
            name: "price".into(),
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "column 'price' has 2 rows, expected 3");
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConfigurationError::NonIntegral {
            value: "2.5".into(),
        });
        assert!(err.to_string().contains("2.5"));
    }
}
