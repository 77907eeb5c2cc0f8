use groupfold::{ConfigurationError, GroupedOrdinalSplitter, cv, total_order_key};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyFloat;

type IndexPairs = Vec<(Vec<usize>, Vec<usize>)>;

fn to_py_err(err: ConfigurationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Group labels accepted from Python.
enum Labels {
    Int(Vec<i64>),
    /// Floats keyed by IEEE total order.
    Float(Vec<i64>),
    Str(Vec<String>),
}

fn extract_labels(groups: &Bound<'_, PyAny>) -> PyResult<Labels> {
    if let Ok(labels) = groups.extract::<Vec<i64>>() {
        return Ok(Labels::Int(labels));
    }
    if let Ok(labels) = groups.extract::<Vec<f64>>() {
        return Ok(Labels::Float(
            labels.into_iter().map(total_order_key).collect(),
        ));
    }
    if let Ok(labels) = groups.extract::<Vec<String>>() {
        return Ok(Labels::Str(labels));
    }
    Err(PyTypeError::new_err(
        "groups must be a sequence of integers, floats or strings",
    ))
}

fn parse_n_splits(value: &Bound<'_, PyAny>) -> PyResult<GroupedOrdinalSplitter> {
    let integral = !value.is_instance_of::<PyFloat>();
    match value.extract::<i64>() {
        Ok(n) if integral => GroupedOrdinalSplitter::new(n).map_err(to_py_err),
        _ => Err(to_py_err(ConfigurationError::NonIntegral {
            value: format!("{} of type {}", value.repr()?, value.get_type().name()?),
        })),
    }
}

/// Time series cross-validator with group separation.
///
/// Provides train/test indices for samples observed over time, where every
/// sample belongs to a group (for example its timestamp). A group goes to
/// train or test as a whole, and each split tests on groups strictly later
/// than those of the previous split.
///
/// Args:
///     n_splits: Number of splits, an integer >= 2 (default 5).
///
/// Example::
///
///     cv = groupfold.TimeSeriesGroupSplit(n_splits=3)
///     for train_idx, test_idx in cv.split(X, groups=dates):
///         model.fit(X[train_idx], y[train_idx])
///
#[pyclass(name = "TimeSeriesGroupSplit", frozen)]
pub struct PyTimeSeriesGroupSplit {
    inner: GroupedOrdinalSplitter,
}

#[pymethods]
impl PyTimeSeriesGroupSplit {
    #[new]
    #[pyo3(signature = (n_splits=None))]
    fn new(n_splits: Option<&Bound<'_, PyAny>>) -> PyResult<Self> {
        let inner = match n_splits {
            Some(value) if !value.is_none() => parse_n_splits(value)?,
            _ => GroupedOrdinalSplitter::default(),
        };
        Ok(Self { inner })
    }

    /// Generate indices to split data into training and test set.
    ///
    /// Args:
    ///     x: Training data; only its length is used.
    ///     y: Ignored, exists for scikit-learn compatibility.
    ///     groups: One label per sample (integers, floats or strings).
    ///         Required.
    ///
    /// Returns:
    ///     List of (train_indices, test_indices) tuples.
    ///
    /// Raises:
    ///     ValueError: if groups is None, its length differs from x, or
    ///         there are too few distinct groups for n_splits.
    #[pyo3(signature = (x, y=None, groups=None))]
    fn split(
        &self,
        x: &Bound<'_, PyAny>,
        y: Option<&Bound<'_, PyAny>>,
        groups: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<IndexPairs> {
        let _ = y;
        let groups = match groups {
            Some(groups) if !groups.is_none() => groups,
            _ => return Err(to_py_err(ConfigurationError::MissingGroups)),
        };
        let n_samples = x.len()?;

        let splits = match extract_labels(groups)? {
            Labels::Int(labels) | Labels::Float(labels) => {
                self.inner.split(&n_samples, Some(&labels[..]))
            }
            Labels::Str(labels) => self.inner.split(&n_samples, Some(&labels[..])),
        }
        .map_err(to_py_err)?;

        Ok(splits.map(Into::into).collect())
    }

    /// Returns the configured number of splitting iterations.
    #[pyo3(signature = (x=None, y=None, groups=None))]
    fn get_n_splits(
        &self,
        x: Option<&Bound<'_, PyAny>>,
        y: Option<&Bound<'_, PyAny>>,
        groups: Option<&Bound<'_, PyAny>>,
    ) -> usize {
        let _ = (x, y, groups);
        self.inner.get_n_splits()
    }

    #[getter(n_splits)]
    fn n_splits_getter(&self) -> usize {
        self.inner.get_n_splits()
    }

    fn __repr__(&self) -> String {
        format!("TimeSeriesGroupSplit(n_splits={})", self.inner.get_n_splits())
    }
}

/// Expanding-window time series cross-validation splits.
///
/// Drop-in replacement for ``sklearn.model_selection.TimeSeriesSplit``.
///
/// Args:
///     n_samples: Total number of observations.
///     n_splits: Number of folds.
///
/// Returns:
///     List of (train_indices, test_indices) tuples.
///
/// Example::
///
///     for train_idx, test_idx in groupfold.py_time_series_split(100, 5):
///         train_data = data[train_idx]
///         test_data = data[test_idx]
///
#[pyfunction]
#[pyo3(signature = (n_samples, n_splits=5))]
pub fn py_time_series_split(n_samples: usize, n_splits: usize) -> IndexPairs {
    cv::time_series_split(n_samples, n_splits)
        .into_iter()
        .map(Into::into)
        .collect()
}
