mod cv;

use pyo3::prelude::*;

/// groupfold: Python bindings for deterministic, group-aware time series
/// cross-validation splits.
#[pymodule]
fn groupfold(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", "0.3.0")?;

    // Splitters
    m.add_class::<cv::PyTimeSeriesGroupSplit>()?;

    // Functions
    m.add_function(wrap_pyfunction!(cv::py_time_series_split, m)?)?;

    Ok(())
}
