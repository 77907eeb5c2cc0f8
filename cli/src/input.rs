//! CSV loading and group label extraction.
//!
//! Every column of the input is read as text and then typed: a column whose
//! values all parse as integers becomes `int64`, one whose values all parse
//! as floats becomes `float64`, anything else stays `utf8`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use groupfold::{
    Column, ColumnData, ConfigurationError, Frame, GroupSplits, GroupedOrdinalSplitter,
    total_order_key,
};
use log::{debug, info};

use crate::error::{Error, Result};

/// Load a headed CSV file into a [`Frame`].
pub fn load_csv(path: &Path) -> Result<Frame> {
    let file = File::open(path).map_err(|e| Error::InputRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let frame = read_csv(file)?;
    info!(
        "loaded {} rows x {} columns from {}",
        frame.n_rows(),
        frame.n_columns(),
        path.display()
    );
    Ok(frame)
}

/// Parse headed CSV from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(Error::Input("CSV input has no header row".into()));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (values, field) in raw.iter_mut().zip(record.iter()) {
            values.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| {
            let data = infer_column(values);
            debug!("column '{name}' inferred as {}", data.dtype());
            Column::new(name, data)
        })
        .collect();
    Ok(Frame::new(columns)?)
}

fn infer_column(values: Vec<String>) -> ColumnData {
    let ints: std::result::Result<Vec<i64>, _> = values.iter().map(|v| v.parse()).collect();
    if let Ok(ints) = ints {
        return ColumnData::Int64(ints);
    }
    let floats: std::result::Result<Vec<f64>, _> = values.iter().map(|v| v.parse()).collect();
    if let Ok(floats) = floats {
        return ColumnData::Float64(floats);
    }
    ColumnData::Utf8(values)
}

// ---------------------------------------------------------------------------
// Group labels
// ---------------------------------------------------------------------------

/// Group labels taken from one frame column, in a hashable, ordered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLabels {
    Integer(Vec<i64>),
    /// Float labels mapped to integers with the ordering of `f64::total_cmp`.
    Float(Vec<i64>),
    Text(Vec<String>),
}

impl GroupLabels {
    /// Extract labels from `column`, or from the first column when `None`.
    pub fn from_frame(frame: &Frame, column: Option<&str>) -> Result<Self> {
        let column = match column {
            Some(name) => frame
                .column(name)
                .ok_or_else(|| Error::Input(format!("no column named '{name}'")))?,
            None => frame
                .columns()
                .first()
                .ok_or_else(|| Error::Input("input has no columns".into()))?,
        };

        let labels = match column.data() {
            ColumnData::Int8(v) => GroupLabels::Integer(v.iter().map(|&x| i64::from(x)).collect()),
            ColumnData::Int16(v) => {
                GroupLabels::Integer(v.iter().map(|&x| i64::from(x)).collect())
            }
            ColumnData::Int32(v) => {
                GroupLabels::Integer(v.iter().map(|&x| i64::from(x)).collect())
            }
            ColumnData::Int64(v) => GroupLabels::Integer(v.clone()),
            ColumnData::Bool(v) => GroupLabels::Integer(v.iter().map(|&x| i64::from(x)).collect()),
            ColumnData::Float32(v) => {
                GroupLabels::Float(v.iter().map(|&x| total_order_key(f64::from(x))).collect())
            }
            ColumnData::Float64(v) => {
                GroupLabels::Float(v.iter().map(|&x| total_order_key(x)).collect())
            }
            ColumnData::Utf8(v) => GroupLabels::Text(v.clone()),
        };
        debug!("group labels taken from column '{}'", column.name());
        Ok(labels)
    }

    pub fn len(&self) -> usize {
        match self {
            GroupLabels::Integer(v) | GroupLabels::Float(v) => v.len(),
            GroupLabels::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `splitter` over `frame` with these labels.
    pub fn split(
        &self,
        splitter: &GroupedOrdinalSplitter,
        frame: &Frame,
    ) -> std::result::Result<GroupSplits, ConfigurationError> {
        match self {
            GroupLabels::Integer(v) | GroupLabels::Float(v) => splitter.split(frame, Some(&v[..])),
            GroupLabels::Text(v) => splitter.split(frame, Some(&v[..])),
        }
    }
}
