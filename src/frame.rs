//! Minimal columnar table and dtype downcasting.
//!
//! [`Frame`] holds named, equally sized, typed columns. It exists so that
//! numeric columns can be narrowed (for example `float64` to `float32`) to
//! halve memory before model fitting, and so that a table can be handed to a
//! splitter directly through [`NumSamples`].
//!
//! ```
//! use groupfold::frame::{downcast_dtypes_default, Column, Dtype, Frame};
//!
//! let frame = Frame::new(vec![
//!     Column::new("price", vec![1.5_f64, 2.5]),
//!     Column::new("volume", vec![100_i64, 200]),
//!     Column::new("symbol", vec!["A".to_string(), "B".to_string()]),
//! ])
//! .unwrap();
//!
//! let frame = downcast_dtypes_default(frame);
//! assert_eq!(frame.column("price").unwrap().dtype(), Dtype::Float32);
//! assert_eq!(frame.column("volume").unwrap().dtype(), Dtype::Int32);
//! assert_eq!(frame.column("symbol").unwrap().dtype(), Dtype::Utf8);
//! ```

use std::fmt;

use log::debug;

use crate::cv::NumSamples;
use crate::error::{ConfigurationError, FrameError};

// ---------------------------------------------------------------------------
// Dtypes
// ---------------------------------------------------------------------------

/// Permitted widths for [`downcast_dtypes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitWidth {
    W8,
    W16,
    W32,
    W64,
}

impl BitWidth {
    /// Width in bits.
    pub fn bits(self) -> u32 {
        match self {
            BitWidth::W8 => 8,
            BitWidth::W16 => 16,
            BitWidth::W32 => 32,
            BitWidth::W64 => 64,
        }
    }
}

impl TryFrom<u32> for BitWidth {
    type Error = ConfigurationError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitWidth::W8),
            16 => Ok(BitWidth::W16),
            32 => Ok(BitWidth::W32),
            64 => Ok(BitWidth::W64),
            other => Err(ConfigurationError::UnsupportedBitWidth(other)),
        }
    }
}

/// Element type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dtype {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Utf8,
}

impl Dtype {
    /// Signed integer type of the given width.
    pub fn integer(width: BitWidth) -> Dtype {
        match width {
            BitWidth::W8 => Dtype::Int8,
            BitWidth::W16 => Dtype::Int16,
            BitWidth::W32 => Dtype::Int32,
            BitWidth::W64 => Dtype::Int64,
        }
    }

    /// Floating-point type of the given width. Only 32 and 64 bits exist.
    pub fn float(width: BitWidth) -> Option<Dtype> {
        match width {
            BitWidth::W32 => Some(Dtype::Float32),
            BitWidth::W64 => Some(Dtype::Float64),
            BitWidth::W8 | BitWidth::W16 => None,
        }
    }

    /// Width of numeric types; `None` for `Bool` and `Utf8`.
    pub fn bit_width(self) -> Option<BitWidth> {
        match self {
            Dtype::Int8 => Some(BitWidth::W8),
            Dtype::Int16 => Some(BitWidth::W16),
            Dtype::Int32 | Dtype::Float32 => Some(BitWidth::W32),
            Dtype::Int64 | Dtype::Float64 => Some(BitWidth::W64),
            Dtype::Bool | Dtype::Utf8 => None,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Dtype::Int8 | Dtype::Int16 | Dtype::Int32 | Dtype::Int64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Dtype::Float32 | Dtype::Float64)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Bool => "bool",
            Dtype::Utf8 => "utf8",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Typed storage for one column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Utf8(Vec<String>),
}

macro_rules! column_data_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ColumnData {
                fn from(values: Vec<$ty>) -> Self {
                    ColumnData::$variant(values)
                }
            }
        )*
    };
}

column_data_from! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => Utf8,
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            ColumnData::Int8(_) => Dtype::Int8,
            ColumnData::Int16(_) => Dtype::Int16,
            ColumnData::Int32(_) => Dtype::Int32,
            ColumnData::Int64(_) => Dtype::Int64,
            ColumnData::Float32(_) => Dtype::Float32,
            ColumnData::Float64(_) => Dtype::Float64,
            ColumnData::Bool(_) => Dtype::Bool,
            ColumnData::Utf8(_) => Dtype::Utf8,
        }
    }

    /// Integer values widened to `i64`, or `None` for non-integer columns.
    fn integers(&self) -> Option<Vec<i64>> {
        match self {
            ColumnData::Int8(v) => Some(v.iter().map(|&x| i64::from(x)).collect()),
            ColumnData::Int16(v) => Some(v.iter().map(|&x| i64::from(x)).collect()),
            ColumnData::Int32(v) => Some(v.iter().map(|&x| i64::from(x)).collect()),
            ColumnData::Int64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Float values widened to `f64`, or `None` for non-float columns.
    fn floats(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Float32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            ColumnData::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Convert an integer column to another integer type, or a float column
    /// to another float type.
    ///
    /// Narrowing integers wraps (two's complement truncation) and narrowing
    /// floats rounds to nearest, matching numpy's `astype`. Returns `None`
    /// when `to` is not of the same kind as the column.
    pub fn cast(&self, to: Dtype) -> Option<ColumnData> {
        let data = match to {
            Dtype::Int8 => ColumnData::Int8(self.integers()?.into_iter().map(|x| x as i8).collect()),
            Dtype::Int16 => {
                ColumnData::Int16(self.integers()?.into_iter().map(|x| x as i16).collect())
            }
            Dtype::Int32 => {
                ColumnData::Int32(self.integers()?.into_iter().map(|x| x as i32).collect())
            }
            Dtype::Int64 => ColumnData::Int64(self.integers()?),
            Dtype::Float32 => {
                ColumnData::Float32(self.floats()?.into_iter().map(|x| x as f32).collect())
            }
            Dtype::Float64 => ColumnData::Float64(self.floats()?),
            Dtype::Bool | Dtype::Utf8 => return None,
        };
        Some(data)
    }
}

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Ordered collection of equally sized, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
        let mut frame = Frame::default();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, column: Column) -> Result<(), FrameError> {
        if self.column(column.name()).is_some() {
            return Err(FrameError::DuplicateColumn(column.name));
        }
        let expected = self.n_rows();
        if !self.columns.is_empty() && column.len() != expected {
            return Err(FrameError::LengthMismatch {
                found: column.len(),
                name: column.name,
                expected,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// `(name, dtype)` for every column, in order.
    pub fn dtypes(&self) -> Vec<(&str, Dtype)> {
        self.columns.iter().map(|c| (c.name(), c.dtype())).collect()
    }
}

impl NumSamples for Frame {
    fn n_samples(&self) -> usize {
        self.n_rows()
    }
}

// ---------------------------------------------------------------------------
// Downcasting
// ---------------------------------------------------------------------------

/// Rewrite every integer or float column stored at `from_bits` to the type
/// of the same kind at `to_bits`.
///
/// Both widths must be one of 8, 16, 32 or 64 and are validated before any
/// column is touched. Floats only exist at 32 and 64 bits, so float columns
/// are left unchanged when either width has no float type. Boolean and
/// string columns are never modified.
pub fn downcast_dtypes(
    mut frame: Frame,
    from_bits: u32,
    to_bits: u32,
) -> Result<Frame, ConfigurationError> {
    let from = BitWidth::try_from(from_bits)?;
    let to = BitWidth::try_from(to_bits)?;
    if from == to {
        return Ok(frame);
    }

    for column in &mut frame.columns {
        let dtype = column.dtype();
        if dtype.bit_width() != Some(from) {
            continue;
        }
        let target = if dtype.is_integer() {
            Some(Dtype::integer(to))
        } else {
            Dtype::float(to)
        };
        let Some(target) = target else {
            continue;
        };
        if let Some(data) = column.data.cast(target) {
            debug!("downcast column '{}': {dtype} -> {target}", column.name);
            column.data = data;
        }
    }

    Ok(frame)
}

/// Downcast `float64` to `float32` and `int64` to `int32`.
pub fn downcast_dtypes_default(frame: Frame) -> Frame {
    let Frame { mut columns } = frame;
    for column in &mut columns {
        let target = match column.dtype() {
            Dtype::Int64 => Dtype::Int32,
            Dtype::Float64 => Dtype::Float32,
            _ => continue,
        };
        if let Some(data) = column.data.cast(target) {
            column.data = data;
        }
    }
    Frame { columns }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Column::new("f64", vec![1.5_f64, -2.25, 1e300]),
            Column::new("f32", vec![0.5_f32, 1.0, 2.0]),
            Column::new("i64", vec![1_i64, -1, 4_294_967_297]),
            Column::new("i32", vec![7_i32, 300, -129]),
            Column::new("i8", vec![1_i8, -1, 127]),
            Column::new("flag", vec![true, false, true]),
            Column::new("name", vec!["a".to_string(), "b".into(), "c".into()]),
        ])
        .unwrap()
    }

    fn dtype_of(frame: &Frame, name: &str) -> Dtype {
        frame.column(name).unwrap().dtype()
    }

    #[test]
    fn bit_width_validation() {
        for bits in [8, 16, 32, 64] {
            assert_eq!(BitWidth::try_from(bits).unwrap().bits(), bits);
        }
        assert_eq!(
            BitWidth::try_from(12),
            Err(ConfigurationError::UnsupportedBitWidth(12))
        );
    }

    #[test]
    fn rejects_bad_widths_before_touching_columns() {
        let err = downcast_dtypes(sample_frame(), 64, 24).unwrap_err();
        assert_eq!(err, ConfigurationError::UnsupportedBitWidth(24));
        let err = downcast_dtypes(sample_frame(), 0, 32).unwrap_err();
        assert_eq!(err, ConfigurationError::UnsupportedBitWidth(0));
    }

    #[test]
    fn sixty_four_to_thirty_two() {
        let frame = downcast_dtypes(sample_frame(), 64, 32).unwrap();
        assert_eq!(dtype_of(&frame, "f64"), Dtype::Float32);
        assert_eq!(dtype_of(&frame, "i64"), Dtype::Int32);
        assert_eq!(dtype_of(&frame, "f32"), Dtype::Float32);
        assert_eq!(dtype_of(&frame, "i32"), Dtype::Int32);
        assert_eq!(dtype_of(&frame, "flag"), Dtype::Bool);
        assert_eq!(dtype_of(&frame, "name"), Dtype::Utf8);

        // 2^32 + 1 wraps to 1
        assert_eq!(
            frame.column("i64").unwrap().data(),
            &ColumnData::Int32(vec![1, -1, 1])
        );
        match frame.column("f64").unwrap().data() {
            ColumnData::Float32(v) => {
                assert_eq!(v[0], 1.5);
                assert_eq!(v[1], -2.25);
                assert!(v[2].is_infinite());
            }
            other => panic!("expected float32, got {:?}", other.dtype()),
        }
    }

    #[test]
    fn thirty_two_to_eight_wraps_integers_and_skips_floats() {
        let frame = downcast_dtypes(sample_frame(), 32, 8).unwrap();
        assert_eq!(
            frame.column("i32").unwrap().data(),
            &ColumnData::Int8(vec![7, 44, 127])
        );
        // no 8-bit float
        assert_eq!(dtype_of(&frame, "f32"), Dtype::Float32);
        assert_eq!(dtype_of(&frame, "i64"), Dtype::Int64);
    }

    #[test]
    fn widening_sign_extends() {
        let frame = downcast_dtypes(sample_frame(), 8, 64).unwrap();
        assert_eq!(
            frame.column("i8").unwrap().data(),
            &ColumnData::Int64(vec![1, -1, 127])
        );
    }

    #[test]
    fn same_width_is_noop() {
        let frame = downcast_dtypes(sample_frame(), 32, 32).unwrap();
        assert_eq!(frame, sample_frame());
    }

    #[test]
    fn default_downcast() {
        let frame = downcast_dtypes_default(sample_frame());
        assert_eq!(frame, downcast_dtypes(sample_frame(), 64, 32).unwrap());
    }

    #[test]
    fn frame_validation() {
        let err = Frame::new(vec![
            Column::new("a", vec![1_i64, 2]),
            Column::new("b", vec![1_i64]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                name: "b".into(),
                expected: 2,
                found: 1
            }
        );

        let err = Frame::new(vec![
            Column::new("a", vec![1_i64]),
            Column::new("a", vec![2_i64]),
        ])
        .unwrap_err();
        assert_eq!(err, FrameError::DuplicateColumn("a".into()));
    }

    #[test]
    fn frame_accessors() {
        let frame = sample_frame();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_samples(), 3);
        assert_eq!(frame.n_columns(), 7);
        assert_eq!(frame.dtypes()[0], ("f64", Dtype::Float64));
        assert!(frame.column("missing").is_none());
        assert_eq!(Frame::default().n_rows(), 0);
    }

    #[test]
    fn cast_across_kinds_is_refused() {
        let ints = ColumnData::Int64(vec![1, 2]);
        assert!(ints.cast(Dtype::Float32).is_none());
        assert!(ints.cast(Dtype::Utf8).is_none());
        let floats = ColumnData::Float32(vec![1.0]);
        assert!(floats.cast(Dtype::Int32).is_none());
    }

    #[test]
    fn dtype_display() {
        assert_eq!(Dtype::Float32.to_string(), "float32");
        assert_eq!(Dtype::Int16.to_string(), "int16");
        assert_eq!(Dtype::Utf8.to_string(), "utf8");
    }
}
