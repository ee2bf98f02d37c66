//! Dense n-dimensional arrays.
//!
//! `NdArray` is deliberately small: a shape plus a homogeneous flat buffer in
//! row-major order. It only carries the operations the property layer needs to
//! build, coerce and compare array-valued properties.

use serde::Serialize;

use crate::error::{PropertyError, PropertyResult};

/// Element type of an array buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    Int,
    Float,
    Str,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, DType::Str)
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int => "int64",
            DType::Float => "float64",
            DType::Str => "str",
        };
        f.write_str(name)
    }
}

/// Homogeneous, flat element storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bool(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Bool(_) => DType::Bool,
            ArrayData::Int(_) => DType::Int,
            ArrayData::Float(_) => DType::Float,
            ArrayData::Str(_) => DType::Str,
        }
    }

    fn element(&self, i: usize) -> Option<Element<'_>> {
        match self {
            ArrayData::Bool(v) => v.get(i).map(|b| Element::Bool(*b)),
            ArrayData::Int(v) => v.get(i).map(|n| Element::Int(*n)),
            ArrayData::Float(v) => v.get(i).map(|x| Element::Float(*x)),
            ArrayData::Str(v) => v.get(i).map(|s| Element::Str(s.as_str())),
        }
    }

    fn to_floats(&self) -> Option<Vec<f64>> {
        match self {
            ArrayData::Bool(v) => Some(v.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect()),
            ArrayData::Int(v) => Some(v.iter().map(|n| *n as f64).collect()),
            ArrayData::Float(v) => Some(v.clone()),
            ArrayData::Str(_) => None,
        }
    }

    fn to_ints(&self) -> Option<Vec<i64>> {
        match self {
            ArrayData::Bool(v) => Some(v.iter().map(|b| i64::from(*b)).collect()),
            ArrayData::Int(v) => Some(v.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum Element<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl Element<'_> {
    fn as_int(self) -> Option<i64> {
        match self {
            Element::Bool(b) => Some(i64::from(b)),
            Element::Int(n) => Some(n),
            Element::Float(_) | Element::Str(_) => None,
        }
    }

    /// `None` when either side is a string.
    fn numeric_eq(self, other: Element<'_>) -> Option<bool> {
        match (self, other) {
            (Element::Str(_), _) | (_, Element::Str(_)) => None,
            (Element::Float(x), Element::Float(y)) => Some(x == y),
            (Element::Float(x), n) | (n, Element::Float(x)) => Some(int_eq_float(n.as_int()?, x)),
            (x, y) => Some(x.as_int()? == y.as_int()?),
        }
    }
}

/// Exact equality of an integer and a float.
///
/// The float must be integral and inside the `i64` range, so values that only
/// agree after rounding to `f64` do not compare equal.
pub fn int_eq_float(n: i64, x: f64) -> bool {
    // 2^63, the first float above i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    x.fract() == 0.0 && (-LIMIT..LIMIT).contains(&x) && x as i64 == n
}

/// Outcome of an element-wise comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArrayComparison {
    /// Same shape and every element equal.
    Equal,
    /// Shapes differ or at least one element differs.
    NotEqual,
    /// Numeric elements were compared against string elements.
    Incompatible,
}

/// N-dimensional array with a row-major buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NdArray {
    /// Build an array, checking that the buffer fills the shape exactly.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> PropertyResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(PropertyError::shape(format!(
                "shape {shape:?} needs {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    fn vector(data: ArrayData) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    fn zero_dim(data: ArrayData) -> Self {
        Self {
            shape: Vec::new(),
            data,
        }
    }

    /// `[0, 1, ..., n - 1]` as a 1-D integer array.
    pub fn arange(n: usize) -> Self {
        Self::vector(ArrayData::Int((0..n as i64).collect()))
    }

    pub fn from_ints(values: impl IntoIterator<Item = i64>) -> Self {
        Self::vector(ArrayData::Int(values.into_iter().collect()))
    }

    pub fn from_floats(values: impl IntoIterator<Item = f64>) -> Self {
        Self::vector(ArrayData::Float(values.into_iter().collect()))
    }

    pub fn from_bools(values: impl IntoIterator<Item = bool>) -> Self {
        Self::vector(ArrayData::Bool(values.into_iter().collect()))
    }

    pub fn from_strs<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::vector(ArrayData::Str(values.into_iter().map(Into::into).collect()))
    }

    pub fn scalar_bool(value: bool) -> Self {
        Self::zero_dim(ArrayData::Bool(vec![value]))
    }

    pub fn scalar_int(value: i64) -> Self {
        Self::zero_dim(ArrayData::Int(vec![value]))
    }

    pub fn scalar_float(value: f64) -> Self {
        Self::zero_dim(ArrayData::Float(vec![value]))
    }

    pub fn scalar_str(value: impl Into<String>) -> Self {
        Self::zero_dim(ArrayData::Str(vec![value.into()]))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Length along the first axis (`1` for a 0-d array).
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn reshape(&self, shape: Vec<usize>) -> PropertyResult<Self> {
        Self::new(shape, self.data.clone())
    }

    /// Element-wise `self + delta`; `None` for string arrays and on integer
    /// overflow.
    ///
    /// Booleans are promoted to integers.
    pub fn add_scalar(&self, delta: i64) -> Option<Self> {
        let data = match &self.data {
            ArrayData::Float(v) => ArrayData::Float(v.iter().map(|x| x + delta as f64).collect()),
            ArrayData::Str(_) => return None,
            other => ArrayData::Int(
                other
                    .to_ints()?
                    .iter()
                    .map(|n| n.checked_add(delta))
                    .collect::<Option<Vec<_>>>()?,
            ),
        };
        Some(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Same shape, every element rendered as a string.
    pub fn astype_str(&self) -> Self {
        let strings = (0..self.size())
            .filter_map(|i| self.data.element(i))
            .map(|e| match e {
                Element::Bool(b) => bool_repr(b).to_string(),
                Element::Int(n) => n.to_string(),
                Element::Float(x) => format_float(x),
                Element::Str(s) => s.to_string(),
            })
            .collect();
        Self {
            shape: self.shape.clone(),
            data: ArrayData::Str(strings),
        }
    }

    /// Stack equally-shaped arrays along a new leading axis.
    ///
    /// Numeric dtypes are promoted (`bool < int < float`); strings only stack
    /// with strings. An empty input produces an empty float vector.
    pub fn stack(parts: &[NdArray]) -> Option<Self> {
        let Some(first) = parts.first() else {
            return Some(Self::vector(ArrayData::Float(Vec::new())));
        };
        if parts.iter().any(|p| p.shape != first.shape) {
            return None;
        }

        let mut shape = Vec::with_capacity(first.shape.len() + 1);
        shape.push(parts.len());
        shape.extend_from_slice(&first.shape);

        let dtypes: Vec<DType> = parts.iter().map(NdArray::dtype).collect();
        let data = if dtypes.iter().all(|d| *d == DType::Str) {
            ArrayData::Str(
                parts
                    .iter()
                    .flat_map(|p| match &p.data {
                        ArrayData::Str(v) => v.clone(),
                        _ => Vec::new(),
                    })
                    .collect(),
            )
        } else if dtypes.contains(&DType::Str) {
            return None;
        } else if dtypes.contains(&DType::Float) {
            let mut out = Vec::new();
            for p in parts {
                out.extend(p.data.to_floats()?);
            }
            ArrayData::Float(out)
        } else if dtypes.contains(&DType::Int) {
            let mut out = Vec::new();
            for p in parts {
                out.extend(p.data.to_ints()?);
            }
            ArrayData::Int(out)
        } else {
            ArrayData::Bool(
                parts
                    .iter()
                    .flat_map(|p| match &p.data {
                        ArrayData::Bool(v) => v.clone(),
                        _ => Vec::new(),
                    })
                    .collect(),
            )
        };

        Some(Self { shape, data })
    }

    /// Element-wise equality reduced to a single answer.
    ///
    /// Shapes must match exactly. Numbers compare by value across dtypes
    /// (`1 == 1.0 == true`); NaN never equals anything.
    pub fn compare(&self, other: &NdArray) -> ArrayComparison {
        if self.shape != other.shape {
            return ArrayComparison::NotEqual;
        }
        if self.dtype().is_numeric() != other.dtype().is_numeric() {
            return if self.is_empty() {
                ArrayComparison::Equal
            } else {
                ArrayComparison::Incompatible
            };
        }

        for i in 0..self.size() {
            let (Some(a), Some(b)) = (self.data.element(i), other.data.element(i)) else {
                return ArrayComparison::NotEqual;
            };
            let equal = match (a, b) {
                (Element::Str(x), Element::Str(y)) => x == y,
                (x, y) => x.numeric_eq(y).unwrap_or(false),
            };
            if !equal {
                return ArrayComparison::NotEqual;
            }
        }
        ArrayComparison::Equal
    }
}

impl core::fmt::Display for NdArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let items: Vec<String> = (0..self.size())
            .filter_map(|i| self.data.element(i))
            .map(|e| match e {
                Element::Bool(b) => bool_repr(b).to_string(),
                Element::Int(n) => n.to_string(),
                Element::Float(x) => format_float(x),
                Element::Str(s) => format!("'{s}'"),
            })
            .collect();
        if self.ndim() <= 1 {
            write!(f, "array([{}])", items.join(", "))
        } else {
            write!(f, "array([{}], shape={:?})", items.join(", "), self.shape)
        }
    }
}

fn bool_repr(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}
