//! Tabular columns and row indexes.

use indexmap::IndexMap;
use serde::Serialize;

use crate::array::NdArray;
use crate::error::{PropertyError, PropertyResult};

/// Row labels of a table or column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIndex {
    /// Lazily materialized `start..stop` by `step`.
    Range { start: i64, stop: i64, step: i64 },
    /// Explicit 1-D labels.
    Labels(NdArray),
}

impl RowIndex {
    /// `0..len`, step 1.
    pub fn range(len: usize) -> Self {
        RowIndex::Range {
            start: 0,
            stop: i64::try_from(len).unwrap_or(i64::MAX),
            step: 1,
        }
    }

    pub fn stepped(start: i64, stop: i64, step: i64) -> PropertyResult<Self> {
        if step == 0 {
            return Err(PropertyError::shape("range step must not be zero"));
        }
        Ok(RowIndex::Range { start, stop, step })
    }

    pub fn labels(labels: NdArray) -> PropertyResult<Self> {
        if labels.ndim() != 1 {
            return Err(PropertyError::shape(format!(
                "index labels must be 1-D, got shape {:?}",
                labels.shape()
            )));
        }
        Ok(RowIndex::Labels(labels))
    }

    /// Number of labels. Computed without materializing a range; saturates at
    /// `usize::MAX` on targets narrower than the range.
    pub fn len(&self) -> usize {
        match self {
            RowIndex::Range { start, stop, step } => {
                let (start, stop, step) =
                    (i128::from(*start), i128::from(*stop), i128::from(*step));
                let (span, step) = if step > 0 {
                    (stop - start, step)
                } else {
                    (start - stop, -step)
                };
                if span <= 0 {
                    0
                } else {
                    usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
                }
            }
            RowIndex::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The labels as a 1-D array.
    ///
    /// Allocates one element per label; check [`RowIndex::len`] first when the
    /// range may be huge.
    pub fn to_array(&self) -> NdArray {
        match self {
            RowIndex::Range { start, step, .. } => {
                let (start, step) = (i128::from(*start), i128::from(*step));
                // Every label lies between start and stop, so it fits in i64.
                NdArray::from_ints(
                    (0..self.len())
                        .map_while(|i| i64::try_from(start + i as i128 * step).ok()),
                )
            }
            RowIndex::Labels(labels) => labels.clone(),
        }
    }

    /// Label equality decided from the range parameters alone.
    ///
    /// `None` unless both sides are ranges.
    pub fn range_eq(&self, other: &RowIndex) -> Option<bool> {
        let (
            RowIndex::Range { start: a, step: a_step, .. },
            RowIndex::Range { start: b, step: b_step, .. },
        ) = (self, other)
        else {
            return None;
        };
        let len = self.len();
        Some(len == other.len() && (len == 0 || (a == b && (len == 1 || a_step == b_step))))
    }
}

/// A named 1-D column of values aligned with a row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: Option<String>,
    index: RowIndex,
    values: NdArray,
}

impl Column {
    /// Column over `0..len` row labels.
    pub fn new(name: Option<String>, values: NdArray) -> PropertyResult<Self> {
        let index = RowIndex::range(values.len());
        Self::with_index(name, index, values)
    }

    pub fn with_index(
        name: Option<String>,
        index: RowIndex,
        values: NdArray,
    ) -> PropertyResult<Self> {
        if values.ndim() != 1 {
            return Err(PropertyError::shape(format!(
                "column values must be 1-D, got shape {:?}",
                values.shape()
            )));
        }
        if values.len() != index.len() {
            return Err(PropertyError::shape(format!(
                "column has {} values but its index has {} labels",
                values.len(),
                index.len()
            )));
        }
        Ok(Self {
            name,
            index,
            values,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn values(&self) -> &NdArray {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Equal-length columns sharing one row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    index: RowIndex,
    columns: IndexMap<String, NdArray>,
}

impl Table {
    /// Build a table with a `0..len` index from named 1-D arrays.
    pub fn from_columns<K, I>(columns: I) -> PropertyResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NdArray)>,
    {
        let columns: IndexMap<String, NdArray> =
            columns.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let len = columns.values().next().map(NdArray::len).unwrap_or(0);
        for (name, values) in &columns {
            if values.ndim() != 1 || values.len() != len {
                return Err(PropertyError::shape(format!(
                    "column {name:?} has shape {:?}, expected [{len}]",
                    values.shape()
                )));
            }
        }
        Ok(Self {
            index: RowIndex::range(len),
            columns,
        })
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// A standalone copy of one column, carrying the table's index.
    pub fn column(&self, name: &str) -> Option<Column> {
        let values = self.columns.get(name)?;
        Some(Column {
            name: Some(name.to_string()),
            index: self.index.clone(),
            values: values.clone(),
        })
    }
}
