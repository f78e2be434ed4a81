//! Per-document sort value access.
//!
//! The collector never decodes stored values itself: for every sort field it asks the
//! segment for a [`DynamicColumn`] and reads at most one value per document out of it.

mod vec_column;

use std::fmt;
use std::sync::Arc;

pub use self::vec_column::VecColumn;
use crate::DocId;

/// Random access to the (optional) value of a document.
pub trait Column<T>: Send + Sync {
    /// Returns the value associated to `doc`, or `None` if the document has no value.
    fn first(&self, doc: DocId) -> Option<T>;
}

/// Type of the values held by a column.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColumnType {
    /// Unsigned 64-bit integers.
    U64,
    /// Signed 64-bit integers.
    I64,
    /// 64-bit floats.
    F64,
    /// Strings.
    Str,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::U64 => "u64",
            ColumnType::I64 => "i64",
            ColumnType::F64 => "f64",
            ColumnType::Str => "str",
        };
        f.write_str(name)
    }
}

/// A column whose value type is only known at runtime.
#[derive(Clone)]
pub enum DynamicColumn {
    /// Column of `u64`.
    U64(Arc<dyn Column<u64>>),
    /// Column of `i64`.
    I64(Arc<dyn Column<i64>>),
    /// Column of `f64`.
    F64(Arc<dyn Column<f64>>),
    /// Column of `String`.
    Str(Arc<dyn Column<String>>),
}

impl DynamicColumn {
    /// Returns the type of the values in this column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            DynamicColumn::U64(_) => ColumnType::U64,
            DynamicColumn::I64(_) => ColumnType::I64,
            DynamicColumn::F64(_) => ColumnType::F64,
            DynamicColumn::Str(_) => ColumnType::Str,
        }
    }
}

impl fmt::Debug for DynamicColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicColumn({})", self.column_type())
    }
}

impl From<VecColumn<u64>> for DynamicColumn {
    fn from(column: VecColumn<u64>) -> Self {
        DynamicColumn::U64(Arc::new(column))
    }
}

impl From<VecColumn<i64>> for DynamicColumn {
    fn from(column: VecColumn<i64>) -> Self {
        DynamicColumn::I64(Arc::new(column))
    }
}

impl From<VecColumn<f64>> for DynamicColumn {
    fn from(column: VecColumn<f64>) -> Self {
        DynamicColumn::F64(Arc::new(column))
    }
}

impl From<VecColumn<String>> for DynamicColumn {
    fn from(column: VecColumn<String>) -> Self {
        DynamicColumn::Str(Arc::new(column))
    }
}
