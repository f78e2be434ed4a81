use std::collections::HashMap;

use super::SegmentReader;
use crate::collector::Sort;
use crate::column::{DynamicColumn, VecColumn};
use crate::DocId;

/// A segment entirely held in memory.
///
/// It is mostly useful for tests, and as a reference implementation of
/// [`SegmentReader`].
///
/// ```rust
/// use tantivy_topk::collector::{Sort, SortField};
/// use tantivy_topk::index::{RamSegmentReader, SegmentReader};
/// use tantivy_topk::Order;
///
/// let segment = RamSegmentReader::new(3)
///     .with_i64_column("timestamp", vec![Some(-1), Some(4), Some(9)])
///     .with_sort(Sort::new(vec![SortField::i64("timestamp", Order::Asc)]));
/// assert_eq!(segment.max_doc(), 3);
/// assert!(segment.sort_by().is_some());
/// assert!(segment.column("title").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RamSegmentReader {
    max_doc: DocId,
    sort_by: Option<Sort>,
    columns: HashMap<String, DynamicColumn>,
}

impl RamSegmentReader {
    /// Creates an empty segment with `max_doc` documents.
    pub fn new(max_doc: DocId) -> RamSegmentReader {
        RamSegmentReader {
            max_doc,
            sort_by: None,
            columns: HashMap::new(),
        }
    }

    /// Declares the order in which documents are stored.
    ///
    /// The caller is responsible for actually storing the values in that order.
    pub fn with_sort(mut self, sort: Sort) -> RamSegmentReader {
        self.sort_by = Some(sort);
        self
    }

    /// Adds a column.
    pub fn with_column(mut self, field_name: &str, column: impl Into<DynamicColumn>) -> Self {
        self.columns.insert(field_name.to_string(), column.into());
        self
    }

    /// Adds a `u64` column.
    pub fn with_u64_column(self, field_name: &str, values: Vec<Option<u64>>) -> Self {
        self.with_column(field_name, VecColumn::from(values))
    }

    /// Adds an `i64` column.
    pub fn with_i64_column(self, field_name: &str, values: Vec<Option<i64>>) -> Self {
        self.with_column(field_name, VecColumn::from(values))
    }

    /// Adds a `f64` column.
    pub fn with_f64_column(self, field_name: &str, values: Vec<Option<f64>>) -> Self {
        self.with_column(field_name, VecColumn::from(values))
    }

    /// Adds a string column.
    pub fn with_str_column(self, field_name: &str, values: Vec<Option<&str>>) -> Self {
        let values: Vec<Option<String>> = values
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect();
        self.with_column(field_name, VecColumn::from(values))
    }
}

impl SegmentReader for RamSegmentReader {
    fn max_doc(&self) -> DocId {
        self.max_doc
    }

    fn sort_by(&self) -> Option<&Sort> {
        self.sort_by.as_ref()
    }

    fn column(&self, field_name: &str) -> Option<DynamicColumn> {
        self.columns.get(field_name).cloned()
    }
}
