use super::Column;
use crate::DocId;

/// In-memory column, with one optional value per document.
///
/// Documents beyond the end of the vector have no value.
#[derive(Debug, Clone, Default)]
pub struct VecColumn<T> {
    values: Vec<Option<T>>,
}

impl<T> VecColumn<T> {
    /// Creates a column in which every document has a value.
    pub fn dense(values: Vec<T>) -> VecColumn<T> {
        VecColumn {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Number of documents covered by the column.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<T> From<Vec<Option<T>>> for VecColumn<T> {
    fn from(values: Vec<Option<T>>) -> VecColumn<T> {
        VecColumn { values }
    }
}

impl<T: Clone + Send + Sync> Column<T> for VecColumn<T> {
    #[inline]
    fn first(&self, doc: DocId) -> Option<T> {
        self.values.get(doc as usize)?.clone()
    }
}
