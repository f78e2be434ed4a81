//! Sort criteria of a top-k search.
//!
//! A [`Sort`] is a non-empty list of [`SortField`]s. Documents are ranked by the
//! first field, ties are broken by the second field and so on. Documents that are
//! equal on every field are ranked by ascending global doc id.

mod order;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::order::{
    Comparator, ComparatorEnum, NaturalComparator, ReverseComparator, ReverseNoneIsLowerComparator,
};
use crate::column::ColumnType;
use crate::{DocId, Score};

/// The order to sort by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Ascending Order
    Asc,
    /// Descending Order
    #[default]
    Desc,
}

impl Order {
    /// return if the Order is ascending
    pub fn is_asc(&self) -> bool {
        self == &Order::Asc
    }
    /// return if the Order is descending
    pub fn is_desc(&self) -> bool {
        self == &Order::Desc
    }
}

/// What a [`SortField`] sorts on.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Relevance score, as computed by the scorer.
    Score,
    /// Global doc id, i.e. index order.
    DocId,
    /// A `u64` column.
    U64(String),
    /// An `i64` column.
    I64(String),
    /// A `f64` column.
    F64(String),
    /// A string column, compared lexicographically.
    Str(String),
}

impl SortBy {
    /// Name of the column backing this criterion, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            SortBy::Score | SortBy::DocId => None,
            SortBy::U64(field)
            | SortBy::I64(field)
            | SortBy::F64(field)
            | SortBy::Str(field) => Some(field),
        }
    }

    pub(crate) fn column_type(&self) -> Option<ColumnType> {
        match self {
            SortBy::Score | SortBy::DocId => None,
            SortBy::U64(_) => Some(ColumnType::U64),
            SortBy::I64(_) => Some(ColumnType::I64),
            SortBy::F64(_) => Some(ColumnType::F64),
            SortBy::Str(_) => Some(ColumnType::Str),
        }
    }
}

/// A sort criterion and its direction.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct SortField {
    /// What to sort on.
    pub by: SortBy,
    /// Direction of the sort.
    #[serde(default)]
    pub order: Order,
}

impl SortField {
    /// Creates a new sort field.
    pub fn new(by: SortBy, order: Order) -> SortField {
        SortField { by, order }
    }

    /// Sort by decreasing relevance score.
    pub fn score() -> SortField {
        SortField::new(SortBy::Score, Order::Desc)
    }

    /// Sort by increasing doc id.
    pub fn doc() -> SortField {
        SortField::new(SortBy::DocId, Order::Asc)
    }

    /// Sort by a `u64` column.
    pub fn u64(field: &str, order: Order) -> SortField {
        SortField::new(SortBy::U64(field.to_string()), order)
    }

    /// Sort by an `i64` column.
    pub fn i64(field: &str, order: Order) -> SortField {
        SortField::new(SortBy::I64(field.to_string()), order)
    }

    /// Sort by a `f64` column.
    pub fn f64(field: &str, order: Order) -> SortField {
        SortField::new(SortBy::F64(field.to_string()), order)
    }

    /// Sort by a string column.
    pub fn str(field: &str, order: Order) -> SortField {
        SortField::new(SortBy::Str(field.to_string()), order)
    }

    pub(crate) fn comparator(&self) -> ComparatorEnum {
        self.order.into()
    }

    /// Returns true if `value` is of the type produced by this criterion.
    pub fn accepts(&self, value: &SortValue) -> bool {
        matches!(
            (&self.by, value),
            (SortBy::Score, SortValue::Score(_))
                | (SortBy::DocId, SortValue::Doc(_))
                | (SortBy::U64(_), SortValue::U64(_))
                | (SortBy::I64(_), SortValue::I64(_))
                | (SortBy::F64(_), SortValue::F64(_))
                | (SortBy::Str(_), SortValue::Str(_))
        )
    }

    /// Compares two materialized values of this criterion.
    ///
    /// `Ordering::Greater` means that `lhs` ranks first.
    /// Values that this criterion does not accept compare as equal.
    pub fn compare_values(&self, lhs: &SortValue, rhs: &SortValue) -> Ordering {
        let comparator = self.comparator();
        match (lhs, rhs) {
            (SortValue::Score(lhs), SortValue::Score(rhs)) => comparator.compare(lhs, rhs),
            (SortValue::Doc(lhs), SortValue::Doc(rhs)) => comparator.compare(lhs, rhs),
            (SortValue::U64(lhs), SortValue::U64(rhs)) => comparator.compare(lhs, rhs),
            (SortValue::I64(lhs), SortValue::I64(rhs)) => comparator.compare(lhs, rhs),
            (SortValue::F64(lhs), SortValue::F64(rhs)) => comparator.compare(lhs, rhs),
            (SortValue::Str(lhs), SortValue::Str(rhs)) => comparator.compare(lhs, rhs),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = if self.order.is_asc() { "asc" } else { "desc" };
        match &self.by {
            SortBy::Score => write!(f, "_score {order}"),
            SortBy::DocId => write!(f, "_doc {order}"),
            SortBy::U64(field) | SortBy::I64(field) | SortBy::F64(field) | SortBy::Str(field) => {
                write!(f, "{field} {order}")
            }
        }
    }
}

/// The value of a sort criterion for a given document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SortValue {
    /// Relevance score.
    Score(Score),
    /// Global doc id.
    Doc(DocId),
    /// Value of a `u64` column.
    U64(Option<u64>),
    /// Value of an `i64` column.
    I64(Option<i64>),
    /// Value of a `f64` column.
    F64(Option<f64>),
    /// Value of a string column.
    Str(Option<String>),
}

/// An ordered, non-empty, list of sort criteria.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(transparent)]
pub struct Sort(Vec<SortField>);

impl Sort {
    /// Creates a new sort.
    ///
    /// Emptiness is checked when the sort is handed to a collector.
    pub fn new(fields: Vec<SortField>) -> Sort {
        Sort(fields)
    }

    /// Sort by decreasing relevance score.
    pub fn by_score() -> Sort {
        Sort::new(vec![SortField::score()])
    }

    /// Sort by increasing doc id.
    pub fn by_doc() -> Sort {
        Sort::new(vec![SortField::doc()])
    }

    /// Sort criteria, from the most significant to the least significant.
    pub fn fields(&self) -> &[SortField] {
        &self.0
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true iff one of the criteria is the relevance score.
    pub fn requires_scoring(&self) -> bool {
        self.0.iter().any(|field| field.by == SortBy::Score)
    }

    /// Returns true if `self` is a prefix of `other`, criterion by criterion.
    pub fn is_prefix_of(&self, other: &Sort) -> bool {
        self.len() <= other.len() && self.0.iter().zip(other.0.iter()).all(|(lhs, rhs)| lhs == rhs)
    }

    /// Returns an error if `values` cannot be the sort values of a document
    /// for this sort.
    pub fn check_values(&self, values: &[SortValue]) -> crate::Result<()> {
        if values.len() != self.len() {
            return Err(crate::TopKError::InvalidArgument(format!(
                "expected {} sort values, got {}",
                self.len(),
                values.len()
            )));
        }
        for (field, value) in self.0.iter().zip(values) {
            if !field.accepts(value) {
                return Err(crate::TopKError::InvalidArgument(format!(
                    "sort value {value:?} does not match sort field `{field}`"
                )));
            }
        }
        Ok(())
    }

    /// Compares two documents by their sort values, then by their doc ids.
    ///
    /// `Ordering::Greater` means that the left document ranks first.
    pub fn compare_docs(
        &self,
        (lhs_values, lhs_doc): (&[SortValue], DocId),
        (rhs_values, rhs_doc): (&[SortValue], DocId),
    ) -> Ordering {
        self.0
            .iter()
            .zip(lhs_values.iter().zip(rhs_values))
            .map(|(field, (lhs, rhs))| field.compare_values(lhs, rhs))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| rhs_doc.cmp(&lhs_doc))
    }
}

impl From<SortField> for Sort {
    fn from(field: SortField) -> Sort {
        Sort::new(vec![field])
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ord, field) in self.0.iter().enumerate() {
            if ord > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        assert!(Order::Asc.is_asc());
        assert!(Order::Desc.is_desc());
        assert_eq!(Order::default(), Order::Desc);
    }

    #[test]
    fn test_sort_requires_scoring() {
        assert!(Sort::by_score().requires_scoring());
        assert!(!Sort::by_doc().requires_scoring());
        let sort = Sort::new(vec![SortField::u64("price", Order::Asc), SortField::score()]);
        assert!(sort.requires_scoring());
    }

    #[test]
    fn test_sort_prefix() {
        let index_sort = Sort::new(vec![
            SortField::i64("timestamp", Order::Desc),
            SortField::str("title", Order::Asc),
        ]);
        assert!(Sort::from(SortField::i64("timestamp", Order::Desc)).is_prefix_of(&index_sort));
        assert!(index_sort.is_prefix_of(&index_sort));
        assert!(!Sort::from(SortField::i64("timestamp", Order::Asc)).is_prefix_of(&index_sort));
        assert!(!Sort::from(SortField::str("title", Order::Asc)).is_prefix_of(&index_sort));
    }

    #[test]
    fn test_check_values() {
        let sort = Sort::new(vec![SortField::u64("price", Order::Asc), SortField::score()]);
        assert!(sort
            .check_values(&[SortValue::U64(None), SortValue::Score(1.0)])
            .is_ok());
        assert!(sort.check_values(&[SortValue::U64(None)]).is_err());
        assert!(sort
            .check_values(&[SortValue::I64(Some(1)), SortValue::Score(1.0)])
            .is_err());
    }

    #[test]
    fn test_compare_docs_breaks_ties_by_doc_id() {
        let sort = Sort::new(vec![SortField::u64("price", Order::Asc)]);
        let cheap = [SortValue::U64(Some(1))];
        let expensive = [SortValue::U64(Some(5))];
        let missing = [SortValue::U64(None)];
        assert_eq!(
            sort.compare_docs((&cheap[..], 10), (&expensive[..], 1)),
            Ordering::Greater
        );
        assert_eq!(
            sort.compare_docs((&expensive[..], 10), (&missing[..], 1)),
            Ordering::Greater
        );
        assert_eq!(sort.compare_docs((&cheap[..], 1), (&cheap[..], 2)), Ordering::Greater);
    }

    #[test]
    fn test_sort_serialization() {
        let sort = Sort::new(vec![SortField::score(), SortField::f64("rating", Order::Asc)]);
        let json = serde_json::to_string(&sort).unwrap();
        assert_eq!(
            json,
            r#"[{"by":"score","order":"desc"},{"by":{"f64":"rating"},"order":"asc"}]"#
        );
        let deser: Sort = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, sort);
        assert_eq!(sort.to_string(), "_score desc, rating asc");
    }
}
