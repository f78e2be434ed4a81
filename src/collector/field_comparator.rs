//! Comparator chain over slot-indexed sort values.
//!
//! Every sort criterion owns an arena of `num_slots` values. The [`HitQueue`] only
//! refers to candidates through their slot index, and the chain is the only owner
//! of the values.
//!
//! [`HitQueue`]: super::HitQueue

use std::cmp::Ordering;
use std::sync::Arc;

use super::hit_queue::SlotCompare;
use super::sort_key::{Comparator, ComparatorEnum, Sort, SortBy, SortField, SortValue};
use crate::column::{Column, DynamicColumn};
use crate::index::SegmentContext;
use crate::{DocId, Score, TopKError};

/// A value that can be held in a comparator slot.
trait SlotValue: Clone + Default + Send + Sync + 'static {
    fn to_sort_value(&self) -> SortValue;

    fn from_sort_value(value: &SortValue) -> Option<Self>;
}

impl SlotValue for Score {
    fn to_sort_value(&self) -> SortValue {
        SortValue::Score(*self)
    }

    fn from_sort_value(value: &SortValue) -> Option<Self> {
        match value {
            SortValue::Score(score) => Some(*score),
            _ => None,
        }
    }
}

impl SlotValue for DocId {
    fn to_sort_value(&self) -> SortValue {
        SortValue::Doc(*self)
    }

    fn from_sort_value(value: &SortValue) -> Option<Self> {
        match value {
            SortValue::Doc(doc) => Some(*doc),
            _ => None,
        }
    }
}

macro_rules! column_slot_value {
    ($typ:ty, $variant:ident) => {
        impl SlotValue for Option<$typ> {
            fn to_sort_value(&self) -> SortValue {
                SortValue::$variant(self.clone())
            }

            fn from_sort_value(value: &SortValue) -> Option<Self> {
                match value {
                    SortValue::$variant(val) => Some(val.clone()),
                    _ => None,
                }
            }
        }

        impl ColumnValue for $typ {
            fn downcast(column: DynamicColumn) -> Option<Arc<dyn Column<$typ>>> {
                match column {
                    DynamicColumn::$variant(column) => Some(column),
                    _ => None,
                }
            }
        }
    };
}

/// A value type that can be read out of a [`DynamicColumn`].
trait ColumnValue: Sized + Send + Sync + 'static {
    fn downcast(column: DynamicColumn) -> Option<Arc<dyn Column<Self>>>;
}

column_slot_value!(u64, U64);
column_slot_value!(i64, I64);
column_slot_value!(f64, F64);
column_slot_value!(String, Str);

/// Reads the value of a criterion for a document of the current segment.
trait ValueReader<T>: Send + Sync {
    fn read(&self, doc: DocId, score: Score) -> T;

    fn set_segment(&mut self, _segment: &SegmentContext) -> crate::Result<()> {
        Ok(())
    }
}

struct ScoreReader;

impl ValueReader<Score> for ScoreReader {
    #[inline]
    fn read(&self, _doc: DocId, score: Score) -> Score {
        score
    }
}

#[derive(Default)]
struct GlobalDocReader {
    doc_base: DocId,
}

impl ValueReader<DocId> for GlobalDocReader {
    #[inline]
    fn read(&self, doc: DocId, _score: Score) -> DocId {
        self.doc_base + doc
    }

    fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        self.doc_base = segment.doc_base;
        Ok(())
    }
}

struct ColumnReader<T> {
    field: SortField,
    column: Option<Arc<dyn Column<T>>>,
}

impl<T> ColumnReader<T> {
    fn new(field: &SortField) -> ColumnReader<T> {
        ColumnReader {
            field: field.clone(),
            column: None,
        }
    }
}

impl<T: ColumnValue> ValueReader<Option<T>> for ColumnReader<T> {
    #[inline]
    fn read(&self, doc: DocId, _score: Score) -> Option<T> {
        self.column.as_ref()?.first(doc)
    }

    fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        let Some(field_name) = self.field.by.field_name() else {
            return Ok(());
        };
        self.column = match segment.reader.column(field_name) {
            Some(dynamic_column) => {
                let column_type = dynamic_column.column_type();
                let column = T::downcast(dynamic_column).ok_or_else(|| {
                    let expected = self
                        .field
                        .by
                        .column_type()
                        .map(|expected| expected.to_string())
                        .unwrap_or_default();
                    TopKError::SchemaError(format!(
                        "cannot sort by `{}`: expected a {} column, segment {} stores a {} column",
                        self.field, expected, segment.segment_ord, column_type
                    ))
                })?;
                Some(column)
            }
            None => None,
        };
        Ok(())
    }
}

/// The values of one sort criterion, for every slot.
struct SlotComparator<T, R> {
    slots: Vec<T>,
    bottom: T,
    top: T,
    comparator: ComparatorEnum,
    reader: R,
}

impl<T, R> SlotComparator<T, R>
where
    T: SlotValue,
    R: ValueReader<T>,
    ComparatorEnum: Comparator<T>,
{
    fn new(num_slots: usize, comparator: ComparatorEnum, reader: R) -> Self {
        SlotComparator {
            slots: vec![T::default(); num_slots],
            bottom: T::default(),
            top: T::default(),
            comparator,
            reader,
        }
    }

    #[inline]
    fn compare(&self, lhs_slot: usize, rhs_slot: usize) -> Ordering {
        self.comparator
            .compare(&self.slots[lhs_slot], &self.slots[rhs_slot])
    }

    #[inline]
    fn copy(&mut self, slot: usize, doc: DocId, score: Score) {
        self.slots[slot] = self.reader.read(doc, score);
    }

    fn set_bottom(&mut self, slot: usize) {
        self.bottom = self.slots[slot].clone();
    }

    #[inline]
    fn compare_bottom(&self, doc: DocId, score: Score) -> Ordering {
        let value = self.reader.read(doc, score);
        self.comparator.compare(&value, &self.bottom)
    }

    fn set_top_value(&mut self, value: &SortValue) -> bool {
        match T::from_sort_value(value) {
            Some(top) => {
                self.top = top;
                true
            }
            None => false,
        }
    }

    #[inline]
    fn compare_top(&self, doc: DocId, score: Score) -> Ordering {
        let value = self.reader.read(doc, score);
        self.comparator.compare(&value, &self.top)
    }

    fn value(&self, slot: usize) -> SortValue {
        self.slots[slot].to_sort_value()
    }
}

/// Comparator of a single sort criterion.
///
/// The set of criteria is closed, hence an enum rather than a trait object.
enum FieldComparator {
    Score(SlotComparator<Score, ScoreReader>),
    Doc(SlotComparator<DocId, GlobalDocReader>),
    U64(SlotComparator<Option<u64>, ColumnReader<u64>>),
    I64(SlotComparator<Option<i64>, ColumnReader<i64>>),
    F64(SlotComparator<Option<f64>, ColumnReader<f64>>),
    Str(SlotComparator<Option<String>, ColumnReader<String>>),
}

macro_rules! dispatch {
    ($comparator:expr, $slots:ident => $body:expr) => {
        match $comparator {
            FieldComparator::Score($slots) => $body,
            FieldComparator::Doc($slots) => $body,
            FieldComparator::U64($slots) => $body,
            FieldComparator::I64($slots) => $body,
            FieldComparator::F64($slots) => $body,
            FieldComparator::Str($slots) => $body,
        }
    };
}

impl FieldComparator {
    fn new(field: &SortField, num_slots: usize) -> FieldComparator {
        let comparator = field.comparator();
        match &field.by {
            SortBy::Score => {
                FieldComparator::Score(SlotComparator::new(num_slots, comparator, ScoreReader))
            }
            SortBy::DocId => FieldComparator::Doc(SlotComparator::new(
                num_slots,
                comparator,
                GlobalDocReader::default(),
            )),
            SortBy::U64(_) => FieldComparator::U64(SlotComparator::new(
                num_slots,
                comparator,
                ColumnReader::new(field),
            )),
            SortBy::I64(_) => FieldComparator::I64(SlotComparator::new(
                num_slots,
                comparator,
                ColumnReader::new(field),
            )),
            SortBy::F64(_) => FieldComparator::F64(SlotComparator::new(
                num_slots,
                comparator,
                ColumnReader::new(field),
            )),
            SortBy::Str(_) => FieldComparator::Str(SlotComparator::new(
                num_slots,
                comparator,
                ColumnReader::new(field),
            )),
        }
    }

    fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        dispatch!(self, slots => slots.reader.set_segment(segment))
    }

    fn compare(&self, lhs_slot: usize, rhs_slot: usize) -> Ordering {
        dispatch!(self, slots => slots.compare(lhs_slot, rhs_slot))
    }

    fn copy(&mut self, slot: usize, doc: DocId, score: Score) {
        dispatch!(self, slots => slots.copy(slot, doc, score))
    }

    fn set_bottom(&mut self, slot: usize) {
        dispatch!(self, slots => slots.set_bottom(slot))
    }

    fn compare_bottom(&self, doc: DocId, score: Score) -> Ordering {
        dispatch!(self, slots => slots.compare_bottom(doc, score))
    }

    fn set_top_value(&mut self, value: &SortValue) -> bool {
        dispatch!(self, slots => slots.set_top_value(value))
    }

    fn compare_top(&self, doc: DocId, score: Score) -> Ordering {
        dispatch!(self, slots => slots.compare_top(doc, score))
    }

    fn value(&self, slot: usize) -> SortValue {
        dispatch!(self, slots => slots.value(slot))
    }
}

/// Total order over the candidates of a top-k search, for a given [`Sort`].
///
/// The chain compares criteria left to right, and stops at the first one that
/// tells the two documents apart. Ties are *not* broken here: the caller is in
/// charge of ranking equal documents by doc id.
///
/// For all comparison methods, `Ordering::Greater` means that the left-hand
/// side ranks first.
pub struct FieldComparatorChain {
    comparators: Vec<FieldComparator>,
}

impl FieldComparatorChain {
    /// Creates a chain able to hold the sort values of `num_slots` candidates.
    pub fn new(sort: &Sort, num_slots: usize) -> FieldComparatorChain {
        let comparators = sort
            .fields()
            .iter()
            .map(|field| FieldComparator::new(field, num_slots))
            .collect();
        FieldComparatorChain { comparators }
    }

    /// Binds the chain to a new segment.
    ///
    /// Values already copied into slots are kept.
    pub fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        for comparator in &mut self.comparators {
            comparator.set_segment(segment)?;
        }
        Ok(())
    }

    /// Compares the candidates held in two slots.
    pub fn compare(&self, lhs_slot: usize, rhs_slot: usize) -> Ordering {
        chain(
            self.comparators
                .iter()
                .map(|comparator| comparator.compare(lhs_slot, rhs_slot)),
        )
    }

    /// Copies the sort values of `doc` into `slot`.
    pub fn copy(&mut self, slot: usize, doc: DocId, score: Score) {
        for comparator in &mut self.comparators {
            comparator.copy(slot, doc, score);
        }
    }

    /// Records the values of `slot` as the reference for [`Self::compare_bottom`].
    pub fn set_bottom(&mut self, slot: usize) {
        for comparator in &mut self.comparators {
            comparator.set_bottom(slot);
        }
    }

    /// Compares a document of the current segment to the bottom reference.
    pub fn compare_bottom(&self, doc: DocId, score: Score) -> Ordering {
        chain(
            self.comparators
                .iter()
                .map(|comparator| comparator.compare_bottom(doc, score)),
        )
    }

    /// Records the sort values of the last document of the previous page.
    pub fn set_top_values(&mut self, values: &[SortValue]) -> crate::Result<()> {
        if values.len() != self.comparators.len() {
            return Err(TopKError::InvalidArgument(format!(
                "after has {} sort values but sort has {} fields",
                values.len(),
                self.comparators.len()
            )));
        }
        for (comparator, value) in self.comparators.iter_mut().zip(values) {
            if !comparator.set_top_value(value) {
                return Err(TopKError::InvalidArgument(format!(
                    "unexpected sort value {value:?} in after"
                )));
            }
        }
        Ok(())
    }

    /// Compares a document of the current segment to the top values.
    pub fn compare_top(&self, doc: DocId, score: Score) -> Ordering {
        chain(
            self.comparators
                .iter()
                .map(|comparator| comparator.compare_top(doc, score)),
        )
    }

    /// Returns the sort values held in `slot`.
    pub fn sort_values(&self, slot: usize) -> Vec<SortValue> {
        self.comparators
            .iter()
            .map(|comparator| comparator.value(slot))
            .collect()
    }
}

impl SlotCompare for FieldComparatorChain {
    #[inline]
    fn compare_slots(&self, lhs: usize, rhs: usize) -> Ordering {
        self.compare(lhs, rhs)
    }
}

#[inline]
fn chain(mut orderings: impl Iterator<Item = Ordering>) -> Ordering {
    orderings
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}
