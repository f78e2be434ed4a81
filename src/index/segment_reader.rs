use std::fmt;
use std::sync::Arc;

use crate::collector::Sort;
use crate::column::DynamicColumn;
use crate::{DocId, SegmentOrdinal};

/// Entry point to access the data of a segment that the collector requires.
///
/// Implementations are expected to be cheap to query: `column` is called once per sort
/// field and per segment, and the returned column once per collected document.
pub trait SegmentReader: Send + Sync {
    /// Returns the highest document id ever attributed in
    /// this segment + 1.
    fn max_doc(&self) -> DocId;

    /// Returns the number of alive documents.
    fn num_docs(&self) -> DocId {
        self.max_doc()
    }

    /// Returns the order in which documents are stored in this segment, if any.
    ///
    /// When the requested sort is a prefix of this order, collection can stop as soon as
    /// a document fails to enter the top-k.
    fn sort_by(&self) -> Option<&Sort> {
        None
    }

    /// Returns the column associated to `field_name`.
    ///
    /// `None` means that no document of this segment has a value for the field.
    fn column(&self, field_name: &str) -> Option<DynamicColumn>;
}

/// Position of a segment within the searched index.
#[derive(Clone)]
pub struct SegmentContext {
    /// Ordinal of the segment within the searcher.
    pub segment_ord: SegmentOrdinal,
    /// Offset to add to segment-local doc ids to obtain global doc ids.
    pub doc_base: DocId,
    /// Sum of the `num_docs` of all of the segments of the index.
    pub total_num_docs: u64,
    /// Reader of the segment.
    pub reader: Arc<dyn SegmentReader>,
}

impl SegmentContext {
    /// Creates the context of a segment.
    pub fn new(
        segment_ord: SegmentOrdinal,
        doc_base: DocId,
        total_num_docs: u64,
        reader: Arc<dyn SegmentReader>,
    ) -> SegmentContext {
        SegmentContext {
            segment_ord,
            doc_base,
            total_num_docs,
            reader,
        }
    }

    /// Context for an index made of a single segment.
    pub fn single(reader: Arc<dyn SegmentReader>) -> SegmentContext {
        let total_num_docs = u64::from(reader.num_docs());
        SegmentContext::new(0, 0, total_num_docs, reader)
    }

    /// Number of documents in the segment.
    pub fn max_doc(&self) -> DocId {
        self.reader.max_doc()
    }

    /// Storage order of the segment's documents.
    pub fn index_sort(&self) -> Option<&Sort> {
        self.reader.sort_by()
    }
}

impl fmt::Debug for SegmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentContext")
            .field("segment_ord", &self.segment_ord)
            .field("doc_base", &self.doc_base)
            .field("max_doc", &self.max_doc())
            .field("total_num_docs", &self.total_num_docs)
            .finish()
    }
}
