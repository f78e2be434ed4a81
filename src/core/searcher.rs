use std::fmt;
use std::sync::Arc;

use crate::collector::{
    drive_scorer, Collector, SegmentCollector, TopFieldCollector, TopFieldDocs,
    TopFieldSegmentCollector,
};
use crate::core::Executor;
use crate::index::{SegmentContext, SegmentReader};
use crate::query::Weight;
use crate::{DocId, SegmentOrdinal};

/// Holds a list of `SegmentReader`s ready for search.
///
/// Segments are ordered: the global doc id of a document is its segment-local doc id,
/// plus the sum of the `max_doc` of all of the segments before it.
#[derive(Clone)]
pub struct Searcher {
    segment_readers: Vec<Arc<dyn SegmentReader>>,
}

impl Searcher {
    /// Creates a searcher over the given segments.
    pub fn new(segment_readers: Vec<Arc<dyn SegmentReader>>) -> Searcher {
        Searcher { segment_readers }
    }

    /// Return the list of segment readers
    pub fn segment_readers(&self) -> &[Arc<dyn SegmentReader>] {
        &self.segment_readers
    }

    /// Returns the overall number of live documents.
    pub fn num_docs(&self) -> u64 {
        self.segment_readers
            .iter()
            .map(|segment_reader| u64::from(segment_reader.num_docs()))
            .sum::<u64>()
    }

    /// Returns the context of every segment, in order.
    pub fn segment_contexts(&self) -> Vec<SegmentContext> {
        let total_num_docs = self.num_docs();
        let mut doc_base: DocId = 0;
        let mut segment_contexts = Vec::with_capacity(self.segment_readers.len());
        for (segment_ord, segment_reader) in self.segment_readers.iter().enumerate() {
            segment_contexts.push(SegmentContext::new(
                segment_ord as SegmentOrdinal,
                doc_base,
                total_num_docs,
                segment_reader.clone(),
            ));
            doc_base += segment_reader.max_doc();
        }
        segment_contexts
    }

    /// Runs a query on the segment readers wrapped by the searcher.
    ///
    /// Search works as follows :
    ///
    ///  First the weight object associated to the query is created.
    ///
    ///  Then, the query loops over the segments and for each segment :
    ///  - setup the collector and informs it that the segment being processed has changed.
    ///  - creates a SegmentCollector for collecting documents associated to the segment
    ///  - creates a `Scorer` object associated for this segment
    ///  - iterate through the matched documents and push them to the segment collector.
    ///
    ///  Finally, the Collector merges each of the child collectors into itself for result
    ///  usability by the caller.
    pub fn search<C: Collector>(&self, weight: &dyn Weight, collector: &C) -> crate::Result<C::Fruit> {
        self.search_with_executor(weight, collector, &Executor::single_thread())
    }

    /// Same as [`search(...)`](Searcher::search) but multithreaded.
    ///
    /// The current implementation is rather naive :
    /// multithreading is by splitting search into as many task
    /// as there are segments.
    ///
    /// It is powerless at making search faster if your index consists in
    /// one large segment.
    ///
    /// Also, keep in my multithreading a single query on several
    /// threads will not improve your throughput. It can actually
    /// hurt it. It will however, decrease the average response time.
    pub fn search_with_executor<C: Collector>(
        &self,
        weight: &dyn Weight,
        collector: &C,
        executor: &Executor,
    ) -> crate::Result<C::Fruit> {
        let segment_contexts = self.segment_contexts();
        let fruits = executor.map(
            |segment| collector.collect_segment(weight, &segment),
            segment_contexts.into_iter(),
        )?;
        collector.merge_fruits(fruits)
    }

    /// Runs a top field search with a single segment collector visiting every segment
    /// in order.
    ///
    /// Unlike [`search`](Searcher::search), the candidates collected in a segment
    /// filter the documents of the following segments. This is where prorated early
    /// termination pays off: once the queue is full, a segment only gets its share of the
    /// top `K` budget.
    pub fn search_sequential(
        &self,
        weight: &dyn Weight,
        collector: &TopFieldCollector,
    ) -> crate::Result<TopFieldDocs> {
        let requires_scoring = collector.requires_scoring();
        let mut segment_collector: Option<TopFieldSegmentCollector> = None;
        for segment in self.segment_contexts() {
            if let Some(segment_collector) = segment_collector.as_mut() {
                segment_collector.set_segment(&segment)?;
            } else {
                segment_collector = Some(collector.for_segment(&segment)?);
            }
            let mut scorer = weight.scorer(&segment)?;
            if let Some(segment_collector) = segment_collector.as_mut() {
                drive_scorer(segment_collector, scorer.as_mut(), requires_scoring);
            }
        }
        let fruits = segment_collector
            .map(|segment_collector| vec![segment_collector.harvest()])
            .unwrap_or_default();
        collector.merge_fruits(fruits)
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let max_docs: Vec<DocId> = self
            .segment_readers
            .iter()
            .map(|segment_reader| segment_reader.max_doc())
            .collect();
        write!(f, "Searcher({max_docs:?})")
    }
}
