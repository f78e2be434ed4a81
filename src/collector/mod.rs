/*!
Defines how the documents matching a search query should be processed.

Collectors work on one segment at a time: for every segment, the [`Collector`] builds a
[`SegmentCollector`], which is pushed the matching documents of the segment in increasing
doc id order. The partial results ("fruits") of every segment are finally merged by
[`Collector::merge_fruits`].

This crate's main collector is the [`TopFieldCollector`], which keeps the top `K`
documents under a multi-field [`Sort`].
*/

mod early_termination;
mod field_comparator;
mod hit_queue;
mod sort_key;
mod top_field_collector;
mod top_field_docs;
mod top_field_settings;

pub use self::early_termination::{can_early_terminate, prorate_for_segment, TrailingHitsPolicy};
pub use self::field_comparator::FieldComparatorChain;
pub use self::hit_queue::{Entry, HitQueue, SlotCompare};
pub use self::sort_key::{
    Comparator, ComparatorEnum, NaturalComparator, Order, ReverseComparator,
    ReverseNoneIsLowerComparator, Sort, SortBy, SortField, SortValue,
};
pub use self::top_field_collector::{
    PagingFieldCollector, SimpleFieldCollector, TopFieldCollector, TopFieldSegmentCollector,
};
pub use self::top_field_docs::{FieldDoc, HitCount, Relation, TopFieldDocs};
pub use self::top_field_settings::TopFieldSettings;
use crate::docset::TERMINATED;
use crate::index::SegmentContext;
use crate::query::{Scorer, Weight};
use crate::{DocId, Score};

/// Tells the driving loop whether the segment collector wants more documents.
///
/// Stopping is not an error: the partial result of the segment is kept.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CollectControl {
    /// Keep feeding documents.
    Continue,
    /// Stop feeding documents of this segment.
    Stop,
}

/// Collectors are in charge of collecting and retaining relevant
/// information from the document found and scored by the query.
///
/// For instance,
///
/// - keeping track of the top 10 best documents
/// - computing the number of documents matching the query
///
/// Our search engine works by processing the segments independently,
/// possibly on different threads. A collector is therefore a factory of
/// [`SegmentCollector`]s, and knows how to merge their fruits.
pub trait Collector: Sync + Send {
    /// `Fruit` is the type for the result of our collection.
    type Fruit: Send + 'static;

    /// Type of the `SegmentCollector` associated with this collector.
    type Child: SegmentCollector<Fruit = Self::Fruit>;

    /// `for_segment` is called for each segment, before beginning to enumerate
    /// its matching documents.
    fn for_segment(&self, segment: &SegmentContext) -> crate::Result<Self::Child>;

    /// Returns true iff the collector requires to compute scores for documents.
    fn requires_scoring(&self) -> bool;

    /// Combines the fruit associated with the collection of each segment
    /// into one fruit.
    fn merge_fruits(&self, segment_fruits: Vec<Self::Fruit>) -> crate::Result<Self::Fruit>;

    /// Creates all of the required objects and collects the matching documents of
    /// a single segment.
    fn collect_segment(
        &self,
        weight: &dyn Weight,
        segment: &SegmentContext,
    ) -> crate::Result<Self::Fruit> {
        let mut segment_collector = self.for_segment(segment)?;
        let mut scorer = weight.scorer(segment)?;
        drive_scorer(
            &mut segment_collector,
            scorer.as_mut(),
            self.requires_scoring(),
        );
        Ok(segment_collector.harvest())
    }
}

/// The `SegmentCollector` is the trait in charge of defining the
/// collect operation at the scale of the segment.
///
/// `.collect(doc, score)` is called for each document matching
/// the query, in increasing doc id order.
pub trait SegmentCollector {
    /// `Fruit` is the type for the result of our collection.
    type Fruit: Send + 'static;

    /// The query pushes the scored document to the collector via this method.
    fn collect(&mut self, doc: DocId, score: Score) -> CollectControl;

    /// Lowest score a document must reach to be worth collecting, if known.
    ///
    /// The driving loop forwards it to the scorer whenever it changes.
    fn min_competitive_score(&self) -> Option<Score> {
        None
    }

    /// Extract the fruit of the collection from the `SegmentCollector`.
    fn harvest(self) -> Self::Fruit;
}

/// Pushes the documents of `scorer` to `segment_collector` until either side is done.
///
/// Returns `CollectControl::Stop` if the segment collector terminated early.
/// When `requires_scoring` is false, documents are pushed with a constant score.
pub fn drive_scorer<C: SegmentCollector + ?Sized>(
    segment_collector: &mut C,
    scorer: &mut dyn Scorer,
    requires_scoring: bool,
) -> CollectControl {
    let mut min_competitive_score = segment_collector.min_competitive_score();
    if let Some(min_score) = min_competitive_score {
        scorer.set_min_competitive_score(min_score);
    }
    let mut doc = scorer.doc();
    while doc != TERMINATED {
        let score = if requires_scoring { scorer.score() } else { 1.0 };
        if segment_collector.collect(doc, score) == CollectControl::Stop {
            return CollectControl::Stop;
        }
        let new_min_competitive_score = segment_collector.min_competitive_score();
        if new_min_competitive_score != min_competitive_score {
            if let Some(min_score) = new_min_competitive_score {
                scorer.set_min_competitive_score(min_score);
            }
            min_competitive_score = new_min_competitive_score;
        }
        doc = scorer.advance();
    }
    CollectControl::Continue
}
