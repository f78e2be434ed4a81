use std::fmt;

use super::early_termination::{can_early_terminate, prorate_for_segment, TrailingHitsPolicy};
use super::field_comparator::FieldComparatorChain;
use super::hit_queue::{Entry, HitQueue};
use super::sort_key::{Sort, SortBy};
use super::top_field_docs::{FieldDoc, HitCount, Relation, TopFieldDocs};
use super::top_field_settings::TopFieldSettings;
use super::{CollectControl, Collector, SegmentCollector};
use crate::index::SegmentContext;
use crate::{DocId, Score, SegmentOrdinal, TopKError};

/// The `TopFieldCollector` keeps track of the top `K` documents under an
/// arbitrary [`Sort`].
///
/// The implementation is based on a bounded binary heap of slots, and a chain
/// of per-field comparators owning the sort values of each slot.
/// The theoretical complexity for collecting the top `K` out of `n` documents
/// is `O(n log K)`.
///
/// Documents that are equal on every sort field are ranked by ascending global doc id.
/// As such, it is suitable to implement pagination: passing the last hit of a page as
/// `after` returns the next page.
///
/// Besides, the collector can stop collecting a segment before its last matching
/// document:
/// - when segment documents are stored in an order compatible with the sort
///   (see [`can_early_terminate`](super::can_early_terminate)),
/// - when a `per_segment_margin` is set, after a statistically safe share of the
///   top `K` has been collected in the segment,
/// - when sorting by descending score with a `total_hits_threshold`, the scorer is
///   told which scores are no longer competitive.
///
/// In all cases, the hit count of the result is then a lower bound.
#[derive(Clone)]
pub struct TopFieldCollector {
    sort: Sort,
    limit: usize,
    offset: usize,
    after: Option<FieldDoc>,
    total_hits_threshold: Option<usize>,
    per_segment_margin: Option<f64>,
    trailing_hits: TrailingHitsPolicy,
}

impl fmt::Debug for TopFieldCollector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TopFieldCollector(sort=[{}], limit={}, offset={})",
            self.sort, self.limit, self.offset
        )
    }
}

impl TopFieldCollector {
    /// Creates a top field collector.
    ///
    /// - `limit` is the number of hits to return,
    /// - `after` restricts the collection to the documents ranked strictly after it,
    /// - `total_hits_threshold` is the number of hits to count exactly. `None` counts them all.
    /// - `per_segment_margin` enables prorated early termination, with a margin of this
    ///   many standard deviations. `None` disables it. Proration also requires a
    ///   `total_hits_threshold`: without one, the per-segment budget is unbounded.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if the sort is empty, if `limit` is 0, if the
    /// margin is negative or NaN, or if the sort values of `after` do not match the sort.
    pub fn create(
        sort: Sort,
        limit: usize,
        after: Option<FieldDoc>,
        total_hits_threshold: Option<usize>,
        per_segment_margin: Option<f64>,
    ) -> crate::Result<TopFieldCollector> {
        if sort.fields().is_empty() {
            return Err(TopKError::InvalidArgument(
                "Sort must contain at least one field".to_string(),
            ));
        }
        if limit == 0 {
            return Err(TopKError::InvalidArgument(
                "Limit must be strictly greater than 0.".to_string(),
            ));
        }
        if let Some(margin) = per_segment_margin {
            if margin.is_nan() || margin < 0.0 {
                return Err(TopKError::InvalidArgument(format!(
                    "per_segment_margin must be >= 0, got {margin}"
                )));
            }
        }
        if let Some(after) = &after {
            sort.check_values(&after.sort_values)?;
        }
        Ok(TopFieldCollector {
            sort,
            limit,
            offset: 0,
            after,
            total_hits_threshold,
            per_segment_margin,
            trailing_hits: TrailingHitsPolicy::default(),
        })
    }

    /// Creates a top field collector out of its settings.
    pub fn with_settings(
        sort: Sort,
        settings: &TopFieldSettings,
        after: Option<FieldDoc>,
    ) -> crate::Result<TopFieldCollector> {
        let collector = TopFieldCollector::create(
            sort,
            settings.limit,
            after,
            settings.total_hits_threshold,
            settings.per_segment_margin,
        )?;
        Ok(collector
            .and_offset(settings.offset)
            .with_trailing_hits(settings.trailing_hits))
    }

    /// Skip the first "offset" documents when collecting.
    ///
    /// This is equivalent to `OFFSET` in MySQL or PostgreSQL and `start` in
    /// Lucene's TopDocsCollector.
    #[must_use]
    pub fn and_offset(mut self, offset: usize) -> TopFieldCollector {
        self.offset = offset;
        self
    }

    /// Sets what happens to the hits of a segment once they can no longer be competitive.
    #[must_use]
    pub fn with_trailing_hits(mut self, trailing_hits: TrailingHitsPolicy) -> TopFieldCollector {
        self.trailing_hits = trailing_hits;
        self
    }

    /// Sort of the collected documents.
    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of candidates each segment collector keeps.
    ///
    /// Segment collectors never keep more candidates than there are documents in the index.
    pub fn num_hits(&self) -> usize {
        self.limit.saturating_add(self.offset)
    }

    fn can_set_min_score(&self) -> bool {
        let first_field = &self.sort.fields()[0];
        first_field.by == SortBy::Score
            && first_field.order.is_desc()
            && self.total_hits_threshold.is_some()
    }

    fn new_state(&self, segment: &SegmentContext) -> crate::Result<FieldCollectorState> {
        // There cannot be more hits than documents in the index.
        let num_docs = usize::try_from(segment.total_num_docs).unwrap_or(usize::MAX);
        let num_hits = self.num_hits().min(num_docs.max(1));
        let mut chain = FieldComparatorChain::new(&self.sort, num_hits);
        if let Some(after) = &self.after {
            chain.set_top_values(&after.sort_values)?;
        }
        Ok(FieldCollectorState {
            sort: self.sort.clone(),
            chain,
            queue: HitQueue::with_capacity(num_hits),
            requires_scoring: self.sort.requires_scoring(),
            total_hits: 0,
            relation: Relation::Exact,
            total_hits_threshold: self.total_hits_threshold.unwrap_or(usize::MAX),
            per_segment_margin: if self.after.is_some() {
                None
            } else {
                self.per_segment_margin
            },
            trailing_hits: self.trailing_hits,
            can_set_min_score: self.can_set_min_score(),
            min_competitive_score: None,
            segment_ord: 0,
            doc_base: 0,
            can_early_terminate: false,
            leaf_hits: 0,
            leaf_hits_threshold: usize::MAX,
            collected_all_competitive_hits: false,
            last_doc: None,
        })
    }
}

impl Collector for TopFieldCollector {
    type Fruit = TopFieldDocs;

    type Child = TopFieldSegmentCollector;

    fn for_segment(&self, segment: &SegmentContext) -> crate::Result<TopFieldSegmentCollector> {
        let state = self.new_state(segment)?;
        let mut segment_collector = match &self.after {
            None => TopFieldSegmentCollector::Simple(SimpleFieldCollector { state }),
            Some(after) => TopFieldSegmentCollector::Paging(PagingFieldCollector {
                state,
                after_doc: after.doc,
            }),
        };
        segment_collector.set_segment(segment)?;
        Ok(segment_collector)
    }

    fn requires_scoring(&self) -> bool {
        self.sort.requires_scoring()
    }

    fn merge_fruits(&self, segment_fruits: Vec<TopFieldDocs>) -> crate::Result<TopFieldDocs> {
        TopFieldDocs::merge(&self.sort, self.offset, self.limit, segment_fruits)
    }
}

/// State shared by both collection modes.
struct FieldCollectorState {
    sort: Sort,
    chain: FieldComparatorChain,
    queue: HitQueue,
    requires_scoring: bool,

    total_hits: usize,
    relation: Relation,
    total_hits_threshold: usize,
    per_segment_margin: Option<f64>,
    trailing_hits: TrailingHitsPolicy,
    can_set_min_score: bool,
    min_competitive_score: Option<Score>,

    // Current segment
    segment_ord: SegmentOrdinal,
    doc_base: DocId,
    can_early_terminate: bool,
    leaf_hits: usize,
    leaf_hits_threshold: usize,
    collected_all_competitive_hits: bool,
    last_doc: Option<DocId>,
}

impl FieldCollectorState {
    fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        self.chain.set_segment(segment)?;
        self.segment_ord = segment.segment_ord;
        self.doc_base = segment.doc_base;
        self.can_early_terminate = can_early_terminate(&self.sort, segment.index_sort());
        self.leaf_hits = 0;
        self.leaf_hits_threshold = match self.per_segment_margin {
            Some(margin) => {
                let top_k = self.queue.capacity().max(self.total_hits_threshold);
                let threshold = prorate_for_segment(
                    top_k,
                    segment.reader.num_docs(),
                    segment.total_num_docs,
                    margin,
                );
                debug!(
                    "segment {}: prorated hits threshold {} (top_k={}, num_docs={}, \
                     total_num_docs={})",
                    segment.segment_ord,
                    threshold,
                    top_k,
                    segment.reader.num_docs(),
                    segment.total_num_docs
                );
                threshold
            }
            None => usize::MAX,
        };
        self.collected_all_competitive_hits = false;
        self.last_doc = None;
        Ok(())
    }

    #[inline]
    fn check_doc_order(&mut self, doc: DocId) {
        if let Some(last_doc) = self.last_doc {
            assert!(
                doc > last_doc,
                "documents must be collected in increasing doc id order (got {doc} after \
                 {last_doc} in segment {})",
                self.segment_ord
            );
        }
        self.last_doc = Some(doc);
    }

    #[inline]
    fn is_competitive(&self, doc: DocId, score: Score) -> bool {
        !self.collected_all_competitive_hits && self.chain.compare_bottom(doc, score).is_gt()
    }

    fn entry_score(&self, score: Score) -> Option<Score> {
        if self.requires_scoring {
            Some(score)
        } else {
            None
        }
    }

    /// Admits a document while the queue is not full yet.
    fn add(&mut self, doc: DocId, score: Score) {
        let slot = self.queue.len();
        self.chain.copy(slot, doc, score);
        let entry = Entry::new(slot, self.doc_base + doc, self.entry_score(score));
        self.queue.push(entry, &self.chain);
        if self.queue.is_full() {
            self.set_bottom();
            self.update_min_competitive_score();
        }
    }

    /// Replaces the bottom of a full queue with a competitive document.
    fn replace_bottom(&mut self, doc: DocId, score: Score) {
        let Some(slot) = self.queue.bottom().map(|bottom| bottom.slot) else {
            return;
        };
        self.chain.copy(slot, doc, score);
        let entry_score = self.entry_score(score);
        self.queue
            .update_bottom(self.doc_base + doc, entry_score, &self.chain);
        self.set_bottom();
        self.update_min_competitive_score();
    }

    fn set_bottom(&mut self) {
        if let Some(bottom) = self.queue.bottom() {
            let slot = bottom.slot;
            self.chain.set_bottom(slot);
        }
    }

    /// Handles a document that cannot enter the queue.
    ///
    /// `leaf_budget` tells whether the prorated segment budget applies.
    fn reject(&mut self, leaf_budget: bool) -> CollectControl {
        if self.can_early_terminate {
            let exceeds_budget = self.total_hits > self.total_hits_threshold
                || (leaf_budget && self.leaf_hits > self.leaf_hits_threshold);
            match self.trailing_hits {
                TrailingHitsPolicy::Skip => return self.terminate(),
                TrailingHitsPolicy::CountWithinThreshold if exceeds_budget => {
                    return self.terminate();
                }
                TrailingHitsPolicy::CountWithinThreshold | TrailingHitsPolicy::CountAll => {
                    self.collected_all_competitive_hits = true;
                }
            }
        } else if self.relation == Relation::Exact {
            self.update_min_competitive_score();
        }
        CollectControl::Continue
    }

    fn terminate(&mut self) -> CollectControl {
        self.relation = Relation::AtLeast;
        debug!(
            "segment {}: early termination after {} hits ({} in total)",
            self.segment_ord, self.leaf_hits, self.total_hits
        );
        CollectControl::Stop
    }

    fn update_min_competitive_score(&mut self) {
        if !self.can_set_min_score
            || self.total_hits <= self.total_hits_threshold
            || !self.queue.is_full()
        {
            return;
        }
        let Some(min_score) = self.queue.bottom().and_then(|bottom| bottom.score) else {
            return;
        };
        if self
            .min_competitive_score
            .map_or(true, |previous| min_score > previous)
        {
            trace!(
                "segment {}: min competitive score raised to {}",
                self.segment_ord,
                min_score
            );
            self.min_competitive_score = Some(min_score);
        }
        self.relation = Relation::AtLeast;
    }

    fn hit_count(&self) -> HitCount {
        HitCount::new(self.total_hits, self.relation)
    }

    fn harvest(self) -> TopFieldDocs {
        let hit_count = self.hit_count();
        let FieldCollectorState { chain, queue, .. } = self;
        let hits = queue
            .into_sorted_vec(&chain)
            .into_iter()
            .map(|entry| FieldDoc::new(entry.doc, entry.score, chain.sort_values(entry.slot)))
            .collect();
        TopFieldDocs::new(hits, hit_count)
    }
}

/// Segment collector used when no `after` boundary is set.
pub struct SimpleFieldCollector {
    state: FieldCollectorState,
}

impl SegmentCollector for SimpleFieldCollector {
    type Fruit = TopFieldDocs;

    fn collect(&mut self, doc: DocId, score: Score) -> CollectControl {
        let state = &mut self.state;
        state.check_doc_order(doc);
        state.leaf_hits += 1;
        state.total_hits += 1;
        if state.queue.is_full() {
            // Since docs are visited in doc id order, a document equal to the bottom
            // ranks after it, and is therefore not competitive.
            if !state.is_competitive(doc, score) {
                return state.reject(true);
            }
            state.replace_bottom(doc, score);
        } else {
            state.add(doc, score);
        }
        if state.can_early_terminate
            && state.queue.is_full()
            && state.leaf_hits > state.leaf_hits_threshold
        {
            return state.terminate();
        }
        CollectControl::Continue
    }

    fn min_competitive_score(&self) -> Option<Score> {
        self.state.min_competitive_score
    }

    fn harvest(self) -> TopFieldDocs {
        self.state.harvest()
    }
}

/// Segment collector only admitting documents ranked after a boundary.
pub struct PagingFieldCollector {
    state: FieldCollectorState,
    after_doc: DocId,
}

impl SegmentCollector for PagingFieldCollector {
    type Fruit = TopFieldDocs;

    fn collect(&mut self, doc: DocId, score: Score) -> CollectControl {
        let state = &mut self.state;
        state.check_doc_order(doc);
        state.leaf_hits += 1;
        state.total_hits += 1;
        if state.queue.is_full() && !state.is_competitive(doc, score) {
            return state.reject(false);
        }
        let top_cmp = state.chain.compare_top(doc, score);
        if top_cmp.is_gt() || (top_cmp.is_eq() && state.doc_base + doc <= self.after_doc) {
            // Already returned on a previous page.
            return CollectControl::Continue;
        }
        if state.queue.is_full() {
            state.replace_bottom(doc, score);
        } else {
            state.add(doc, score);
        }
        CollectControl::Continue
    }

    fn min_competitive_score(&self) -> Option<Score> {
        self.state.min_competitive_score
    }

    fn harvest(self) -> TopFieldDocs {
        self.state.harvest()
    }
}

/// Segment collector of a [`TopFieldCollector`].
pub enum TopFieldSegmentCollector {
    /// Plain top-k collection.
    Simple(SimpleFieldCollector),
    /// Collection of the page following a boundary document.
    Paging(PagingFieldCollector),
}

impl TopFieldSegmentCollector {
    fn state(&self) -> &FieldCollectorState {
        match self {
            TopFieldSegmentCollector::Simple(collector) => &collector.state,
            TopFieldSegmentCollector::Paging(collector) => &collector.state,
        }
    }

    fn state_mut(&mut self) -> &mut FieldCollectorState {
        match self {
            TopFieldSegmentCollector::Simple(collector) => &mut collector.state,
            TopFieldSegmentCollector::Paging(collector) => &mut collector.state,
        }
    }

    /// Moves on to the next segment, keeping the candidates collected so far.
    ///
    /// This makes it possible to visit all of the segments of an index with a single
    /// collector: once its queue is full, the bottom collected in earlier segments
    /// filters the documents of the following ones.
    pub fn set_segment(&mut self, segment: &SegmentContext) -> crate::Result<()> {
        self.state_mut().set_segment(segment)
    }

    /// Number of hits collected so far.
    pub fn hit_count(&self) -> HitCount {
        self.state().hit_count()
    }

    /// Number of candidates currently held.
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }
}

impl SegmentCollector for TopFieldSegmentCollector {
    type Fruit = TopFieldDocs;

    #[inline]
    fn collect(&mut self, doc: DocId, score: Score) -> CollectControl {
        match self {
            TopFieldSegmentCollector::Simple(collector) => collector.collect(doc, score),
            TopFieldSegmentCollector::Paging(collector) => collector.collect(doc, score),
        }
    }

    fn min_competitive_score(&self) -> Option<Score> {
        self.state().min_competitive_score
    }

    fn harvest(self) -> TopFieldDocs {
        match self {
            TopFieldSegmentCollector::Simple(collector) => collector.harvest(),
            TopFieldSegmentCollector::Paging(collector) => collector.harvest(),
        }
    }
}
