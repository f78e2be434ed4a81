mod common;

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tantivy_topk::collector::{
    FieldDoc, HitCount, Relation, Sort, SortField, TopFieldCollector, TopFieldSettings,
    TrailingHitsPolicy,
};
use tantivy_topk::index::{RamSegmentReader, SegmentContext, SegmentReader};
use tantivy_topk::query::{Scorer, VecScorer};
use tantivy_topk::{DocId, Order, Searcher};

const NUM_SEGMENTS: usize = 10;
const SEGMENT_NUM_DOCS: usize = 100;

fn key_sort() -> Sort {
    Sort::new(vec![SortField::u64("key", Order::Asc)])
}

/// Segments whose documents are stored by increasing key.
fn sorted_segments(rng: &mut StdRng) -> Vec<Vec<u64>> {
    (0..NUM_SEGMENTS)
        .map(|_| {
            let mut keys: Vec<u64> = (0..SEGMENT_NUM_DOCS).map(|_| rng.gen()).collect();
            keys.sort_unstable();
            keys
        })
        .collect()
}

/// Small segments of sorted keys, with many ties.
fn sorted_segments_with_ties(
    rng: &mut StdRng,
    num_segments: usize,
    max_docs_per_segment: usize,
) -> Vec<Vec<u64>> {
    (0..num_segments)
        .map(|_| {
            let num_docs = rng.gen_range(0..=max_docs_per_segment);
            let mut keys: Vec<u64> = (0..num_docs).map(|_| rng.gen_range(0..10)).collect();
            keys.sort_unstable();
            keys
        })
        .collect()
}

fn searcher(segments: &[Vec<u64>]) -> Searcher {
    let segment_readers: Vec<Arc<dyn SegmentReader>> = segments
        .iter()
        .map(|keys| {
            let reader = RamSegmentReader::new(keys.len() as DocId)
                .with_sort(key_sort())
                .with_u64_column("key", keys.iter().copied().map(Some).collect());
            Arc::new(reader) as Arc<dyn SegmentReader>
        })
        .collect();
    Searcher::new(segment_readers)
}

fn match_all(segment: &SegmentContext) -> tantivy_topk::Result<Box<dyn Scorer>> {
    let docs: Vec<DocId> = (0..segment.max_doc()).collect();
    Ok(Box::new(VecScorer::from(docs)))
}

/// Global doc ids of the `top_k` smallest keys.
fn true_top_k(segments: &[Vec<u64>], top_k: usize) -> Vec<DocId> {
    let mut docs: Vec<(u64, DocId)> = Vec::new();
    let mut doc_base = 0;
    for keys in segments {
        docs.extend(
            keys.iter()
                .enumerate()
                .map(|(doc, &key)| (key, doc_base + doc as DocId)),
        );
        doc_base += keys.len() as DocId;
    }
    docs.sort_unstable();
    docs.into_iter().take(top_k).map(|(_, doc)| doc).collect()
}

#[test]
fn test_index_sort_early_termination_is_exact() -> tantivy_topk::Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let segments = sorted_segments(&mut rng);
    let searcher = searcher(&segments);
    let expected = true_top_k(&segments, 5);

    let collector = TopFieldCollector::create(key_sort(), 5, None, Some(5), None)?;
    let top_docs = searcher.search(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, expected);
    assert!(top_docs.is_early_terminated());
    assert!(top_docs.hit_count.total_hits < NUM_SEGMENTS * SEGMENT_NUM_DOCS);

    let top_docs = searcher.search_sequential(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, expected);
    assert!(top_docs.is_early_terminated());
    Ok(())
}

#[test]
fn test_trailing_hits_policies() -> tantivy_topk::Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let segments = sorted_segments(&mut rng);
    let searcher = searcher(&segments);
    let expected = true_top_k(&segments, 5);
    let collector = TopFieldCollector::create(key_sort(), 5, None, Some(20), None)?;

    let count_all = collector
        .clone()
        .with_trailing_hits(TrailingHitsPolicy::CountAll);
    let top_docs = searcher.search(&match_all, &count_all)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, expected);
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * SEGMENT_NUM_DOCS, Relation::Exact)
    );

    let skip = collector
        .clone()
        .with_trailing_hits(TrailingHitsPolicy::Skip);
    let top_docs = searcher.search(&match_all, &skip)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, expected);
    // Every segment stops at its 6th document, the first one that cannot compete.
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * 6, Relation::AtLeast)
    );

    let top_docs = searcher.search(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, expected);
    // Each segment counts up to 20 hits, then stops on the 21st.
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * 21, Relation::AtLeast)
    );
    Ok(())
}

#[test]
fn test_settings_from_json() -> tantivy_topk::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let segments = sorted_segments(&mut rng);
    let searcher = searcher(&segments);
    let settings: TopFieldSettings = serde_json::from_str(
        r#"{"limit": 3, "offset": 2, "total_hits_threshold": 20, "trailing_hits": "skip"}"#,
    )
    .unwrap();
    let collector = TopFieldCollector::with_settings(key_sort(), &settings, None)?;
    let top_docs = searcher.search(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, true_top_k(&segments, 5)[2..].to_vec());
    // Every segment keeps 5 candidates, and stops at its 6th document.
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * 6, Relation::AtLeast)
    );
    Ok(())
}

#[test]
fn test_prorated_early_termination() -> tantivy_topk::Result<()> {
    const TOP_K: usize = 10;
    const NUM_TRIALS: usize = 1_000;
    let mut rng = StdRng::seed_from_u64(11);
    let collector = TopFieldCollector::create(key_sort(), TOP_K, None, Some(TOP_K), Some(5.0))?;
    let mut num_found = 0;
    let mut num_collected = 0;
    for _ in 0..NUM_TRIALS {
        let segments = sorted_segments(&mut rng);
        let searcher = searcher(&segments);
        let expected: HashSet<DocId> = true_top_k(&segments, TOP_K).into_iter().collect();
        let top_docs = searcher.search_sequential(&match_all, &collector)?;
        assert_eq!(top_docs.hits.len(), TOP_K);
        assert!(top_docs.is_early_terminated());
        num_found += top_docs
            .hits
            .iter()
            .filter(|hit| expected.contains(&hit.doc))
            .count();
        num_collected += top_docs.hit_count.total_hits;
    }
    let recall = num_found as f64 / (TOP_K * NUM_TRIALS) as f64;
    assert!(recall >= 0.9999, "recall={recall}");
    // Proration bounds the work done per segment.
    assert!(num_collected < NUM_TRIALS * NUM_SEGMENTS * SEGMENT_NUM_DOCS / 10);
    Ok(())
}

#[test]
fn test_prorated_early_termination_per_segment_is_exact() -> tantivy_topk::Result<()> {
    // Each segment collector fills its own queue before the prorated budget applies.
    let mut rng = StdRng::seed_from_u64(13);
    let segments = sorted_segments(&mut rng);
    let searcher = searcher(&segments);
    let collector = TopFieldCollector::create(key_sort(), 10, None, Some(10), Some(0.0))?;
    let top_docs = searcher.search(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, true_top_k(&segments, 10));
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * 10, Relation::AtLeast)
    );
    Ok(())
}

#[test]
fn test_margin_without_threshold_does_not_prorate() -> tantivy_topk::Result<()> {
    let mut rng = StdRng::seed_from_u64(19);
    let segments = sorted_segments(&mut rng);
    let searcher = searcher(&segments);
    let collector = TopFieldCollector::create(key_sort(), 10, None, None, Some(5.0))?;
    let top_docs = searcher.search_sequential(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, true_top_k(&segments, 10));
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * SEGMENT_NUM_DOCS, Relation::Exact)
    );
    Ok(())
}

#[test]
fn test_no_early_termination_without_index_sort() -> tantivy_topk::Result<()> {
    let mut rng = StdRng::seed_from_u64(17);
    let segments = sorted_segments(&mut rng);
    let segment_readers: Vec<Arc<dyn SegmentReader>> = segments
        .iter()
        .map(|keys| {
            let reader = RamSegmentReader::new(keys.len() as DocId)
                .with_u64_column("key", keys.iter().copied().map(Some).collect());
            Arc::new(reader) as Arc<dyn SegmentReader>
        })
        .collect();
    let searcher = Searcher::new(segment_readers);
    let collector = TopFieldCollector::create(key_sort(), 10, None, Some(10), Some(0.0))?;
    let top_docs = searcher.search_sequential(&match_all, &collector)?;
    let docs: Vec<DocId> = top_docs.hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, true_top_k(&segments, 10));
    assert_eq!(
        top_docs.hit_count,
        HitCount::new(NUM_SEGMENTS * SEGMENT_NUM_DOCS, Relation::Exact)
    );
    Ok(())
}

const TRAILING_HITS_POLICIES: [TrailingHitsPolicy; 3] = [
    TrailingHitsPolicy::CountWithinThreshold,
    TrailingHitsPolicy::CountAll,
    TrailingHitsPolicy::Skip,
];

proptest! {
    #[test]
    fn test_paging_with_early_termination(
        seed in any::<u64>(),
        num_segments in 1usize..5,
        page_size in 1usize..6,
        threshold in 0usize..8,
        policy_ord in 0usize..3,
        margin in proptest::option::of(0.0f64..3.0),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let segments = sorted_segments_with_ties(&mut rng, num_segments, 30);
        let searcher = searcher(&segments);
        let num_docs: usize = segments.iter().map(Vec::len).sum();
        let expected = true_top_k(&segments, num_docs);
        let policy = TRAILING_HITS_POLICIES[policy_ord];
        // The first page is collected exactly. Following pages pass a margin, which
        // must be ignored once an `after` boundary is set.
        let create_page = |after: Option<FieldDoc>| -> tantivy_topk::Result<TopFieldCollector> {
            let margin = if after.is_some() { margin } else { None };
            Ok(TopFieldCollector::create(key_sort(), page_size, after, Some(threshold), margin)?
                .with_trailing_hits(policy))
        };
        for sequential in [false, true] {
            let pages = common::collect_pages(&searcher, &match_all, &create_page, sequential)
                .unwrap();
            for page in &pages {
                prop_assert!(page.hits.len() <= page_size);
                if policy == TrailingHitsPolicy::CountAll {
                    prop_assert_eq!(page.hit_count, HitCount::new(num_docs, Relation::Exact));
                } else {
                    prop_assert!(page.hit_count.total_hits <= num_docs);
                }
            }
            let docs: Vec<DocId> = pages
                .iter()
                .flat_map(|page| page.hits.iter().map(|hit| hit.doc))
                .collect();
            prop_assert_eq!(&docs, &expected, "sequential={}", sequential);
        }
    }
}
