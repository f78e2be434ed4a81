#![allow(dead_code)]

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tantivy_topk::collector::{
    FieldDoc, Sort, SortBy, SortField, SortValue, TopFieldCollector, TopFieldDocs,
};
use tantivy_topk::index::{RamSegmentReader, SegmentContext, SegmentReader};
use tantivy_topk::query::{Scorer, VecScorer, Weight};
use tantivy_topk::{DocId, Order, Score, Searcher};

const CATEGORIES: [&str; 4] = ["books", "games", "music", "toys"];

/// Values of a document. Low cardinality, so that ties are frequent.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub price: Option<u64>,
    pub delta: Option<i64>,
    pub rating: Option<f64>,
    pub category: Option<String>,
}

pub struct SegmentData {
    pub rows: Vec<Row>,
    pub matches: Vec<(DocId, Score)>,
    pub has_rating: bool,
}

impl SegmentData {
    fn reader(&self) -> RamSegmentReader {
        let reader = RamSegmentReader::new(self.rows.len() as DocId)
            .with_u64_column("price", self.rows.iter().map(|row| row.price).collect())
            .with_i64_column("delta", self.rows.iter().map(|row| row.delta).collect())
            .with_str_column(
                "category",
                self.rows.iter().map(|row| row.category.as_deref()).collect(),
            );
        if self.has_rating {
            reader.with_f64_column("rating", self.rows.iter().map(|row| row.rating).collect())
        } else {
            reader
        }
    }
}

/// A random index, along with the documents matched by a random query.
pub struct Corpus {
    pub segments: Vec<SegmentData>,
}

impl Corpus {
    pub fn random(rng: &mut StdRng, num_segments: usize, max_docs_per_segment: usize) -> Corpus {
        let segments = (0..num_segments)
            .map(|_| {
                let num_docs = rng.gen_range(0..=max_docs_per_segment);
                let has_rating = !rng.gen_bool(0.2);
                let rows: Vec<Row> = (0..num_docs)
                    .map(|_| Row {
                        price: optional(rng, |rng| rng.gen_range(0..8)),
                        delta: optional(rng, |rng| rng.gen_range(-3..3)),
                        rating: if has_rating {
                            optional(rng, |rng| f64::from(rng.gen_range(0..10u8)) / 2.0)
                        } else {
                            None
                        },
                        category: optional(rng, |rng| {
                            CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string()
                        }),
                    })
                    .collect();
                let matches = (0..num_docs as DocId)
                    .filter_map(|doc| {
                        rng.gen_bool(0.7)
                            .then(|| (doc, f32::from(rng.gen_range(0..20u8)) / 2.0))
                    })
                    .collect();
                SegmentData {
                    rows,
                    matches,
                    has_rating,
                }
            })
            .collect();
        Corpus { segments }
    }

    pub fn searcher(&self) -> Searcher {
        let segment_readers: Vec<Arc<dyn SegmentReader>> = self
            .segments
            .iter()
            .map(|segment| Arc::new(segment.reader()) as Arc<dyn SegmentReader>)
            .collect();
        Searcher::new(segment_readers)
    }

    pub fn scorer(&self, segment: &SegmentContext) -> tantivy_topk::Result<Box<dyn Scorer>> {
        let matches = self.segments[segment.segment_ord as usize].matches.clone();
        Ok(Box::new(VecScorer::from(matches)))
    }

    pub fn num_matches(&self) -> usize {
        self.segments.iter().map(|segment| segment.matches.len()).sum()
    }

    /// Ranks every matching document, best first.
    pub fn brute_force(&self, sort: &Sort) -> Vec<FieldDoc> {
        let mut hits = Vec::new();
        let mut doc_base: DocId = 0;
        for segment in &self.segments {
            for &(doc, score) in &segment.matches {
                let row = &segment.rows[doc as usize];
                let global_doc = doc_base + doc;
                let sort_values = sort
                    .fields()
                    .iter()
                    .map(|field| match &field.by {
                        SortBy::Score => SortValue::Score(score),
                        SortBy::DocId => SortValue::Doc(global_doc),
                        SortBy::U64(_) => SortValue::U64(row.price),
                        SortBy::I64(_) => SortValue::I64(row.delta),
                        SortBy::F64(_) => SortValue::F64(row.rating),
                        SortBy::Str(_) => SortValue::Str(row.category.clone()),
                    })
                    .collect();
                let score = if sort.requires_scoring() {
                    Some(score)
                } else {
                    None
                };
                hits.push(FieldDoc::new(global_doc, score, sort_values));
            }
            doc_base += segment.rows.len() as DocId;
        }
        hits.sort_by(|lhs, rhs| {
            sort.compare_docs(
                (&rhs.sort_values[..], rhs.doc),
                (&lhs.sort_values[..], lhs.doc),
            )
        });
        hits
    }
}

fn optional<T>(rng: &mut StdRng, value: impl FnOnce(&mut StdRng) -> T) -> Option<T> {
    if rng.gen_bool(0.15) {
        None
    } else {
        Some(value(rng))
    }
}

/// A few sorts covering every kind of criterion.
pub fn sorts() -> Vec<Sort> {
    vec![
        Sort::by_score(),
        Sort::by_doc(),
        Sort::new(vec![SortField::u64("price", Order::Asc)]),
        Sort::new(vec![
            SortField::str("category", Order::Desc),
            SortField::f64("rating", Order::Asc),
        ]),
        Sort::new(vec![
            SortField::i64("delta", Order::Desc),
            SortField::score(),
        ]),
        Sort::new(vec![
            SortField::f64("rating", Order::Desc),
            SortField::u64("price", Order::Desc),
            SortField::doc(),
        ]),
    ]
}

/// Walks through every page of results, passing the last hit of a page as the
/// `after` boundary of the next one.
///
/// Pages are collected segment per segment and merged, or with a single collector
/// visiting all segments if `sequential` is true.
pub fn collect_pages(
    searcher: &Searcher,
    weight: &dyn Weight,
    create_page: impl Fn(Option<FieldDoc>) -> tantivy_topk::Result<TopFieldCollector>,
    sequential: bool,
) -> tantivy_topk::Result<Vec<TopFieldDocs>> {
    let mut pages = Vec::new();
    let mut after: Option<FieldDoc> = None;
    loop {
        let collector = create_page(after.clone())?;
        let page = if sequential {
            searcher.search_sequential(weight, &collector)?
        } else {
            searcher.search(weight, &collector)?
        };
        if page.hits.is_empty() {
            return Ok(pages);
        }
        after = page.hits.last().cloned();
        pages.push(page);
        assert!(pages.len() as u64 <= searcher.num_docs(), "paging does not progress");
    }
}
