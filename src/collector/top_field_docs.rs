use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::sort_key::{Sort, SortValue};
use crate::{DocId, Score};

/// A hit of a top-k search, along with the sort values that ranked it.
///
/// The last `FieldDoc` of a page is the cursor to pass as `after` to fetch the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    /// Global doc id.
    pub doc: DocId,
    /// Relevance score. Only set if the sort requires scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    /// One value per sort field.
    pub sort_values: Vec<SortValue>,
}

impl FieldDoc {
    /// Creates a new `FieldDoc`.
    pub fn new(doc: DocId, score: Option<Score>, sort_values: Vec<SortValue>) -> FieldDoc {
        FieldDoc {
            doc,
            score,
            sort_values,
        }
    }
}

/// Whether a hit count is exact or a lower bound.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The hit count is exact.
    #[default]
    Exact,
    /// The hit count is a lower bound: some matching documents were never counted.
    AtLeast,
}

/// Number of documents matching the query.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HitCount {
    /// Number of matching documents that were counted.
    pub total_hits: usize,
    /// Whether `total_hits` is exact or a lower bound.
    pub relation: Relation,
}

impl HitCount {
    /// Creates a new hit count.
    pub fn new(total_hits: usize, relation: Relation) -> HitCount {
        HitCount {
            total_hits,
            relation,
        }
    }

    /// Returns true if the hit count is exact.
    pub fn is_exact(&self) -> bool {
        self.relation == Relation::Exact
    }
}

/// Result of a top-k search sorted by fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopFieldDocs {
    /// Hits, best first.
    pub hits: Vec<FieldDoc>,
    /// Number of matching documents.
    pub hit_count: HitCount,
}

impl TopFieldDocs {
    /// Creates a new result.
    pub fn new(hits: Vec<FieldDoc>, hit_count: HitCount) -> TopFieldDocs {
        TopFieldDocs { hits, hit_count }
    }

    /// Returns true if collection stopped before every matching document was counted.
    pub fn is_early_terminated(&self) -> bool {
        !self.hit_count.is_exact()
    }

    /// Merges partial results, typically one per segment, into a single result.
    ///
    /// Each partial result must have its hits sorted best first under `sort`, as
    /// returned by the segment collectors. The merged result skips the first `offset`
    /// hits and keeps at most `limit` of the following ones. Its hit count is the sum
    /// of the partial hit counts, and is a lower bound as soon as one of them is.
    pub fn merge(
        sort: &Sort,
        offset: usize,
        limit: usize,
        partial_results: Vec<TopFieldDocs>,
    ) -> crate::Result<TopFieldDocs> {
        let mut hit_count = HitCount::default();
        let mut hit_lists = Vec::with_capacity(partial_results.len());
        for partial_result in partial_results {
            for hit in &partial_result.hits {
                sort.check_values(&hit.sort_values)?;
            }
            hit_count.total_hits += partial_result.hit_count.total_hits;
            if !partial_result.hit_count.is_exact() {
                hit_count.relation = Relation::AtLeast;
            }
            hit_lists.push(partial_result.hits);
        }
        let hits: Vec<FieldDoc> = hit_lists
            .into_iter()
            .kmerge_by(|lhs, rhs| compare_hits(sort, lhs, rhs) == Ordering::Greater)
            .skip(offset)
            .take(limit)
            .collect();
        Ok(TopFieldDocs { hits, hit_count })
    }
}

fn compare_hits(sort: &Sort, lhs: &FieldDoc, rhs: &FieldDoc) -> Ordering {
    sort.compare_docs(
        (&lhs.sort_values[..], lhs.doc),
        (&rhs.sort_values[..], rhs.doc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::SortField;
    use crate::Order;

    fn price_hit(doc: DocId, price: Option<u64>) -> FieldDoc {
        FieldDoc::new(doc, None, vec![SortValue::U64(price)])
    }

    fn price_sort() -> Sort {
        Sort::from(SortField::u64("price", Order::Asc))
    }

    #[test]
    fn test_merge_interleaves_and_sums_hits() {
        let first = TopFieldDocs::new(
            vec![price_hit(0, Some(1)), price_hit(3, Some(4)), price_hit(1, None)],
            HitCount::new(3, Relation::Exact),
        );
        let second = TopFieldDocs::new(
            vec![price_hit(10, Some(2)), price_hit(12, Some(4))],
            HitCount::new(7, Relation::Exact),
        );
        let merged = TopFieldDocs::merge(&price_sort(), 0, 4, vec![first, second]).unwrap();
        let docs: Vec<DocId> = merged.hits.iter().map(|hit| hit.doc).collect();
        assert_eq!(docs, vec![0, 10, 3, 12]);
        assert_eq!(merged.hit_count, HitCount::new(10, Relation::Exact));
        assert!(!merged.is_early_terminated());
    }

    #[test]
    fn test_merge_offset() {
        let first = TopFieldDocs::new(
            vec![price_hit(0, Some(1)), price_hit(1, Some(3))],
            HitCount::new(2, Relation::Exact),
        );
        let second = TopFieldDocs::new(
            vec![price_hit(5, Some(2)), price_hit(6, Some(4))],
            HitCount::new(2, Relation::AtLeast),
        );
        let merged = TopFieldDocs::merge(&price_sort(), 1, 2, vec![first, second]).unwrap();
        let docs: Vec<DocId> = merged.hits.iter().map(|hit| hit.doc).collect();
        assert_eq!(docs, vec![5, 1]);
        assert_eq!(merged.hit_count, HitCount::new(4, Relation::AtLeast));
        assert!(merged.is_early_terminated());
    }

    #[test]
    fn test_merge_nothing() {
        let merged = TopFieldDocs::merge(&price_sort(), 0, 10, Vec::new()).unwrap();
        assert!(merged.hits.is_empty());
        assert_eq!(merged.hit_count, HitCount::new(0, Relation::Exact));
    }

    #[test]
    fn test_merge_rejects_foreign_sort_values() {
        let partial = TopFieldDocs::new(
            vec![FieldDoc::new(0, Some(1.0), vec![SortValue::Score(1.0)])],
            HitCount::new(1, Relation::Exact),
        );
        assert!(TopFieldDocs::merge(&price_sort(), 0, 10, vec![partial]).is_err());
    }

    #[test]
    fn test_field_doc_serialization() {
        let hit = FieldDoc::new(
            7,
            Some(1.5),
            vec![SortValue::Score(1.5), SortValue::Str(Some("abc".to_string()))],
        );
        let json = serde_json::to_string(&hit).unwrap();
        assert_eq!(
            json,
            r#"{"doc":7,"score":1.5,"sort_values":[{"score":1.5},{"str":"abc"}]}"#
        );
        let deser: FieldDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, hit);
    }
}
