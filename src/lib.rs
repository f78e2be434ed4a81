#![doc(test(attr(allow(unused_variables), deny(warnings))))]
#![warn(missing_docs)]
#![allow(clippy::len_without_is_empty)]

//! # `tantivy-topk`
//!
//! Bounded top-K collection over a segmented index.
//!
//! Given the documents matched by a query, spread over independently stored
//! segments, the [`TopFieldCollector`](collector::TopFieldCollector) keeps the
//! `K` best of them under an arbitrary multi-field [`Sort`](collector::Sort).
//!
//! It is designed to run one segment collector per segment, possibly on different
//! threads, and to merge their partial results afterwards:
//!
//! ```rust
//! use std::sync::Arc;
//! use tantivy_topk::collector::{Sort, SortField, TopFieldCollector};
//! use tantivy_topk::index::{RamSegmentReader, SegmentContext};
//! use tantivy_topk::query::{Scorer, VecScorer};
//! use tantivy_topk::{Order, Searcher};
//!
//! # fn main() -> tantivy_topk::Result<()> {
//! let segment = RamSegmentReader::new(4).with_u64_column("price", vec![Some(30), Some(10), None, Some(20)]);
//! let searcher = Searcher::new(vec![Arc::new(segment)]);
//!
//! let sort = Sort::new(vec![SortField::u64("price", Order::Asc)]);
//! let collector = TopFieldCollector::create(sort, 2, None, None, None)?;
//! let weight = |_: &SegmentContext| -> tantivy_topk::Result<Box<dyn Scorer>> {
//!     Ok(Box::new(VecScorer::from(vec![0, 1, 2, 3])))
//! };
//! let top_docs = searcher.search(&weight, &collector)?;
//!
//! let docs: Vec<u32> = top_docs.hits.iter().map(|hit| hit.doc).collect();
//! assert_eq!(docs, vec![1, 3]);
//! assert!(top_docs.hit_count.is_exact());
//! assert_eq!(top_docs.hit_count.total_hits, 4);
//! # Ok(())
//! # }
//! ```
//!
//! The collector also supports:
//! - search-after pagination, through [`FieldDoc`](collector::FieldDoc) cursors,
//! - exact early termination when the segments are stored in an order compatible with the
//!   requested sort,
//! - prorated (statistical) early termination across segments,
//! - feeding the score of its worst candidate back into the [`Scorer`](query::Scorer) so that
//!   non-competitive documents do not even need to be scored.

#[macro_use]
extern crate log;

pub mod collector;
pub mod column;
mod core;
pub mod docset;
pub mod error;
pub mod index;
pub mod query;

pub use crate::collector::Order;
pub use crate::core::{Executor, Searcher};
pub use crate::docset::{DocSet, TERMINATED};
pub use crate::error::TopKError;

/// Tantivy-topk result type.
pub type Result<T> = std::result::Result<T, TopKError>;

/// A `u32` identifying a document within a segment.
///
/// Once a segment has been assigned its `doc_base`, the same type is used
/// for global doc ids, i.e. `doc_base + doc`.
pub type DocId = u32;

/// A f32 that represents the relevance of the document to the query
pub type Score = f32;

/// A `SegmentOrdinal` identifies a segment, within a `Searcher`.
pub type SegmentOrdinal = u32;
