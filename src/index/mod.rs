//! The `index` module describes how the collector sees a segmented index.
//!
//! An index is an ordered list of segments. Each segment is exposed through a
//! [`SegmentReader`], and positioned within the index by a [`SegmentContext`].

mod ram_segment_reader;
mod segment_reader;

pub use self::ram_segment_reader::RamSegmentReader;
pub use self::segment_reader::{SegmentContext, SegmentReader};
