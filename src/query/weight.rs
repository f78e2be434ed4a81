use super::Scorer;
use crate::index::SegmentContext;

/// A Weight is the specialization of a query for a given index.
///
/// It builds one [`Scorer`] per segment. Any `Fn(&SegmentContext) -> Result<Box<dyn Scorer>>`
/// closure is a `Weight`.
pub trait Weight: Send + Sync {
    /// Returns the scorer for the given segment.
    fn scorer(&self, segment: &SegmentContext) -> crate::Result<Box<dyn Scorer>>;
}

impl<F> Weight for F
where F: Fn(&SegmentContext) -> crate::Result<Box<dyn Scorer>> + Send + Sync
{
    fn scorer(&self, segment: &SegmentContext) -> crate::Result<Box<dyn Scorer>> {
        self(segment)
    }
}
