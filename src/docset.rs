//! Streams of segment-local doc ids.

use crate::DocId;

/// Doc id reported by a [`DocSet`] once it has been exhausted.
///
/// Valid doc ids are always strictly lower.
pub const TERMINATED: DocId = i32::MAX as u32;

/// A cursor over a strictly increasing sequence of doc ids.
///
/// A freshly created `DocSet` is already positioned on its first doc id, or on
/// [`TERMINATED`] if it is empty.
///
/// Collectors depend on the increasing order: when a document ties with the worst
/// candidate collected so far, it is known to rank after it and can be dismissed.
pub trait DocSet: Send {
    /// Moves to the next doc id and returns it, or returns [`TERMINATED`].
    ///
    /// Advancing an exhausted `DocSet` is legal and keeps returning [`TERMINATED`].
    fn advance(&mut self) -> DocId;

    /// Doc id the cursor is positioned on.
    fn doc(&self) -> DocId;

    /// Upper bound of the number of doc ids left, current one included.
    fn size_hint(&self) -> u32;

    /// Consumes the remaining doc ids, current one included, and returns their number.
    fn count_remaining(&mut self) -> u32 {
        let mut count = 0u32;
        while self.doc() != TERMINATED {
            count += 1;
            self.advance();
        }
        count
    }
}

impl<D: DocSet + ?Sized> DocSet for Box<D> {
    fn advance(&mut self) -> DocId {
        (**self).advance()
    }

    fn doc(&self) -> DocId {
        (**self).doc()
    }

    fn size_hint(&self) -> u32 {
        (**self).size_hint()
    }

    fn count_remaining(&mut self) -> u32 {
        (**self).count_remaining()
    }
}
