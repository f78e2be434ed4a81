use crate::docset::DocSet;
use crate::Score;

/// Scored set of documents matching a query within a segment.
pub trait Scorer: DocSet {
    /// Returns the score.
    ///
    /// This method will perform a bit of computation and is not cached.
    fn score(&mut self) -> Score;

    /// Informs the scorer that documents with a score strictly lower than
    /// `min_competitive_score` will not be collected.
    ///
    /// This is only a hint: a scorer is free to ignore it, or to honor it
    /// partially. Successive calls never lower the threshold.
    fn set_min_competitive_score(&mut self, _min_competitive_score: Score) {}
}

impl Scorer for Box<dyn Scorer> {
    #[inline]
    fn score(&mut self) -> Score {
        self.as_mut().score()
    }

    fn set_min_competitive_score(&mut self, min_competitive_score: Score) {
        self.as_mut()
            .set_min_competitive_score(min_competitive_score);
    }
}
