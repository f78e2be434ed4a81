use crate::docset::{DocSet, TERMINATED};
use crate::query::Scorer;
use crate::{DocId, Score};

/// A [`Scorer`] over an in-memory list of documents.
///
/// It honors [`Scorer::set_min_competitive_score`] by skipping over the documents
/// whose score is below the threshold.
#[derive(Debug, Clone)]
pub struct VecScorer {
    docs: Vec<DocId>,
    scores: Vec<Score>,
    cursor: usize,
    min_competitive_score: Option<Score>,
    num_skipped: usize,
}

impl From<Vec<DocId>> for VecScorer {
    /// Every document gets a score of 1.0.
    fn from(docs: Vec<DocId>) -> VecScorer {
        let scores = vec![1.0; docs.len()];
        VecScorer::new(docs, scores)
    }
}

impl From<Vec<(DocId, Score)>> for VecScorer {
    fn from(scored_docs: Vec<(DocId, Score)>) -> VecScorer {
        let (docs, scores) = scored_docs.into_iter().unzip();
        VecScorer::new(docs, scores)
    }
}

impl VecScorer {
    fn new(docs: Vec<DocId>, scores: Vec<Score>) -> VecScorer {
        debug_assert!(docs.windows(2).all(|window| window[0] < window[1]));
        VecScorer {
            docs,
            scores,
            cursor: 0,
            min_competitive_score: None,
            num_skipped: 0,
        }
    }

    /// Last minimum competitive score received.
    pub fn min_competitive_score(&self) -> Option<Score> {
        self.min_competitive_score
    }

    /// Number of documents that were skipped thanks to the minimum competitive score.
    pub fn num_skipped(&self) -> usize {
        self.num_skipped
    }

    fn is_competitive(&self, cursor: usize) -> bool {
        match self.min_competitive_score {
            Some(min_score) => self.scores[cursor] >= min_score,
            None => true,
        }
    }
}

impl DocSet for VecScorer {
    fn advance(&mut self) -> DocId {
        if self.cursor < self.docs.len() {
            self.cursor += 1;
        }
        while self.cursor < self.docs.len() && !self.is_competitive(self.cursor) {
            self.num_skipped += 1;
            self.cursor += 1;
        }
        self.doc()
    }

    fn doc(&self) -> DocId {
        self.docs.get(self.cursor).copied().unwrap_or(TERMINATED)
    }

    fn size_hint(&self) -> u32 {
        (self.docs.len() - self.cursor) as u32
    }
}

impl Scorer for VecScorer {
    fn score(&mut self) -> Score {
        self.scores.get(self.cursor).copied().unwrap_or(0.0)
    }

    fn set_min_competitive_score(&mut self, min_competitive_score: Score) {
        let min_competitive_score = self
            .min_competitive_score
            .map_or(min_competitive_score, |previous| {
                previous.max(min_competitive_score)
            });
        self.min_competitive_score = Some(min_competitive_score);
    }
}
