//! Interface to the matching and scoring process.
//!
//! A [`Weight`] produces, for every segment, a [`Scorer`]: a stream of matching doc ids in
//! increasing order together with their relevance score.

mod scorer;
mod vec_scorer;
mod weight;

pub use self::scorer::Scorer;
pub use self::vec_scorer::VecScorer;
pub use self::weight::Weight;
