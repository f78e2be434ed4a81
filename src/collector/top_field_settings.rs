use serde::{Deserialize, Serialize};

use super::early_termination::TrailingHitsPolicy;

fn default_limit() -> usize {
    10
}

/// Settings of a [`TopFieldCollector`](super::TopFieldCollector).
///
/// Every field has a default value, so that settings can be deserialized from a
/// partial configuration:
///
/// ```rust
/// use tantivy_topk::collector::{TopFieldSettings, TrailingHitsPolicy};
///
/// let settings: TopFieldSettings =
///     serde_json::from_str(r#"{"limit": 20, "total_hits_threshold": 1000}"#).unwrap();
/// assert_eq!(settings.limit, 20);
/// assert_eq!(settings.offset, 0);
/// assert_eq!(settings.total_hits_threshold, Some(1000));
/// assert_eq!(settings.per_segment_margin, None);
/// assert_eq!(settings.trailing_hits, TrailingHitsPolicy::CountWithinThreshold);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFieldSettings {
    /// Number of hits to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of best hits to skip.
    #[serde(default)]
    pub offset: usize,
    /// Number of hits to count exactly.
    ///
    /// Beyond this threshold, the hit count may be a lower bound. `None` counts every hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hits_threshold: Option<usize>,
    /// Number of standard deviations added to the prorated per-segment budget.
    ///
    /// `None` disables prorated early termination. The budget of a segment is prorated
    /// from `max(limit + offset, total_hits_threshold)`, so the margin has no effect
    /// unless `total_hits_threshold` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_segment_margin: Option<f64>,
    /// What to do with the hits of a segment that can no longer be competitive.
    #[serde(default)]
    pub trailing_hits: TrailingHitsPolicy,
}

impl Default for TopFieldSettings {
    fn default() -> Self {
        TopFieldSettings {
            limit: default_limit(),
            offset: 0,
            total_hits_threshold: None,
            per_segment_margin: None,
            trailing_hits: TrailingHitsPolicy::default(),
        }
    }
}
