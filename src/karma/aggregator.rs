//! Per-subreddit karma aggregation.

use crate::models::{ActivityRecord, KarmaBreakdown};

/// Reduce a sequence of activity records into per-subreddit net karma.
///
/// Every record contributes its delta to the total keyed by its
/// subreddit; zero-score items still create an entry. An empty input
/// yields an empty mapping.
pub fn aggregate(records: &[ActivityRecord]) -> KarmaBreakdown {
    let mut breakdown = KarmaBreakdown::new();

    for record in records {
        *breakdown.entry(record.subreddit.clone()).or_insert(0) += record.karma_delta;
    }

    breakdown
}
