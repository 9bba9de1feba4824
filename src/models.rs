//! Data models for the request monitor.
//!
//! This module contains the core data structures shared across the
//! application: activity records, karma breakdowns, user profiles,
//! and the per-thread error type.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-subreddit net karma totals, keyed by subreddit name.
pub type KarmaBreakdown = HashMap<String, i64>;

/// One vote-weighted contribution attributed to a single subreddit.
///
/// Derived from one submission or one comment in a user's recent
/// activity listing. Consumed once by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Subreddit the contribution was posted in.
    pub subreddit: String,
    /// Net up/down-vote score of the contribution.
    pub karma_delta: i64,
}

/// The three karma mappings computed for a requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserKarma {
    /// Per-subreddit totals over recent submissions.
    pub submissions: KarmaBreakdown,
    /// Per-subreddit totals over recent comments.
    pub comments: KarmaBreakdown,
    /// Union-merge of the two (see `karma::merge`).
    pub combined: KarmaBreakdown,
}

/// Snapshot of a Reddit account at one point in time.
///
/// Moderator roster entries carry `karma: None` — per-subreddit
/// breakdowns are only computed for the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account name, without the `/u/` prefix.
    pub name: String,
    /// Account creation time in epoch seconds (UTC).
    pub created_utc: i64,
    /// Whether the account has a verified email address.
    pub has_verified_email: bool,
    /// Whether the account has Reddit premium (gold).
    pub is_gold: bool,
    /// Lifetime comment karma total.
    pub comment_karma: i64,
    /// Lifetime submission (link) karma total.
    pub link_karma: i64,
    /// Per-subreddit breakdowns, when computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub karma: Option<UserKarma>,
}

impl UserProfile {
    /// Account creation time as a UTC datetime.
    ///
    /// Returns `None` if the epoch value is out of chrono's range.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_utc, 0).single()
    }
}

/// A target subreddit and its moderator roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubredditInfo {
    /// Subreddit name, without the `/r/` prefix.
    pub name: String,
    /// Moderator accounts, roster order preserved.
    pub moderators: Vec<UserProfile>,
}

/// One candidate request thread from the monitored feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadHandle {
    /// Base-36 thing id (without the `t3_` prefix).
    pub id: String,
    /// Thread title.
    pub title: String,
    /// Author account name.
    pub author: String,
    /// Submitted URL; for request threads this usually points at the
    /// target subreddit.
    pub url: String,
    /// Permalink path on reddit.com.
    pub permalink: String,
}

/// Failure of a single thread's processing pass.
///
/// Caught at the batch loop boundary; never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A collaborator call did not return data.
    #[error("fetch failed: {0}")]
    FetchFailure(#[from] anyhow::Error),

    /// The thread's target subreddit could not be parsed from its
    /// reference.
    #[error("no target subreddit found in thread {thread_id}")]
    MissingCommunityTag { thread_id: String },

    /// The publish endpoint accepted the request but rejected the reply.
    #[error("reply rejected: {detail}")]
    PublishRejected { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile() -> UserProfile {
        UserProfile {
            name: "alice".to_string(),
            created_utc: 1_500_000_000,
            has_verified_email: true,
            is_gold: false,
            comment_karma: 10,
            link_karma: 20,
            karma: None,
        }
    }

    #[test]
    fn test_created_at() {
        let profile = make_profile();
        let created = profile.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_500_000_000);
    }

    #[test]
    fn test_monitor_error_display() {
        let err = MonitorError::MissingCommunityTag {
            thread_id: "abc123".to_string(),
        };
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_profile_serialization_skips_empty_karma() {
        let profile = make_profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("\"karma\""));
    }
}
