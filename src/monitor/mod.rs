//! Request-thread monitoring.
//!
//! This module drives the per-thread pipeline: fetch, duplicate
//! check, karma aggregation, report composition, and delivery. Each
//! candidate thread advances through the pipeline independently; a
//! failure is logged and never aborts the rest of the batch.

pub mod duplicate;

pub use duplicate::already_responded;

use crate::karma;
use crate::models::{
    ActivityRecord, MonitorError, SubredditInfo, ThreadHandle, UserKarma, UserProfile,
};
use crate::reddit::{ActivityKind, RedditClient};
use crate::report;
use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

/// Runtime options for one monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Subreddit whose request threads are scanned.
    pub subreddit: String,
    /// Maximum candidate threads per run.
    pub thread_limit: usize,
    /// Maximum recent items per activity listing.
    pub activity_limit: usize,
    /// Account name matched by the duplicate-reply check.
    pub bot_username: String,
    /// Skip the duplicate-reply check (the replies fetch is elided).
    pub ignore_dup: bool,
    /// Print composed reports to standard output.
    pub print_comment: bool,
    /// Suppress publishing.
    pub no_comment: bool,
}

/// Terminal state of one thread's processing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOutcome {
    /// Report published as a reply.
    Delivered,
    /// Report printed to standard output, publishing suppressed.
    Printed,
    /// Report composed but neither printed nor published.
    Suppressed,
    /// The bot had already replied in this thread.
    Skipped,
}

/// Counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub delivered: usize,
    pub printed: usize,
    pub suppressed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ThreadOutcome) {
        match outcome {
            ThreadOutcome::Delivered => self.delivered += 1,
            ThreadOutcome::Printed => self.printed += 1,
            ThreadOutcome::Suppressed => self.suppressed += 1,
            ThreadOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// The request-thread monitor.
pub struct RequestMonitor {
    client: RedditClient,
    options: MonitorOptions,
}

impl RequestMonitor {
    pub fn new(client: RedditClient, options: MonitorOptions) -> Self {
        Self { client, options }
    }

    /// Process one batch of candidate threads sequentially.
    ///
    /// Per-thread failures are logged and counted; only the initial
    /// candidate fetch can fail the run itself.
    pub async fn run(&self) -> Result<RunSummary> {
        info!(
            "Scanning /r/{} for request threads (limit {})",
            self.options.subreddit, self.options.thread_limit
        );

        let threads = self
            .client
            .fetch_recent_threads(&self.options.subreddit, self.options.thread_limit)
            .await
            .with_context(|| format!("Failed to list /r/{}", self.options.subreddit))?;

        info!("Found {} candidate threads", threads.len());

        let mut summary = RunSummary::default();

        for thread in &threads {
            let result = self.process_thread(thread).await;
            record_result(&mut summary, &thread.id, result);
        }

        Ok(summary)
    }

    /// Advance one thread through the pipeline to its terminal state.
    async fn process_thread(&self, thread: &ThreadHandle) -> Result<ThreadOutcome, MonitorError> {
        info!("Processing thread {} by /u/{}", thread.id, thread.author);

        let target_name = parse_target_subreddit(thread)?;
        debug!("Thread {} targets /r/{}", thread.id, target_name);

        if self.options.ignore_dup {
            debug!("Duplicate check disabled, skipping replies fetch");
        } else {
            let reply_authors = self.client.fetch_flattened_replies(thread).await?;
            if already_responded(&reply_authors, &self.options.bot_username) {
                info!("Already replied in thread {}", thread.id);
                return Ok(ThreadOutcome::Skipped);
            }
        }

        let requester = self.fetch_requester(&thread.author).await?;
        let target = self.fetch_target(&target_name).await?;

        let report = report::compose_full_report(&target, &requester);

        if self.options.print_comment {
            println!("{}", report);
        }

        if self.options.no_comment {
            if !self.options.print_comment {
                warn!("Thread {}: report composed but discarded", thread.id);
                return Ok(ThreadOutcome::Suppressed);
            }
            return Ok(ThreadOutcome::Printed);
        }

        self.client
            .publish_reply(thread, &report)
            .await
            .map_err(|e| MonitorError::PublishRejected {
                detail: e.to_string(),
            })?;

        Ok(ThreadOutcome::Delivered)
    }

    /// Fetch the requester's profile and attach karma breakdowns.
    async fn fetch_requester(&self, author: &str) -> Result<UserProfile, MonitorError> {
        let profile = self.client.fetch_user_profile(author).await?;

        let submissions = self
            .client
            .fetch_recent_activity(author, ActivityKind::Submissions, self.options.activity_limit)
            .await?;
        let comments = self
            .client
            .fetch_recent_activity(author, ActivityKind::Comments, self.options.activity_limit)
            .await?;

        Ok(attach_breakdowns(profile, &submissions, &comments))
    }

    /// Fetch the target subreddit's moderator roster. Breakdowns are
    /// not computed for roster entries.
    async fn fetch_target(&self, name: &str) -> Result<SubredditInfo, MonitorError> {
        let moderators = self.client.fetch_moderators(name).await?;

        Ok(SubredditInfo {
            name: name.to_string(),
            moderators,
        })
    }
}

/// Fold one thread's result into the run summary.
///
/// Failures are logged and counted here; they never propagate, so a
/// bad thread cannot abort the rest of the batch.
fn record_result(
    summary: &mut RunSummary,
    thread_id: &str,
    result: Result<ThreadOutcome, MonitorError>,
) {
    match result {
        Ok(outcome) => {
            debug!("Thread {} finished as {:?}", thread_id, outcome);
            summary.record(outcome);
        }
        Err(e) => {
            error!("Thread {} failed: {}", thread_id, e);
            summary.failed += 1;
        }
    }
}

/// Aggregate both activity listings and merge them onto the profile.
fn attach_breakdowns(
    mut profile: UserProfile,
    submissions: &[ActivityRecord],
    comments: &[ActivityRecord],
) -> UserProfile {
    let submission_karma = karma::aggregate(submissions);
    let comment_karma = karma::aggregate(comments);
    let combined = karma::merge(&comment_karma, &submission_karma);

    profile.karma = Some(UserKarma {
        submissions: submission_karma,
        comments: comment_karma,
        combined,
    });

    profile
}

/// Extract the target subreddit name from a thread's reference.
///
/// The title is checked first: request threads are usually self-posts
/// whose URL points back at the request subreddit itself. The
/// submitted URL is the fallback for link posts.
pub fn parse_target_subreddit(thread: &ThreadHandle) -> Result<String, MonitorError> {
    extract_subreddit(&thread.title)
        .or_else(|| extract_subreddit(&thread.url))
        .ok_or_else(|| MonitorError::MissingCommunityTag {
            thread_id: thread.id.clone(),
        })
}

/// Find an `r/name` mention at a word boundary and return the name.
fn extract_subreddit(reference: &str) -> Option<String> {
    for (idx, _) in reference.match_indices("r/") {
        let boundary = reference[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric());
        if !boundary {
            continue;
        }

        let name: String = reference[idx + 2..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() {
            return Some(name);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_thread(title: &str, url: &str) -> ThreadHandle {
        ThreadHandle {
            id: "abc123".to_string(),
            title: title.to_string(),
            author: "alice".to_string(),
            url: url.to_string(),
            permalink: "/r/redditrequest/comments/abc123/".to_string(),
        }
    }

    fn record(subreddit: &str, karma_delta: i64) -> ActivityRecord {
        ActivityRecord {
            subreddit: subreddit.to_string(),
            karma_delta,
        }
    }

    #[test]
    fn test_parse_target_from_url() {
        let thread = make_thread("please transfer this", "https://www.reddit.com/r/books");
        assert_eq!(parse_target_subreddit(&thread).unwrap(), "books");
    }

    #[test]
    fn test_parse_target_from_title() {
        let thread = make_thread("Requesting r/rust_gamedev, mods inactive", "https://example.com");
        assert_eq!(parse_target_subreddit(&thread).unwrap(), "rust_gamedev");
    }

    #[test]
    fn test_parse_target_prefers_title_over_url() {
        // Self-posts carry the request subreddit's own URL.
        let thread = make_thread(
            "Requesting r/books",
            "https://www.reddit.com/r/redditrequest/comments/abc123/",
        );
        assert_eq!(parse_target_subreddit(&thread).unwrap(), "books");
    }

    #[test]
    fn test_parse_target_missing_fails_with_thread_id() {
        let thread = make_thread("no mention here", "https://example.com/page");

        let err = parse_target_subreddit(&thread).unwrap_err();
        match err {
            MonitorError::MissingCommunityTag { thread_id } => assert_eq!(thread_id, "abc123"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_ignores_mid_word_match() {
        // "for/sale" contains "r/" but not at a word boundary.
        assert_eq!(extract_subreddit("offer for/sale today"), None);
    }

    #[test]
    fn test_extract_trims_trailing_punctuation() {
        assert_eq!(
            extract_subreddit("please take over r/books."),
            Some("books".to_string())
        );
    }

    #[test]
    fn test_attach_breakdowns_merges_both_sides() {
        let profile = UserProfile {
            name: "alice".to_string(),
            created_utc: 0,
            has_verified_email: false,
            is_gold: false,
            comment_karma: 0,
            link_karma: 0,
            karma: None,
        };

        let submissions = vec![record("python", 3)];
        let comments = vec![record("python", 5), record("askreddit", -2)];

        let with_karma = attach_breakdowns(profile, &submissions, &comments);
        let karma = with_karma.karma.unwrap();

        assert_eq!(karma.combined.get("python"), Some(&8));
        assert_eq!(karma.combined.get("askreddit"), Some(&-2));
        assert_eq!(karma.submissions.get("askreddit"), None);
    }

    #[test]
    fn test_attach_breakdowns_empty_listings() {
        let profile = UserProfile {
            name: "ghost".to_string(),
            created_utc: 0,
            has_verified_email: false,
            is_gold: false,
            comment_karma: 0,
            link_karma: 0,
            karma: None,
        };

        let with_karma = attach_breakdowns(profile, &[], &[]);
        assert!(with_karma.karma.unwrap().combined.is_empty());
    }

    #[test]
    fn test_failed_thread_does_not_affect_others() {
        let mut summary = RunSummary::default();

        record_result(&mut summary, "one", Ok(ThreadOutcome::Delivered));
        record_result(
            &mut summary,
            "two",
            Err(MonitorError::MissingCommunityTag {
                thread_id: "two".to_string(),
            }),
        );
        record_result(&mut summary, "three", Ok(ThreadOutcome::Delivered));

        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_summary_record() {
        let mut summary = RunSummary::default();
        summary.record(ThreadOutcome::Delivered);
        summary.record(ThreadOutcome::Skipped);
        summary.record(ThreadOutcome::Skipped);

        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 0);
    }
}
