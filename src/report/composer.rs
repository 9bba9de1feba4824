//! Markdown report composition.
//!
//! This module renders user profiles, karma breakdowns, and target
//! subreddit rosters into the reply text. Pure text construction:
//! identical inputs produce byte-identical output.

use crate::models::{SubredditInfo, UserKarma, UserProfile};
use chrono::{DateTime, Utc};

/// Placeholder rendered when a subreddit is absent from one side of
/// the karma table.
const MISSING_VALUE: &str = "n/a";

/// Timestamp format for account creation dates. The offset is a
/// fixed literal: all wire timestamps are already UTC.
const TIMESTAMP_FORMAT: &str = "%A, %d %B %Y %H:%M:%S +0000";

/// Compose the complete reply: requester section first, then the
/// target subreddit section.
pub fn compose_full_report(target: &SubredditInfo, requester: &UserProfile) -> String {
    let mut output = String::new();

    output.push_str(&compose_user_report(requester));
    output.push_str(&compose_target_report(target));
    output.push_str(&compose_footer());

    output
}

/// Compose the requester section: identity, account metadata, and the
/// per-subreddit karma table when breakdowns were computed.
pub fn compose_user_report(profile: &UserProfile) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Requester: /u/{}\n\n", profile.name));
    section.push_str(&format!(
        "- **Account created:** {}\n",
        format_timestamp(profile.created_at())
    ));
    section.push_str(&format!(
        "- **Verified email:** {}\n",
        yes_no(profile.has_verified_email)
    ));
    section.push_str(&format!("- **Premium:** {}\n", yes_no(profile.is_gold)));
    section.push_str(&format!("- **Link karma:** {}\n", profile.link_karma));
    section.push_str(&format!("- **Comment karma:** {}\n", profile.comment_karma));
    section.push('\n');

    if let Some(ref karma) = profile.karma {
        section.push_str("### Recent karma by subreddit\n\n");
        section.push_str(&compose_karma_table(karma));
    }

    section
}

/// Compose the karma table: one row per subreddit in the combined
/// breakdown, sorted by name so repeated runs render identically.
pub fn compose_karma_table(karma: &UserKarma) -> String {
    let mut table = String::new();

    table.push_str("Subreddit | Link | Comment | Total\n");
    table.push_str("--- | --- | --- | ---\n");

    let mut subreddits: Vec<&String> = karma.combined.keys().collect();
    subreddits.sort_unstable();

    for subreddit in subreddits {
        let link = karma
            .submissions
            .get(subreddit)
            .map(|v| v.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string());
        let comment = karma
            .comments
            .get(subreddit)
            .map(|v| v.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string());
        let total = karma.combined[subreddit];

        table.push_str(&format!("{} | {} | {} | {}\n", subreddit, link, comment, total));
    }

    table.push('\n');

    table
}

/// Compose the target subreddit section with its moderator roster.
///
/// Moderators render in the order supplied by the API, one line each
/// with account age and lifetime totals. Roster entries carry no
/// breakdowns, so no tables here.
pub fn compose_target_report(target: &SubredditInfo) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Target: /r/{}\n\n", target.name));
    section.push_str("### Moderators\n\n");

    if target.moderators.is_empty() {
        section.push_str("No moderators listed.\n\n");
        return section;
    }

    for moderator in &target.moderators {
        section.push_str(&format!(
            "- /u/{} — created {}, {} link karma, {} comment karma\n",
            moderator.name,
            format_timestamp(moderator.created_at()),
            moderator.link_karma,
            moderator.comment_karma
        ));
    }
    section.push('\n');

    section
}

fn compose_footer() -> String {
    "---\n\n*This report was generated automatically by requestmon.*\n".to_string()
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => "unknown".to_string(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
