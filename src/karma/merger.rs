//! Union-merge of comment and submission karma breakdowns.

use crate::models::KarmaBreakdown;
use std::collections::BTreeSet;

/// Combine the comment and submission breakdowns into one mapping.
///
/// The result's key set is the union of both inputs. A subreddit
/// present in both maps to the sum of its two values; a subreddit
/// present in only one maps to that single value. No key is
/// fabricated and none is lost, so the result is commutative in
/// its arguments.
pub fn merge(comment_karma: &KarmaBreakdown, submission_karma: &KarmaBreakdown) -> KarmaBreakdown {
    let subreddits: BTreeSet<&String> = comment_karma.keys().chain(submission_karma.keys()).collect();

    let mut combined = KarmaBreakdown::new();

    for subreddit in subreddits {
        let value = match (comment_karma.get(subreddit), submission_karma.get(subreddit)) {
            (Some(comments), Some(submissions)) => comments + submissions,
            (Some(comments), None) => *comments,
            (None, Some(submissions)) => *submissions,
            // The key set is built from the union of both inputs.
            (None, None) => unreachable!("key absent from both source breakdowns"),
        };
        combined.insert(subreddit.clone(), value);
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(entries: &[(&str, i64)]) -> KarmaBreakdown {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_merge_sums_shared_subreddits() {
        let comments = breakdown(&[("python", 5), ("askreddit", -2)]);
        let submissions = breakdown(&[("python", 3)]);

        let combined = merge(&comments, &submissions);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined.get("python"), Some(&8));
        assert_eq!(combined.get("askreddit"), Some(&-2));
    }

    #[test]
    fn test_merge_with_empty_side() {
        let comments = KarmaBreakdown::new();
        let submissions = breakdown(&[("golang", 10)]);

        let combined = merge(&comments, &submissions);

        assert_eq!(combined.len(), 1);
        assert_eq!(combined.get("golang"), Some(&10));
    }

    #[test]
    fn test_merge_key_set_is_union() {
        let comments = breakdown(&[("a", 1), ("b", 2)]);
        let submissions = breakdown(&[("b", 3), ("c", 4)]);

        let combined = merge(&comments, &submissions);

        let mut keys: Vec<&str> = combined.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(combined.get("b"), Some(&5));
    }

    #[test]
    fn test_merge_is_commutative() {
        let left = breakdown(&[("x", 2), ("y", -1)]);
        let right = breakdown(&[("y", 6), ("z", 3)]);

        assert_eq!(merge(&left, &right), merge(&right, &left));
    }

    #[test]
    fn test_merge_both_empty() {
        assert!(merge(&KarmaBreakdown::new(), &KarmaBreakdown::new()).is_empty());
    }
}
