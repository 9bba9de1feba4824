//! Reddit API client.

pub mod client;

pub use client::{ActivityKind, Credentials, RedditClient};
