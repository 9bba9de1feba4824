//! Reddit API client.
//!
//! OAuth2 script-app flow against the Reddit JSON API: a password
//! grant fetches a bearer token, and all further calls go to the
//! OAuth API host. Wire payloads are deserialized into private serde
//! structs here; nothing downstream touches raw JSON fields.

use crate::config::RedditConfig;
use crate::models::{ActivityRecord, ThreadHandle, UserProfile};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Script-app credentials, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// Which activity listing to fetch for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Submissions,
    Comments,
}

impl ActivityKind {
    fn path_segment(self) -> &'static str {
        match self {
            ActivityKind::Submissions => "submitted",
            ActivityKind::Comments => "comments",
        }
    }
}

/// The Reddit API client.
pub struct RedditClient {
    config: RedditConfig,
    credentials: Credentials,
    http_client: reqwest::Client,
    token: Option<String>,
}

impl RedditClient {
    /// Create a new client. Call [`authenticate`](Self::authenticate)
    /// before any API operation.
    pub fn new(config: RedditConfig, credentials: Credentials) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            credentials,
            http_client,
            token: None,
        }
    }

    /// Obtain a bearer token via the password grant.
    pub async fn authenticate(&mut self) -> Result<()> {
        info!("Authenticating as /u/{}", self.credentials.username);

        let response = self
            .http_client
            .post(&self.config.auth_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Authentication failed with {}: {}", status, body);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        self.token = Some(token.access_token);
        Ok(())
    }

    /// Fetch the newest threads in a subreddit.
    pub async fn fetch_recent_threads(
        &self,
        subreddit: &str,
        limit: usize,
    ) -> Result<Vec<ThreadHandle>> {
        debug!("Fetching up to {} threads from /r/{}", limit, subreddit);

        let listing: Listing<LinkData> = self
            .get_json(&format!("/r/{}/new", subreddit), &[("limit", limit.to_string())])
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|thing| ThreadHandle {
                id: thing.data.id,
                title: thing.data.title,
                author: thing.data.author,
                url: thing.data.url,
                permalink: thing.data.permalink,
            })
            .collect())
    }

    /// Fetch a user's most recent submissions or comments as activity
    /// records.
    pub async fn fetch_recent_activity(
        &self,
        user: &str,
        kind: ActivityKind,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>> {
        debug!("Fetching {:?} for /u/{}", kind, user);

        let listing: Listing<ActivityData> = self
            .get_json(
                &format!("/user/{}/{}", user, kind.path_segment()),
                &[("limit", limit.to_string())],
            )
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|thing| ActivityRecord {
                subreddit: thing.data.subreddit,
                karma_delta: thing.data.score,
            })
            .collect())
    }

    /// Fetch a user's account snapshot. Breakdowns are left unset.
    pub async fn fetch_user_profile(&self, user: &str) -> Result<UserProfile> {
        debug!("Fetching profile for /u/{}", user);

        let about: AboutWrapper = self
            .get_json(&format!("/user/{}/about", user), &[])
            .await?;

        Ok(UserProfile {
            name: about.data.name,
            created_utc: about.data.created_utc as i64,
            has_verified_email: about.data.has_verified_email.unwrap_or(false),
            is_gold: about.data.is_gold,
            comment_karma: about.data.comment_karma,
            link_karma: about.data.link_karma,
            karma: None,
        })
    }

    /// Fetch a subreddit's moderator profiles, roster order preserved.
    pub async fn fetch_moderators(&self, subreddit: &str) -> Result<Vec<UserProfile>> {
        debug!("Fetching moderators of /r/{}", subreddit);

        let roster: ModeratorList = self
            .get_json(&format!("/r/{}/about/moderators", subreddit), &[])
            .await?;

        let mut moderators = Vec::with_capacity(roster.data.children.len());
        for entry in roster.data.children {
            let profile = self
                .fetch_user_profile(&entry.name)
                .await
                .with_context(|| format!("Failed to fetch moderator /u/{}", entry.name))?;
            moderators.push(profile);
        }

        Ok(moderators)
    }

    /// Fetch a thread's reply tree flattened to author names.
    ///
    /// Deleted or removed authors come back as `None`.
    pub async fn fetch_flattened_replies(
        &self,
        thread: &ThreadHandle,
    ) -> Result<Vec<Option<String>>> {
        debug!("Fetching replies for thread {}", thread.id);

        let payload: Value = self
            .get_json(&format!("/comments/{}", thread.id), &[])
            .await?;

        let mut authors = Vec::new();
        // The endpoint returns [thread listing, comment tree listing];
        // only the second element holds replies.
        if let Some(tree) = payload.get(1) {
            flatten_reply_authors(tree, &mut authors);
        }

        Ok(authors)
    }

    /// Post the report as a reply under the thread.
    pub async fn publish_reply(&self, thread: &ThreadHandle, text: &str) -> Result<()> {
        info!("Publishing reply to thread {}", thread.id);

        let url = format!("{}/api/comment", self.config.api_url);
        let thing_id = format!("t3_{}", thread.id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit API error {}: {}", status, body);
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse comment response")?;

        // API-level errors arrive as a non-empty json.errors array on a
        // 200 response.
        if let Some(errors) = payload["json"]["errors"].as_array() {
            if !errors.is_empty() {
                anyhow::bail!("comment API returned errors: {}", Value::Array(errors.clone()));
            }
        }

        Ok(())
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .context("Client is not authenticated")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit API error {}: {}", status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }

    fn request_error(&self, e: reqwest::Error) -> anyhow::Error {
        if e.is_timeout() {
            anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
        } else if e.is_connect() {
            anyhow::anyhow!("Cannot connect to Reddit at {}", self.config.api_url)
        } else {
            anyhow::anyhow!("Failed to send request: {}", e)
        }
    }
}

/// Walk a comment-tree listing, collecting author names depth-first.
fn flatten_reply_authors(node: &Value, authors: &mut Vec<Option<String>>) {
    let children = match node["data"]["children"].as_array() {
        Some(children) => children,
        None => return,
    };

    for child in children {
        if child["kind"].as_str() != Some("t1") {
            continue;
        }

        let author = child["data"]["author"]
            .as_str()
            .filter(|name| !name.is_empty() && *name != "[deleted]")
            .map(String::from);
        authors.push(author);

        // Nested replies are either a listing object or an empty string.
        let replies = &child["data"]["replies"];
        if replies.is_object() {
            flatten_reply_authors(replies, authors);
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    id: String,
    title: String,
    author: String,
    url: String,
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct ActivityData {
    subreddit: String,
    score: i64,
}

#[derive(Debug, Deserialize)]
struct AboutWrapper {
    data: AboutData,
}

#[derive(Debug, Deserialize)]
struct AboutData {
    name: String,
    created_utc: f64,
    // Null for suspended accounts.
    #[serde(default)]
    has_verified_email: Option<bool>,
    is_gold: bool,
    comment_karma: i64,
    link_karma: i64,
}

#[derive(Debug, Deserialize)]
struct ModeratorList {
    data: ModeratorListData,
}

#[derive(Debug, Deserialize)]
struct ModeratorListData {
    children: Vec<ModeratorEntry>,
}

#[derive(Debug, Deserialize)]
struct ModeratorEntry {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_thread_listing() {
        let payload = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "id": "abc123",
                            "title": "Requesting /r/books",
                            "author": "alice",
                            "url": "https://www.reddit.com/r/books",
                            "permalink": "/r/redditrequest/comments/abc123/requesting_rbooks/"
                        }
                    }
                ]
            }
        });

        let listing: Listing<LinkData> = serde_json::from_value(payload).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        assert_eq!(listing.data.children[0].data.id, "abc123");
        assert_eq!(listing.data.children[0].data.author, "alice");
    }

    #[test]
    fn test_parse_about_with_null_verified_email() {
        let payload = json!({
            "kind": "t2",
            "data": {
                "name": "alice",
                "created_utc": 1234567890.0,
                "has_verified_email": null,
                "is_gold": false,
                "comment_karma": 42,
                "link_karma": 7
            }
        });

        let about: AboutWrapper = serde_json::from_value(payload).unwrap();
        assert_eq!(about.data.name, "alice");
        assert_eq!(about.data.has_verified_email, None);
    }

    #[test]
    fn test_parse_activity_listing() {
        let payload = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t1", "data": {"subreddit": "python", "score": 5}},
                    {"kind": "t1", "data": {"subreddit": "askreddit", "score": -2}}
                ]
            }
        });

        let listing: Listing<ActivityData> = serde_json::from_value(payload).unwrap();
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.children[0].data.score, 5);
    }

    #[test]
    fn test_unauthenticated_client_fails_fast() {
        let client = RedditClient::new(
            RedditConfig::default(),
            Credentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                username: "bot_x".to_string(),
                password: "hunter2".to_string(),
            },
        );

        // No token yet: the call must fail before any request is sent.
        let err = tokio_test::block_on(client.fetch_recent_threads("books", 5)).unwrap_err();
        assert!(err.to_string().contains("not authenticated"));
    }

    #[test]
    fn test_flatten_reply_authors_nested_tree() {
        let tree = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "author": "bot_x",
                            "replies": {
                                "kind": "Listing",
                                "data": {
                                    "children": [
                                        {"kind": "t1", "data": {"author": "[deleted]", "replies": ""}}
                                    ]
                                }
                            }
                        }
                    },
                    {"kind": "t1", "data": {"author": "alice", "replies": ""}},
                    {"kind": "more", "data": {}}
                ]
            }
        });

        let mut authors = Vec::new();
        flatten_reply_authors(&tree, &mut authors);

        assert_eq!(
            authors,
            vec![Some("bot_x".to_string()), None, Some("alice".to_string())]
        );
    }
}
