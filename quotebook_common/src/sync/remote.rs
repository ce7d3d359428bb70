//! Remote endpoint payloads and client.
//!
//! The endpoint speaks a placeholder "posts" shape: records are read as
//! `{id, userId, title, body}` and written as `{title, body, userId}`. A remote
//! post maps to a quote with `title` as the text and an identifier shifted into
//! the remote range.
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::quote::{Quote, REMOTE_ID_BASE};
use crate::result::Result;

/// Category assigned to quotes merged from the remote endpoint.
pub const REMOTE_CATEGORY: &str = "Remote";

/// Record returned by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    /// Remote identifier.
    pub id: u64,
    /// Owning user on the remote side.
    #[serde(default)]
    pub user_id: u64,
    /// Used as the quote text.
    pub title: String,
    /// Ignored on merge.
    #[serde(default)]
    pub body: String,
}

impl RemotePost {
    /// Local identifier this post maps to.
    pub fn local_id(&self) -> u64 {
        REMOTE_ID_BASE.saturating_add(self.id)
    }

    /// Converts the post into a quote in the remote id range.
    pub fn into_quote(self) -> Quote {
        Quote {
            id: Some(self.local_id()),
            text: self.title,
            category: REMOTE_CATEGORY.to_string(),
        }
    }
}

/// Record sent to the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Quote text.
    pub title: String,
    /// Quote category.
    pub body: String,
    /// Configured user id.
    pub user_id: u64,
}

impl NewPost {
    /// Builds the outgoing record for `quote`.
    pub fn from_quote(quote: &Quote, user_id: u64) -> Self {
        Self {
            title: quote.text.clone(),
            body: quote.category.clone(),
            user_id,
        }
    }
}

/// Access to the remote endpoint.
pub trait RemoteClient: Send + Sync {
    /// Fetches at most `limit` records.
    fn fetch_batch(&self, limit: usize) -> Result<Vec<RemotePost>>;
    /// Sends one record. The response body is not inspected.
    fn push(&self, post: &NewPost) -> Result<()>;
}

/// Blocking HTTP client for the remote endpoint.
pub struct HttpRemote {
    client: Client,
    endpoint: String,
}

impl HttpRemote {
    /// Creates a client for `endpoint` with the given request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteClient for HttpRemote {
    fn fetch_batch(&self, limit: usize) -> Result<Vec<RemotePost>> {
        debug!("GET {} (limit {})", self.endpoint, limit);
        let mut posts: Vec<RemotePost> = self
            .client
            .get(&self.endpoint)
            .query(&[("_limit", limit)])
            .send()?
            .error_for_status()?
            .json()?;
        // Not every server honours `_limit`.
        posts.truncate(limit);
        Ok(posts)
    }

    fn push(&self, post: &NewPost) -> Result<()> {
        debug!("POST {} {:?}", self.endpoint, post.title);
        self.client
            .post(&self.endpoint)
            .json(post)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_post_deserializes_placeholder_shape() {
        let json = r#"{"userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto"}"#;
        let post: RemotePost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 3);
        assert_eq!(post.user_id, 1);

        let quote = post.into_quote();
        assert_eq!(quote.id, Some(REMOTE_ID_BASE + 3));
        assert_eq!(quote.text, "ea molestias");
        assert_eq!(quote.category, REMOTE_CATEGORY);
        assert!(!quote.is_local());
    }

    #[test]
    fn test_new_post_serializes_user_id_in_camel_case() {
        let quote = Quote::new("Be brief.", "Style").unwrap();
        let json = serde_json::to_value(NewPost::from_quote(&quote, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Be brief.", "body": "Style", "userId": 1})
        );
    }

    #[test]
    fn test_http_remote_builds() {
        let remote = HttpRemote::new("http://localhost:1/posts", Duration::from_secs(1)).unwrap();
        assert_eq!(remote.endpoint(), "http://localhost:1/posts");
    }
}
