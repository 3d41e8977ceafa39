//! HTTP client for the feed API
//!
//! GET  {base}/posts - full feed, oldest first
//! POST {base}/posts - publish a post
//!
//! Every failure is traced and written to the diagnostic log here, then
//! collapsed into [`SyncFailure`] for the caller.

use async_trait::async_trait;
use echo_common::{CreatePostRequest, Post};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::diagnostics::ErrorLog;
use crate::error::{ClientError, SyncFailure};

/// Remote feed operations used by the feed store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// All posts, newest first
    async fn fetch_all(&self) -> Result<Vec<Post>, SyncFailure>;

    /// Publish a post; the response body is not interpreted
    async fn submit(&self, request: CreatePostRequest) -> Result<(), SyncFailure>;
}

pub struct SyncClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    error_log: ErrorLog,
}

impl SyncClient {
    pub fn new(base_url: &str, timeout: Duration, error_log: ErrorLog) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            error_log,
        })
    }

    pub fn from_config(config: &Config, error_log: ErrorLog) -> Result<Self, ClientError> {
        Self::new(&config.api_base_url, config.request_timeout(), error_log)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    /// `GET /posts` in the order the API returns them
    pub async fn request_posts(&self) -> Result<Vec<Post>, ClientError> {
        let url = self.posts_url();
        debug!(url = %url, "Fetching posts");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let posts: Vec<Post> = serde_json::from_slice(&bytes)?;
        Ok(posts)
    }

    /// `POST /posts`; any 2xx counts as published
    pub async fn publish(&self, request: &CreatePostRequest) -> Result<(), ClientError> {
        let url = self.posts_url();

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Whether the feed endpoint answers with a 2xx
    pub async fn health_check(&self) -> bool {
        match self.client.get(self.posts_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl FeedApi for SyncClient {
    async fn fetch_all(&self) -> Result<Vec<Post>, SyncFailure> {
        match self.request_posts().await {
            Ok(mut posts) => {
                posts.reverse();
                debug!(count = posts.len(), "Fetched posts");
                Ok(posts)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch posts");
                self.error_log.record(format!("Failed to load posts: {e}"));
                Err(SyncFailure)
            }
        }
    }

    async fn submit(&self, request: CreatePostRequest) -> Result<(), SyncFailure> {
        info!(author = %request.author, has_media = request.media.is_some(), "Publishing post");

        match self.publish(&request).await {
            Ok(()) => {
                info!("Post published");
                Ok(())
            }
            Err(ClientError::Status { status, body }) => {
                error!(status, body = %body, "Post rejected by feed API");
                self.error_log
                    .record(format!("Failed to publish post: {body}"));
                Err(SyncFailure)
            }
            Err(e) => {
                error!(error = %e, "Network error while publishing post");
                self.error_log
                    .record(format!("Network error while publishing post: {e}"));
                Err(SyncFailure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_client_creation_trims_trailing_slash() {
        let client = SyncClient::new(
            "http://localhost:8080/",
            Duration::from_secs(5),
            ErrorLog::new("error-log.txt"),
        )
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.posts_url(), "http://localhost:8080/posts");
    }
}
