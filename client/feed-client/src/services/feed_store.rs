//! In-memory feed for the current session
//!
//! Every load replaces the whole feed. A failed load empties it; the
//! [`FeedStatus`] keeps "nothing posted yet" apart from "fetch failed".
//!
//! Loads may overlap (pull-to-refresh while a realtime event is being handled).
//! Each load takes a generation ticket and only the newest one may write its
//! result, so an old response arriving late cannot overwrite a newer one.

use echo_common::{CreatePostRequest, Post, PostId, Reaction};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::services::sync_client::FeedApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No load has completed yet
    Idle,
    /// Last load succeeded (the feed may still be empty)
    Loaded,
    /// Last load failed and the feed was cleared
    Failed,
}

/// Copy of the store state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub status: FeedStatus,
}

#[derive(Debug)]
struct FeedState {
    posts: Vec<Post>,
    loading: bool,
    status: FeedStatus,
}

pub struct FeedStore {
    api: Arc<dyn FeedApi>,
    author: String,
    state: RwLock<FeedState>,
    generation: AtomicU64,
}

impl FeedStore {
    pub fn new(api: Arc<dyn FeedApi>, author: &str) -> Self {
        Self {
            api,
            author: author.to_string(),
            state: RwLock::new(FeedState {
                posts: Vec::new(),
                loading: false,
                status: FeedStatus::Idle,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Replace the feed with a fresh fetch.
    ///
    /// Returns the outcome of this call's own fetch. When a newer load started
    /// in the meantime the result is dropped and the loading flag is left for
    /// the newer load to clear.
    pub async fn load(&self) -> FeedStatus {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let outcome = self.api.fetch_all().await;
        let status = match outcome {
            Ok(_) => FeedStatus::Loaded,
            Err(_) => FeedStatus::Failed,
        };

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding superseded feed load");
            return status;
        }

        match outcome {
            Ok(posts) => {
                debug!(count = posts.len(), "Feed replaced");
                state.posts = posts;
            }
            Err(_) => {
                warn!("Feed load failed, clearing feed");
                state.posts.clear();
            }
        }
        state.status = status;
        state.loading = false;

        status
    }

    /// Submit a post, then reload the whole feed.
    ///
    /// A failed submit leaves the feed untouched and skips the reload.
    pub async fn create(&self, content: &str, media: Option<&str>) -> StoreResult<FeedStatus> {
        let request = CreatePostRequest::new(&self.author, content, media);
        self.api.submit(request).await?;

        info!("Post submitted, reloading feed");
        Ok(self.load().await)
    }

    /// Toggle the viewer's reaction on a post (local only).
    pub async fn react(&self, post_id: PostId, reaction: Reaction) -> StoreResult<Post> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;

        post.toggle_reaction(reaction);
        debug!(post_id, reaction = %reaction, active = post.my_reaction.is_some(), "Reaction toggled");
        Ok(post.clone())
    }

    /// Same as [`FeedStore::react`] for a raw symbol from the UI
    pub async fn react_symbol(&self, post_id: PostId, symbol: &str) -> StoreResult<Post> {
        let reaction: Reaction = symbol.parse()?;
        self.react(post_id, reaction).await
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    pub async fn post(&self, post_id: PostId) -> Option<Post> {
        self.state
            .read()
            .await
            .posts
            .iter()
            .find(|post| post.id == post_id)
            .cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn status(&self) -> FeedStatus {
        self.state.read().await.status
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.read().await;
        FeedSnapshot {
            posts: state.posts.clone(),
            loading: state.loading,
            status: state.status,
        }
    }
}
