//! Navigation and composer state for one app session

use echo_common::{Post, PostId, Reaction};
use std::sync::Arc;
use tracing::debug;

use crate::error::StoreResult;
use crate::services::feed_store::{FeedStatus, FeedStore};
use crate::theme::ThemeSettings;
use crate::views::{ComposerView, FeedView, PostDetailView, ProfileView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Feed,
    Profile(String),
    Post(PostId),
    Create,
}

/// Draft of the post being written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    pub text: String,
    pub media: Option<String>,
}

impl Composer {
    pub fn can_publish(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn view(&self) -> ComposerView {
        ComposerView {
            text: self.text.clone(),
            media: self.media.clone(),
            can_publish: self.can_publish(),
        }
    }
}

/// Outcome of [`FeedSession::publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Blank draft, nothing sent
    Skipped,
    Published(FeedStatus),
    /// Already logged by the sync client
    Failed,
}

pub struct FeedSession {
    store: Arc<FeedStore>,
    screen: Screen,
    composer: Composer,
    theme: ThemeSettings,
}

impl FeedSession {
    pub fn new(store: Arc<FeedStore>, theme: ThemeSettings) -> Self {
        Self {
            store,
            screen: Screen::Feed,
            composer: Composer::default(),
            theme,
        }
    }

    pub fn store(&self) -> &Arc<FeedStore> {
        &self.store
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn theme(&self) -> &ThemeSettings {
        &self.theme
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.theme.set_dark_mode(dark);
    }

    pub fn open_profile(&mut self, author: &str) {
        self.screen = Screen::Profile(author.to_string());
    }

    pub fn view_post(&mut self, post_id: PostId) {
        self.screen = Screen::Post(post_id);
    }

    pub fn open_composer(&mut self) {
        self.screen = Screen::Create;
    }

    pub fn back(&mut self) {
        self.screen = Screen::Feed;
    }

    /// Pull-to-refresh
    pub async fn refresh(&self) -> FeedStatus {
        self.store.load().await
    }

    /// Send the draft. A blank draft is ignored; otherwise the text is cleared
    /// and the session returns to the feed whether or not the publish worked.
    pub async fn publish(&mut self) -> PublishOutcome {
        if !self.composer.can_publish() {
            debug!("Ignoring publish of blank draft");
            return PublishOutcome::Skipped;
        }

        let text = std::mem::take(&mut self.composer.text);
        let media = self.composer.media.take();

        let outcome = match self.store.create(&text, media.as_deref()).await {
            Ok(status) => PublishOutcome::Published(status),
            Err(_) => PublishOutcome::Failed,
        };

        self.screen = Screen::Feed;
        outcome
    }

    pub async fn react(&self, post_id: PostId, reaction: Reaction) -> StoreResult<Post> {
        self.store.react(post_id, reaction).await
    }

    pub async fn feed_view(&self) -> FeedView {
        FeedView::from_snapshot(&self.store.snapshot().await)
    }

    /// Selected post, if it survived the last reload
    pub async fn post_view(&self) -> Option<PostDetailView> {
        match self.screen {
            Screen::Post(post_id) => self
                .store
                .post(post_id)
                .await
                .as_ref()
                .map(PostDetailView::from),
            _ => None,
        }
    }

    pub fn profile_view(&self) -> Option<ProfileView> {
        match &self.screen {
            Screen::Profile(author) => Some(ProfileView::new(author)),
            _ => None,
        }
    }
}
