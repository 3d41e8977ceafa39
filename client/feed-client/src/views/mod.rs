//! Screen models derived from the feed store
//!
//! Each view is plain data plus a `Display` impl used by the terminal
//! front-end. Nothing here talks to the network.

use echo_common::{Post, PostId, Reaction};
use std::fmt;

use crate::services::feed_store::{FeedSnapshot, FeedStatus};

pub const EMPTY_FEED_TEXT: &str = "No posts yet. Be the first!";
pub const FAILED_FEED_TEXT: &str = "Could not load the feed. Pull to refresh.";
pub const PROFILE_PLACEHOLDER_TEXT: &str =
    "The user's profile, posts, follows and settings will appear here.";
pub const COMPOSER_PLACEHOLDER_TEXT: &str = "What's new?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionChip {
    pub reaction: Reaction,
    pub count: u32,
    pub active: bool,
}

impl fmt::Display for ReactionChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active {
            write!(f, "[{} {}]", self.reaction, self.count)
        } else {
            write!(f, "{} {}", self.reaction, self.count)
        }
    }
}

/// One chip per symbol, always in [`Reaction::ALL`] order
pub fn reaction_bar(post: &Post) -> Vec<ReactionChip> {
    Reaction::ALL
        .iter()
        .map(|&reaction| ReactionChip {
            reaction,
            count: post.reaction_count(reaction),
            active: post.is_my_reaction(reaction),
        })
        .collect()
}

struct Chips<'a>(&'a [ReactionChip]);

impl fmt::Display for Chips<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chip) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            write!(f, "{chip}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub id: PostId,
    pub author: String,
    pub content: String,
    pub media: Option<String>,
    pub reactions: Vec<ReactionChip>,
    pub date: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author: post.author.clone(),
            content: post.content.clone(),
            media: post.media.clone(),
            reactions: reaction_bar(post),
            date: post.date.clone(),
        }
    }
}

impl fmt::Display for PostCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {}", self.id, self.author)?;
        writeln!(f, "  {}", self.content)?;
        if let Some(media) = &self.media {
            writeln!(f, "  [image] {media}")?;
        }
        writeln!(f, "  {}", Chips(&self.reactions))?;
        write!(f, "  {}", self.date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Posts(Vec<PostCard>),
    /// No posts to show, with the reason
    Empty(&'static str),
}

impl FeedView {
    pub fn from_snapshot(snapshot: &FeedSnapshot) -> Self {
        if snapshot.loading {
            return FeedView::Loading;
        }

        if snapshot.posts.is_empty() {
            return match snapshot.status {
                FeedStatus::Failed => FeedView::Empty(FAILED_FEED_TEXT),
                FeedStatus::Idle | FeedStatus::Loaded => FeedView::Empty(EMPTY_FEED_TEXT),
            };
        }

        FeedView::Posts(snapshot.posts.iter().map(PostCard::from).collect())
    }
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedView::Loading => f.write_str("Loading..."),
            FeedView::Empty(text) => f.write_str(text),
            FeedView::Posts(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n\n")?;
                    }
                    write!(f, "{card}")?;
                }
                Ok(())
            }
        }
    }
}

/// Full-size single post
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetailView {
    pub card: PostCard,
}

impl From<&Post> for PostDetailView {
    fn from(post: &Post) -> Self {
        Self {
            card: PostCard::from(post),
        }
    }
}

impl fmt::Display for PostDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<- Back")?;
        write!(f, "{}", self.card)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub author: String,
    pub info: &'static str,
}

impl ProfileView {
    pub fn new(author: &str) -> Self {
        Self {
            author: author.to_string(),
            info: PROFILE_PLACEHOLDER_TEXT,
        }
    }
}

impl fmt::Display for ProfileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<- Back")?;
        writeln!(f, "{}", self.author)?;
        f.write_str(self.info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub text: String,
    pub media: Option<String>,
    /// Publish button enabled
    pub can_publish: bool,
}

impl fmt::Display for ComposerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<- Back")?;
        writeln!(f, "New post")?;
        if self.text.is_empty() {
            writeln!(f, "{COMPOSER_PLACEHOLDER_TEXT}")?;
        } else {
            writeln!(f, "{}", self.text)?;
        }
        if let Some(media) = &self.media {
            writeln!(f, "[image] {media}")?;
        }
        f.write_str(if self.can_publish { "[Publish]" } else { "(Publish)" })
    }
}
