//! Feed data models shared between the sync client and the presentation layer
//!
//! Field names follow the JSON emitted by the feed API (`myReaction` is camelCase,
//! everything else is a single word).

use serde::{Deserialize, Deserializer, Serialize};

use crate::reaction::{self, Reaction, ReactionCounts};

/// Identifier assigned by the feed API
pub type PostId = i64;

/// A single feed entry
///
/// Decoding goes through `PostRecord` so that an active `myReaction` is
/// always backed by a count of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PostRecord")]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub content: String,
    /// Attached image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    pub reactions: ReactionCounts,
    /// The viewer's own reaction, at most one per post
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_reaction: Option<Reaction>,
    pub date: String,
}

/// Post as sent by the feed API, before the reaction counts are reconciled
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    id: PostId,
    author: String,
    content: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    media: Option<String>,
    #[serde(default)]
    reactions: ReactionCounts,
    #[serde(default, deserialize_with = "reaction::deserialize_lenient")]
    my_reaction: Option<Reaction>,
    date: String,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let mut reactions = record.reactions;
        // The API may report the viewer's reaction without counting it
        if let Some(mine) = record.my_reaction {
            if reactions.get(mine) == 0 {
                reactions.increment(mine);
            }
        }

        Self {
            id: record.id,
            author: record.author,
            content: record.content,
            media: record.media,
            reactions,
            my_reaction: record.my_reaction,
            date: record.date,
        }
    }
}

impl Post {
    /// Toggle the viewer's reaction.
    ///
    /// Selecting the active symbol clears it; selecting another one moves the
    /// viewer's vote, so the count of the old symbol drops by one and the new
    /// one gains one.
    pub fn toggle_reaction(&mut self, reaction: Reaction) {
        match self.my_reaction {
            Some(current) if current == reaction => {
                self.reactions.decrement(current);
                self.my_reaction = None;
            }
            Some(current) => {
                self.reactions.decrement(current);
                self.reactions.increment(reaction);
                self.my_reaction = Some(reaction);
            }
            None => {
                self.reactions.increment(reaction);
                self.my_reaction = Some(reaction);
            }
        }
    }

    pub fn reaction_count(&self, reaction: Reaction) -> u32 {
        self.reactions.get(reaction)
    }

    pub fn is_my_reaction(&self, reaction: Reaction) -> bool {
        self.my_reaction == Some(reaction)
    }
}

/// Body of `POST /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl CreatePostRequest {
    pub fn new(author: &str, content: &str, media: Option<&str>) -> Self {
        Self {
            author: author.to_string(),
            content: content.to_string(),
            media: media.map(str::to_string),
        }
    }
}

// The API stores missing media as an empty string
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: 7,
            author: "alice".to_string(),
            content: "hello".to_string(),
            media: None,
            reactions: ReactionCounts::new(),
            my_reaction: None,
            date: "2025-05-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_post_deserializes_minimal_record() {
        let json = r#"{
            "id": 1,
            "author": "alice",
            "content": "first",
            "date": "2025-05-01 10:00:00"
        }"#;

        let post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        assert_eq!(post.id, 1);
        assert_eq!(post.media, None);
        assert!(post.reactions.is_empty());
        assert_eq!(post.my_reaction, None);
    }

    #[test]
    fn test_post_deserializes_full_record() {
        let json = r#"{
            "id": 2,
            "author": "bob",
            "content": "with picture",
            "media": "https://example.com/cat.jpg",
            "reactions": {"🔥": 4, "⭐": 1},
            "myReaction": "🔥",
            "date": "2025-05-01 11:00:00"
        }"#;

        let post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        assert_eq!(post.media.as_deref(), Some("https://example.com/cat.jpg"));
        assert_eq!(post.reaction_count(Reaction::Fire), 4);
        assert_eq!(post.reaction_count(Reaction::Star), 1);
        assert!(post.is_my_reaction(Reaction::Fire));
    }

    #[test]
    fn test_empty_media_and_nulls_read_as_absent() {
        let json = r#"{
            "id": 3,
            "author": "carol",
            "content": "no media",
            "media": "",
            "reactions": null,
            "myReaction": null,
            "date": "2025-05-01 12:00:00"
        }"#;

        let post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        assert_eq!(post.media, None);
        assert!(post.reactions.is_empty());
        assert_eq!(post.my_reaction, None);
    }

    #[test]
    fn test_unknown_my_reaction_is_dropped() {
        let json = r#"{"id": 4, "author": "d", "content": "x", "myReaction": "🙂", "date": "t"}"#;
        let post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");
        assert_eq!(post.my_reaction, None);
    }

    #[test]
    fn toggle_same_reaction_twice_restores_state() {
        let mut post = sample_post();
        post.reactions.increment(Reaction::Star);
        let original = post.clone();

        post.toggle_reaction(Reaction::ThumbsUp);
        assert_eq!(post.my_reaction, Some(Reaction::ThumbsUp));
        assert_eq!(post.reaction_count(Reaction::ThumbsUp), 1);

        post.toggle_reaction(Reaction::ThumbsUp);
        assert_eq!(post, original);
    }

    #[test]
    fn switching_reaction_moves_the_vote() {
        let mut post = sample_post();
        post.toggle_reaction(Reaction::Fire);
        post.toggle_reaction(Reaction::Star);

        assert_eq!(post.my_reaction, Some(Reaction::Star));
        assert_eq!(post.reaction_count(Reaction::Fire), 0);
        assert_eq!(post.reaction_count(Reaction::Star), 1);
    }

    #[test]
    fn at_most_one_reaction_is_active() {
        let mut post = sample_post();
        let sequence = [
            Reaction::Fire,
            Reaction::Fire,
            Reaction::Star,
            Reaction::Repost,
            Reaction::MendingHeart,
            Reaction::MendingHeart,
            Reaction::Surprised,
        ];

        for reaction in sequence {
            post.toggle_reaction(reaction);
            let active = Reaction::ALL
                .iter()
                .filter(|r| post.is_my_reaction(**r))
                .count();
            assert!(active <= 1);
            assert!(post.reactions.total() <= 1);
        }
    }

    #[test]
    fn test_uncounted_my_reaction_is_counted_on_decode() {
        let json = r#"{"id": 5, "author": "e", "content": "x", "myReaction": "🔥", "date": "t"}"#;
        let mut post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        assert_eq!(post.my_reaction, Some(Reaction::Fire));
        assert_eq!(post.reaction_count(Reaction::Fire), 1);

        let original = post.clone();
        post.toggle_reaction(Reaction::Fire);
        assert_eq!(post.my_reaction, None);
        assert_eq!(post.reaction_count(Reaction::Fire), 0);

        post.toggle_reaction(Reaction::Fire);
        assert_eq!(post, original);
    }

    #[test]
    fn test_toggle_at_max_count_does_not_overflow() {
        let json = r#"{"id": 6, "author": "f", "content": "x", "reactions": {"🔥": 4294967295}, "date": "t"}"#;
        let mut post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        post.toggle_reaction(Reaction::Fire);
        assert_eq!(post.reaction_count(Reaction::Fire), u32::MAX);
        assert_eq!(post.my_reaction, Some(Reaction::Fire));
    }

    #[test]
    fn test_create_request_omits_absent_media() {
        let request = CreatePostRequest::new("Anon", "hello", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json, serde_json::json!({"author": "Anon", "content": "hello"}));
    }

    #[test]
    fn test_create_request_includes_media() {
        let request = CreatePostRequest::new("Anon", "look", Some("https://example.com/a.png"));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["media"], "https://example.com/a.png");
    }
}
