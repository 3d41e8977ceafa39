//! Reaction symbols and per-post reaction counters
//!
//! The symbol set is closed: anything the API sends outside of it is dropped
//! on decode instead of failing the whole feed.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Emoji reaction a viewer may attach to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reaction {
    ThumbsUp,
    Fire,
    Surprised,
    MendingHeart,
    Repost,
    Star,
}

impl Reaction {
    /// All symbols in display order
    pub const ALL: [Reaction; 6] = [
        Reaction::ThumbsUp,
        Reaction::Fire,
        Reaction::Surprised,
        Reaction::MendingHeart,
        Reaction::Repost,
        Reaction::Star,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "\u{1F44D}",
            Reaction::Fire => "\u{1F525}",
            Reaction::Surprised => "\u{1F62E}",
            Reaction::MendingHeart => "\u{2764}\u{FE0F}\u{200D}\u{1FA79}",
            Reaction::Repost => "\u{1F501}",
            Reaction::Star => "\u{2B50}",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reaction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reaction::ALL
            .into_iter()
            .find(|reaction| reaction.as_str() == s)
            .ok_or_else(|| ModelError::UnknownReaction(s.to_string()))
    }
}

impl Serialize for Reaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Reaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReactionVisitor;

        impl Visitor<'_> for ReactionVisitor {
            type Value = Reaction;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a reaction symbol")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Reaction, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ReactionVisitor)
    }
}

/// Decode an optional reaction, treating unknown symbols as "no reaction"
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Reaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|symbol| symbol.parse().ok()))
}

/// Non-negative count per reaction symbol.
///
/// Zero counts are never stored, so a missing key and a zero count compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReactionCounts(BTreeMap<Reaction, u32>);

impl ReactionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reaction: Reaction) -> u32 {
        self.0.get(&reaction).copied().unwrap_or(0)
    }

    /// Saturates at `u32::MAX`
    pub fn increment(&mut self, reaction: Reaction) {
        let count = self.0.entry(reaction).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Saturates at zero
    pub fn decrement(&mut self, reaction: Reaction) {
        if let Some(count) = self.0.get_mut(&reaction) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.0.remove(&reaction);
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|count| u64::from(*count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reaction, u32)> + '_ {
        self.0.iter().map(|(reaction, count)| (*reaction, *count))
    }
}

impl FromIterator<(Reaction, u32)> for ReactionCounts {
    fn from_iter<I: IntoIterator<Item = (Reaction, u32)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (reaction, count) in iter {
            if count > 0 {
                let total = counts.entry(reaction).or_insert(0u32);
                *total = total.saturating_add(count);
            }
        }
        Self(counts)
    }
}

impl<'de> Deserialize<'de> for ReactionCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<HashMap<String, u32>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(symbol, count)| symbol.parse().ok().map(|reaction| (reaction, count)))
            .collect())
    }
}
