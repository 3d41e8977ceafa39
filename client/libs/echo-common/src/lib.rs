//! Echo Common Library
//!
//! Shared data contract for Echo feed clients (mobile and web front-ends).
//! Mirrors the JSON records exchanged with the feed API.

pub mod error;
pub mod models;
pub mod reaction;

pub use error::ModelError;
pub use models::{CreatePostRequest, Post, PostId};
pub use reaction::{Reaction, ReactionCounts};
