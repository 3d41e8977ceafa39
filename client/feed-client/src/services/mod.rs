pub mod feed_store;
pub mod realtime;
pub mod sync_client;

pub use feed_store::{FeedSnapshot, FeedStatus, FeedStore};
pub use realtime::{
    spawn_feed_refresher, spawn_realtime, start_realtime, CentrifugoListener, FeedEvent,
    RealtimeHandle, RealtimeListener,
};
pub use sync_client::{FeedApi, SyncClient};
