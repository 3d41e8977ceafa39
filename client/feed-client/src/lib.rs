pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod services;
pub mod session;
pub mod theme;
pub mod views;

pub use config::Config;
pub use diagnostics::ErrorLog;
pub use error::{ClientError, StoreError, StoreResult, SyncFailure};
pub use services::{FeedApi, FeedSnapshot, FeedStatus, FeedStore, SyncClient};
pub use session::{FeedSession, Screen};
