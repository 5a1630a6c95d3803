//! Client for the Yahoo! JAPAN realtime search site.
//!
//! Fetches tweet listings, reply threads, trend snapshots and volume
//! transitions, and pages through results with explicit cursors. Every
//! request is a single GET; failures surface as [`RealtimeError`] without
//! retries.
//!
//! ```no_run
//! use buzz_realtime::{ClientSettings, RealtimeClient, SearchOptions};
//!
//! # async fn run() -> buzz_realtime::Result<()> {
//! let client = RealtimeClient::new(&ClientSettings::default())?;
//! let mut search = client.search("rust", SearchOptions::default()).await?;
//! let older = search.fetch_more(2).await?;
//! let newer = search.fetch_latest().await?;
//! # let _ = (older, newer);
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod record;
pub mod replies;
pub mod search;
pub mod transition;
pub mod transport;
pub mod trend;
mod types;

pub use client::{ClientSettings, DEFAULT_BASE_URL, RealtimeClient};
pub use cursor::{Bound, Direction, Page, ReplyCursor, SearchCursor, SortMode, sort_newest_first};
pub use error::{RealtimeError, Result};
pub use extract::{PayloadExtractor, ScriptTagExtractor};
pub use record::{Media, Tweet};
pub use replies::ReplyThread;
pub use search::{Search, SearchOptions};
pub use transition::{TransitionEntry, TransitionOptions, VolumeTransition};
pub use transport::{Endpoint, HttpTransport, Transport};
pub use trend::{PopularTweet, TrendSnapshot, TrendTerm};
