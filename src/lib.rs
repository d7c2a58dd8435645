//! # Tickflow
//!
//! In-memory tick log storage and replay merging for deterministic
//! session playback.
//!
//! A running session records one [`Tick`] per frame: the ordered list of
//! events accepted for that frame, keyed by a monotonically increasing
//! age. Replaying the session re-applies the recorded ticks in order,
//! starting either from age 0 or from a recovery [`StartPoint`]
//! snapshot.
//!
//! ## Key Traits
//!
//! - [`TickProvider`]: Abstraction over a tick log source, consumed both
//!   by session callers and by the replay proxy as its upstream handle
//!
//! ## Key Types
//!
//! - [`MemoryTickLog`]: Authoritative in-memory log for a single session
//! - [`ReplayTickProxy`]: Presents one logical log stitched together from
//!   a locally known prefix and an upstream provider
//! - [`StatelessTickLog`]: Pass-through client that retains no history
//! - [`calculate_finished_time`]: Estimates the wall-clock duration of a
//!   finished session from its recorded log

pub mod error;
pub mod event;
pub mod finish_time;
pub mod memory;
pub mod replay;
pub mod stateless;
pub mod tick;

mod state;

// Re-export main types
pub use error::*;
pub use event::*;
pub use finish_time::*;
pub use memory::*;
pub use replay::*;
pub use stateless::*;
pub use tick::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Permissions granted to an authenticated session client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// May append ticks to the log
    pub write_tick: bool,
    /// May query recorded tick ranges
    pub read_tick: bool,
    /// May subscribe to live tick delivery
    pub subscribe_tick: bool,
    /// May submit out-of-band events
    pub send_event: bool,
    /// May subscribe to live event delivery
    pub subscribe_event: bool,
    /// Highest event priority this client may use
    pub max_event_priority: u8,
}

/// A source of session ticks and start points
///
/// Implemented by the in-memory store, the stateless client and the
/// replay proxy; the proxy also consumes one as its upstream handle.
/// `query` is the only operation expected to suspend for I/O in a real
/// deployment.
#[async_trait]
pub trait TickProvider: Send + Sync {
    /// Append a tick to the log
    ///
    /// Ages must strictly increase across calls; an age at or below the
    /// current log end fails with [`TickLogError::OutOfOrder`].
    async fn send_tick(&self, tick: Tick) -> Result<(), TickLogError>;

    /// Submit an out-of-band event for delivery
    async fn send_event(&self, event: Event) -> Result<(), TickLogError>;

    /// Query the recorded ticks covering `begin..=end`
    ///
    /// `Ok(None)` signals that no data exists at all, as opposed to a
    /// range that legitimately contains no events.
    async fn query(&self, begin: Age, end: Age) -> Result<Option<TickRange>, TickLogError>;

    /// Insert or replace the start point for its frame
    async fn put_start_point(&self, start_point: StartPoint) -> Result<(), TickLogError>;

    /// Fetch the start point with the greatest frame at or before
    /// `frame`, or the most recent one known when `frame` is `None`
    async fn get_start_point(&self, frame: Option<Age>) -> Result<StartPoint, TickLogError>;
}
