//! In-memory tick log
//!
//! [`MemoryTickLog`] is the authoritative log for a single session: it
//! accepts ticks from a live sender, filters transient events, serves
//! range queries and start points, and supports rollback. It retains
//! everything until truncated, which also makes it suitable as the
//! upstream side of a [`ReplayTickProxy`](crate::replay::ReplayTickProxy)
//! in tests and local playback setups.

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::error::TickLogError;
use crate::event::Event;
use crate::state::LogState;
use crate::tick::{Age, LogDump, StartPoint, Tick, TickRange};
use crate::{Permission, TickProvider};

/// Buffered messages per live subscriber before it starts lagging
const SUBSCRIBER_CAPACITY: usize = 64;

/// Authoritative in-memory log for a single session
pub struct MemoryTickLog {
    state: RwLock<LogState>,
    /// Out-of-band events submitted via `send_event`, in arrival order
    pending_events: RwLock<Vec<Event>>,
    tick_tx: broadcast::Sender<Tick>,
    event_tx: broadcast::Sender<Event>,
}

impl Default for MemoryTickLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTickLog {
    /// Token granting the active (writer) permission set
    pub const TOKEN_ACTIVE: &'static str = "tickflow:active";
    /// Token granting the passive (subscriber) permission set
    pub const TOKEN_PASSIVE: &'static str = "tickflow:passive";

    /// Create an empty log
    pub fn new() -> Self {
        Self::with_log(None, Vec::new())
    }

    /// Create a log pre-seeded with an already recorded range and its
    /// start points
    pub fn with_log(range: Option<TickRange>, start_points: Vec<StartPoint>) -> Self {
        let (tick_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        let (event_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            state: RwLock::new(LogState::seeded(range, start_points)),
            pending_events: RwLock::new(Vec::new()),
            tick_tx,
            event_tx,
        }
    }

    /// Resolve a token to the permission set it grants
    ///
    /// The active token is for the single writer driving the session;
    /// the passive token is for followers that watch ticks live.
    pub fn authenticate(&self, token: &str) -> Result<Permission, TickLogError> {
        match token {
            Self::TOKEN_ACTIVE => Ok(Permission {
                write_tick: true,
                read_tick: true,
                subscribe_tick: false,
                send_event: false,
                subscribe_event: true,
                max_event_priority: 2,
            }),
            Self::TOKEN_PASSIVE => Ok(Permission {
                write_tick: false,
                read_tick: true,
                subscribe_tick: true,
                send_event: true,
                subscribe_event: false,
                max_event_priority: 2,
            }),
            _ => Err(TickLogError::InvalidToken),
        }
    }

    /// Subscribe to ticks as they are accepted
    pub fn subscribe_ticks(&self) -> broadcast::Receiver<Tick> {
        self.tick_tx.subscribe()
    }

    /// Subscribe to out-of-band events as they are submitted
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Roll the log back so nothing at or after `age` remains
    ///
    /// Start points at or after `age` are discarded with the ticks.
    /// Calling with an age beyond the current end is a no-op.
    pub async fn drop_after(&self, age: Age) {
        self.state.write().await.drop_after(age);
    }

    /// Out-of-band events received so far, in arrival order
    pub async fn pending_events(&self) -> Vec<Event> {
        self.pending_events.read().await.clone()
    }

    /// Dump the recorded range and start points for hand-off
    pub async fn dump(&self) -> LogDump {
        self.state.read().await.dump()
    }
}

#[async_trait]
impl TickProvider for MemoryTickLog {
    async fn send_tick(&self, tick: Tick) -> Result<(), TickLogError> {
        self.state.write().await.append(tick.clone())?;
        debug!(age = tick.age, "accepted tick");
        // Live subscribers see the tick as sent, before filtering
        let _ = self.tick_tx.send(tick);
        Ok(())
    }

    async fn send_event(&self, event: Event) -> Result<(), TickLogError> {
        self.pending_events.write().await.push(event.clone());
        let _ = self.event_tx.send(event);
        Ok(())
    }

    async fn query(&self, begin: Age, end: Age) -> Result<Option<TickRange>, TickLogError> {
        Ok(self.state.read().await.clip(begin, end))
    }

    async fn put_start_point(&self, start_point: StartPoint) -> Result<(), TickLogError> {
        debug!(frame = start_point.frame, "stored start point");
        self.state.write().await.put_start_point(start_point);
        Ok(())
    }

    async fn get_start_point(&self, frame: Option<Age>) -> Result<StartPoint, TickLogError> {
        self.state.read().await.start_point(frame)
    }
}
