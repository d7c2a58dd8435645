//! Stateless pass-through client
//!
//! [`StatelessTickLog`] retains no tick history at all: ticks and events
//! are handed straight to live subscribers and forgotten. The one thing
//! it remembers is the frame-0 start point, so a replay can always
//! restart from the beginning. Useful for sessions that are watched live
//! and never rewound.

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use crate::error::TickLogError;
use crate::event::Event;
use crate::tick::{Age, StartPoint, Tick, TickRange};
use crate::{Permission, TickProvider};

const SUBSCRIBER_CAPACITY: usize = 64;

/// Pass-through client that retains no history
pub struct StatelessTickLog {
    zeroth_start_point: RwLock<Option<StartPoint>>,
    tick_tx: broadcast::Sender<Tick>,
    event_tx: broadcast::Sender<Event>,
}

impl Default for StatelessTickLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StatelessTickLog {
    pub fn new() -> Self {
        let (tick_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        let (event_tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            zeroth_start_point: RwLock::new(None),
            tick_tx,
            event_tx,
        }
    }

    /// Every token resolves to the same fixed permission set: write and
    /// read, no tick subscription
    pub fn authenticate(&self, _token: &str) -> Result<Permission, TickLogError> {
        Ok(Permission {
            write_tick: true,
            read_tick: true,
            subscribe_tick: false,
            send_event: false,
            subscribe_event: true,
            max_event_priority: 2,
        })
    }

    /// Subscribe to ticks as they pass through
    pub fn subscribe_ticks(&self) -> broadcast::Receiver<Tick> {
        self.tick_tx.subscribe()
    }

    /// Subscribe to events as they pass through
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}

#[async_trait]
impl TickProvider for StatelessTickLog {
    async fn send_tick(&self, tick: Tick) -> Result<(), TickLogError> {
        let _ = self.tick_tx.send(tick);
        Ok(())
    }

    async fn send_event(&self, event: Event) -> Result<(), TickLogError> {
        let _ = self.event_tx.send(event);
        Ok(())
    }

    /// This client keeps no history to query
    async fn query(&self, _begin: Age, _end: Age) -> Result<Option<TickRange>, TickLogError> {
        Err(TickLogError::Unsupported("query"))
    }

    /// Only the frame-0 start point is retained; anything else is
    /// accepted and discarded
    async fn put_start_point(&self, start_point: StartPoint) -> Result<(), TickLogError> {
        if start_point.frame == 0 {
            *self.zeroth_start_point.write().await = Some(start_point);
        }
        Ok(())
    }

    async fn get_start_point(&self, _frame: Option<Age>) -> Result<StartPoint, TickLogError> {
        self.zeroth_start_point
            .read()
            .await
            .clone()
            .ok_or(TickLogError::NoStartPoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCode, EventFlags};

    fn join_event(player: &str) -> Event {
        Event::new(EventCode::Join, EventFlags::new(0b0011), player)
    }

    #[tokio::test]
    async fn test_ticks_pass_through_without_being_stored() {
        let log = StatelessTickLog::new();
        let mut ticks = log.subscribe_ticks();

        log.send_tick(Tick::new(5, vec![join_event("p1")])).await.unwrap();
        log.send_tick(Tick::new(10, vec![join_event("p2")])).await.unwrap();

        assert_eq!(ticks.recv().await.unwrap().age, 5);
        assert_eq!(ticks.recv().await.unwrap().age, 10);
        assert!(matches!(
            log.query(0, 20).await,
            Err(TickLogError::Unsupported("query"))
        ));
    }

    #[tokio::test]
    async fn test_events_pass_through() {
        let log = StatelessTickLog::new();
        let mut events = log.subscribe_events();

        let ev = join_event("p1");
        log.send_event(ev.clone()).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), ev);
    }

    #[tokio::test]
    async fn test_only_zeroth_start_point_is_kept() {
        let log = StatelessTickLog::new();
        assert!(matches!(
            log.get_start_point(None).await,
            Err(TickLogError::NoStartPoint)
        ));

        log.put_start_point(StartPoint::new(5, 100.0, serde_json::json!({ "seed": 1 })))
            .await
            .unwrap();
        assert!(matches!(
            log.get_start_point(None).await,
            Err(TickLogError::NoStartPoint)
        ));

        let zeroth = StartPoint::new(0, 0.0, serde_json::json!({ "seed": 14 }));
        log.put_start_point(zeroth.clone()).await.unwrap();
        assert_eq!(log.get_start_point(None).await.unwrap(), zeroth);
        assert_eq!(log.get_start_point(Some(30)).await.unwrap(), zeroth);
    }

    #[tokio::test]
    async fn test_authenticate_grants_fixed_permission() {
        let log = StatelessTickLog::new();
        let perm = log.authenticate("any-token").unwrap();
        assert!(perm.write_tick);
        assert!(!perm.subscribe_tick);
        assert_eq!(perm.max_event_priority, 2);
    }
}
