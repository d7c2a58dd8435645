//! Replay merge proxy
//!
//! [`ReplayTickProxy`] presents one logical tick log that is the
//! concatenation of a locally known, immutable-unless-truncated prefix
//! and an upstream provider's data. Requests fully covered by local
//! knowledge are answered without I/O; anything else triggers exactly
//! one upstream round trip, whose result is merged with the local
//! entries. Local data is finalized history and always wins for ages it
//! covers; upstream only fills in what the proxy does not yet know.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::TickLogError;
use crate::event::Event;
use crate::state::LogState;
use crate::tick::{Age, StartPoint, Tick, TickRange};
use crate::TickProvider;

/// A tick log stitched together from a local prefix and an upstream
/// provider
pub struct ReplayTickProxy {
    upstream: Arc<dyn TickProvider>,
    state: RwLock<LogState>,
}

impl ReplayTickProxy {
    /// Create a proxy over `upstream`, seeded with the log prefix and
    /// start points already known to the caller
    pub fn new(
        upstream: Arc<dyn TickProvider>,
        range: Option<TickRange>,
        start_points: Vec<StartPoint>,
    ) -> Self {
        Self {
            upstream,
            state: RwLock::new(LogState::seeded(range, start_points)),
        }
    }

    /// Roll the local prefix back so nothing at or after `age` remains
    ///
    /// The upstream provider is not informed; later queries simply
    /// re-request the discarded span from it.
    pub async fn drop_after(&self, age: Age) {
        self.state.write().await.drop_after(age);
    }

    /// Merge an upstream response with the local entries
    ///
    /// Upstream entries inside the local span are discarded outright:
    /// local absence within its own range already means "no events that
    /// frame" and must not be overridden by a re-fetch. Upstream entries
    /// that explicitly mark "no event this age" are dropped rather than
    /// materialized.
    fn merge(state: &LogState, begin: Age, end: Age, upstream: TickRange) -> TickRange {
        let Some(local) = state.range() else {
            return upstream;
        };
        let end = upstream.end.max(end.min(local.end));
        let (local_begin, local_end) = (local.begin, local.end);
        let mut ticks: Vec<Tick> = upstream
            .ticks
            .into_iter()
            .filter(|t| (t.age < local_begin || t.age > local_end) && t.events.is_some())
            .collect();
        ticks.extend(state.ticks_between(begin, end));
        ticks.sort_by_key(|t| t.age);
        TickRange::new(begin, end, ticks)
    }
}

#[async_trait]
impl TickProvider for ReplayTickProxy {
    /// Delegated to the upstream provider; the proxy never writes its
    /// own history
    async fn send_tick(&self, tick: Tick) -> Result<(), TickLogError> {
        self.upstream.send_tick(tick).await
    }

    async fn send_event(&self, event: Event) -> Result<(), TickLogError> {
        self.upstream.send_event(event).await
    }

    async fn query(&self, begin: Age, end: Age) -> Result<Option<TickRange>, TickLogError> {
        {
            let state = self.state.read().await;
            if let Some(local) = state.range()
                && local.begin <= begin
                && end <= local.end
            {
                debug!(begin, end, "range query answered locally");
                return Ok(Some(TickRange::new(
                    begin,
                    end,
                    state.ticks_between(begin, end),
                )));
            }
        }

        let fetched = self.upstream.query(begin, end).await;

        // An in-flight fetch can race a drop_after; the response is
        // merged against whatever the local state is once it arrives.
        let state = self.state.read().await;
        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(begin, end, error = %err, "upstream query failed, falling back to local data");
                None
            }
        };

        match fetched {
            Some(upstream) => Ok(Some(Self::merge(&state, begin, end, upstream))),
            None => {
                let Some(local) = state.range() else {
                    return Ok(None);
                };
                let begin = begin.max(local.begin);
                let end = end.min(local.end);
                if begin > end {
                    return Ok(None);
                }
                Ok(Some(TickRange::new(
                    begin,
                    end,
                    state.ticks_between(begin, end),
                )))
            }
        }
    }

    async fn put_start_point(&self, start_point: StartPoint) -> Result<(), TickLogError> {
        self.upstream.put_start_point(start_point).await
    }

    /// Answered from the local start point list only; the proxy does not
    /// fetch start points from upstream
    async fn get_start_point(&self, frame: Option<Age>) -> Result<StartPoint, TickLogError> {
        self.state.read().await.start_point(frame)
    }
}
