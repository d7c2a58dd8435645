//! Shared tick log bookkeeping
//!
//! [`LogState`] owns the recorded range and start point list for one
//! session and implements the append, clip, truncate and start point
//! selection rules shared by the in-memory store and the replay proxy.
//! All methods run to completion without suspension; callers serialize
//! access through a lock.

use tracing::trace;

use crate::error::TickLogError;
use crate::tick::{Age, LogDump, StartPoint, Tick, TickRange};

/// Recorded range and start points for a single session
#[derive(Debug, Default, Clone)]
pub(crate) struct LogState {
    range: Option<TickRange>,
    start_points: Vec<StartPoint>,
}

impl LogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-seeded with an already recorded range and its start points
    ///
    /// Start points are re-sorted by frame; the caller-supplied order is
    /// not trusted.
    pub fn seeded(range: Option<TickRange>, mut start_points: Vec<StartPoint>) -> Self {
        start_points.sort_by_key(|sp| sp.frame);
        Self {
            range,
            start_points,
        }
    }

    pub fn range(&self) -> Option<&TickRange> {
        self.range.as_ref()
    }

    #[cfg(test)]
    pub fn start_points(&self) -> &[StartPoint] {
        &self.start_points
    }

    /// Append a tick to the end of the log
    ///
    /// Transient events are dropped before storage. A tick with no event
    /// list advances `end` without creating an entry; a tick with a list
    /// creates an entry even when the list is empty after filtering.
    pub fn append(&mut self, tick: Tick) -> Result<(), TickLogError> {
        let Tick { age, events } = tick;
        let kept = events.map(|events| {
            events
                .into_iter()
                .filter(|ev| !ev.flags.is_transient())
                .collect::<Vec<_>>()
        });

        match self.range.as_mut() {
            None => {
                let ticks = match kept {
                    Some(events) => vec![Tick::new(age, events)],
                    None => Vec::new(),
                };
                self.range = Some(TickRange::new(age, age, ticks));
            }
            Some(range) => {
                if age <= range.end {
                    return Err(TickLogError::OutOfOrder {
                        last: range.end,
                        age,
                    });
                }
                range.end = age;
                if let Some(events) = kept {
                    range.ticks.push(Tick::new(age, events));
                }
            }
        }
        trace!(age, "appended tick");
        Ok(())
    }

    /// Clip `begin..=end` to the recorded range
    ///
    /// Both bounds are clamped into the recorded span, so a request
    /// entirely outside it collapses to a zero-width range at the nearer
    /// edge. Returns `None` only when nothing was ever recorded.
    pub fn clip(&self, begin: Age, end: Age) -> Option<TickRange> {
        let range = self.range.as_ref()?;
        let begin = begin.clamp(range.begin, range.end);
        let end = end.clamp(range.begin, range.end);
        Some(TickRange::new(begin, end, self.ticks_between(begin, end)))
    }

    /// Clones of the recorded entries with `begin <= age <= end`
    pub fn ticks_between(&self, begin: Age, end: Age) -> Vec<Tick> {
        match self.range.as_ref() {
            Some(range) => range
                .ticks
                .iter()
                .filter(|t| begin <= t.age && t.age <= end)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Roll the log back so nothing at or after `age` remains
    ///
    /// A no-op when the log is empty or already ends before `age`.
    /// Rolling back to or before `begin` reverts the state fully: the
    /// range becomes absent and every start point is discarded.
    pub fn drop_after(&mut self, age: Age) {
        let Some(range) = self.range.as_mut() else {
            return;
        };
        if age > range.end {
            return;
        }
        if age <= range.begin {
            trace!(age, "rollback emptied the log");
            self.range = None;
            self.start_points.clear();
            return;
        }
        range.end = age - 1;
        range.ticks.retain(|t| t.age < age);
        self.start_points.retain(|sp| sp.frame < age);
        trace!(age, end = age - 1, "rolled log back");
    }

    /// Insert or replace the start point for its frame, keeping the list
    /// sorted
    pub fn put_start_point(&mut self, start_point: StartPoint) {
        match self
            .start_points
            .binary_search_by_key(&start_point.frame, |sp| sp.frame)
        {
            Ok(i) => self.start_points[i] = start_point,
            Err(i) => self.start_points.insert(i, start_point),
        }
    }

    /// The start point with the greatest frame at or before `frame`, or
    /// the most recent one known when no frame is given
    pub fn start_point(&self, frame: Option<Age>) -> Result<StartPoint, TickLogError> {
        let found = match frame {
            Some(frame) => self.start_points.iter().rev().find(|sp| sp.frame <= frame),
            None => self.start_points.last(),
        };
        found.cloned().ok_or(TickLogError::NoStartPoint)
    }

    pub fn dump(&self) -> LogDump {
        LogDump {
            tick_range: self.range.clone(),
            start_points: self.start_points.clone(),
        }
    }
}
