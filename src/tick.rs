//! Tick and start point value types
//!
//! A [`Tick`] is one frame's worth of recorded events, keyed by its age.
//! A [`TickRange`] is a sparsely populated slice of the log; a
//! [`StartPoint`] is a recovery snapshot from which replay can resume
//! without re-running the session from age 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::Event;

/// Monotonically increasing frame counter identifying a tick's position
/// in the log
pub type Age = u64;

/// One frame's worth of recorded events
///
/// `events` keeps the omitted/present distinction explicit: `None`
/// means no event list was supplied for this frame at all (the frame is
/// a gap in the log), while `Some` with an empty vector means a list
/// was supplied but nothing in it survived filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Frame counter of this tick
    pub age: Age,
    /// Events accepted for this frame, if a list was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
}

impl Tick {
    /// A tick carrying an explicit event list
    pub fn new(age: Age, events: Vec<Event>) -> Self {
        Self {
            age,
            events: Some(events),
        }
    }

    /// A tick with no event list at all
    pub fn bare(age: Age) -> Self {
        Self { age, events: None }
    }
}

/// A contiguous-by-frame, sparsely populated slice of the tick log
///
/// Every tick satisfies `begin <= age <= end` and ages strictly
/// increase along `ticks`. Only ages that were explicitly recorded with
/// an event list appear; an absent age means no events that frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRange {
    /// Age of the first frame covered by this range
    pub begin: Age,
    /// Age of the last frame covered by this range
    pub end: Age,
    /// Recorded ticks within the range, ascending by age
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<Tick>,
}

impl TickRange {
    /// Create a range over `begin..=end` with the given sparse ticks
    pub fn new(begin: Age, end: Age, ticks: Vec<Tick>) -> Self {
        Self { begin, end, ticks }
    }

    /// A range covering `begin..=end` with no recorded ticks
    pub fn empty(begin: Age, end: Age) -> Self {
        Self {
            begin,
            end,
            ticks: Vec::new(),
        }
    }
}

/// A recovery snapshot keyed by frame
///
/// The snapshot at frame 0 is the privileged fallback that makes replay
/// from the beginning always possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartPoint {
    /// Frame this snapshot was taken at
    pub frame: Age,
    /// Wall-clock time of the snapshot, in milliseconds
    pub timestamp: f64,
    /// Opaque snapshot or seed blob
    pub data: Value,
}

impl StartPoint {
    /// Create a start point
    pub fn new(frame: Age, timestamp: f64, data: Value) -> Self {
        Self {
            frame,
            timestamp,
            data,
        }
    }
}

/// A completed log dumped for hand-off: the recorded range plus every
/// known start point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDump {
    /// The recorded tick range, absent when nothing was ever appended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_range: Option<TickRange>,
    /// Start points sorted ascending by frame
    pub start_points: Vec<StartPoint>,
}
