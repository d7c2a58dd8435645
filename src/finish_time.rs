//! Elapsed-time estimation for a completed log

use crate::tick::TickRange;

/// Estimate the wall-clock duration of a finished session, in
/// milliseconds relative to `start_time`.
///
/// Scans the recorded ticks from the latest age backward and anchors the
/// calculation on the first timestamp event found. A marker below
/// `start_time` is treated as relative to it rather than absolute. The
/// frames remaining after the anchor are converted at `fps`. Without any
/// timestamp event the duration is simply the final age converted at
/// `fps`.
pub fn calculate_finished_time(range: &TickRange, fps: f64, start_time: f64) -> f64 {
    for tick in range.ticks.iter().rev() {
        let Some(events) = &tick.events else {
            continue;
        };
        for event in events {
            let Some(marker) = event.timestamp() else {
                continue;
            };
            let anchor = if marker < start_time {
                marker + start_time
            } else {
                marker
            };
            return anchor + (range.end - tick.age) as f64 * 1000.0 / fps - start_time;
        }
    }
    range.end as f64 * 1000.0 / fps
}
