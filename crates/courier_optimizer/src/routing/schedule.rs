use jiff::SignedDuration;
use thiserror::Error;

use crate::problem::time_window::TimeWindow;

/// Travel into a visit, the visit's window and the time spent there.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub travel: SignedDuration,
    pub window: TimeWindow,
    pub dwell: SignedDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitTiming {
    pub arrival: SignedDuration,
    pub service_start: SignedDuration,
    pub departure: SignedDuration,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("visit {visit} is reached at {arrival:?}, after its window {window}")]
pub struct LateArrival {
    pub visit: usize,
    pub arrival: SignedDuration,
    pub window: TimeWindow,
}

/// Walks the legs of a route leaving the anchor at `start`. A vehicle arriving early
/// waits for the window to open; arriving after the window end fails.
///
/// Returns the departure time from the last visit.
pub fn simulate<I, F>(start: SignedDuration, legs: I, mut on_visit: F) -> Result<SignedDuration, LateArrival>
where
    I: IntoIterator<Item = Leg>,
    F: FnMut(VisitTiming),
{
    let mut time = start;

    for (visit, leg) in legs.into_iter().enumerate() {
        let arrival = time + leg.travel;

        if !leg.window.is_satisfied(arrival) {
            return Err(LateArrival {
                visit,
                arrival,
                window: leg.window,
            });
        }

        let service_start = arrival + leg.window.waiting_duration(arrival);
        time = service_start + leg.dwell;

        on_visit(VisitTiming {
            arrival,
            service_start,
            departure: time,
        });
    }

    Ok(time)
}
