use std::{borrow::Cow, fmt};

use jiff::SignedDuration;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};

use crate::problem::error::InputError;

/// Interval of the day, stored as offsets from midnight.
///
/// Windows are validated on construction: `start` is always strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[i64; 2]", try_from = "[i64; 2]")]
pub struct TimeWindow {
    start: SignedDuration,
    end: SignedDuration,
}

impl TimeWindow {
    /// Windows may run into the following days, up to a week after midnight.
    pub const MAX_SECONDS: i64 = 7 * 86_400;

    pub fn new(start: i64, end: i64) -> Result<Self, InputError> {
        if start < 0 || start >= end || end > Self::MAX_SECONDS {
            return Err(InputError::MalformedWindow { start, end });
        }

        Ok(TimeWindow {
            start: SignedDuration::from_secs(start),
            end: SignedDuration::from_secs(end),
        })
    }

    pub fn from_pair([start, end]: [i64; 2]) -> Result<Self, InputError> {
        Self::new(start, end)
    }

    pub fn start(&self) -> SignedDuration {
        self.start
    }

    pub fn end(&self) -> SignedDuration {
        self.end
    }

    pub fn start_seconds(&self) -> i64 {
        self.start.as_secs()
    }

    pub fn end_seconds(&self) -> i64 {
        self.end.as_secs()
    }

    /// Touching windows (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn overlap(&self, other: &TimeWindow) -> SignedDuration {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);

        if start < end {
            end - start
        } else {
            SignedDuration::ZERO
        }
    }

    pub fn is_satisfied(&self, arrival: SignedDuration) -> bool {
        arrival <= self.end
    }

    pub fn waiting_duration(&self, arrival: SignedDuration) -> SignedDuration {
        if arrival < self.start {
            self.start - arrival
        } else {
            SignedDuration::ZERO
        }
    }

    pub(crate) fn span(&self, other: &TimeWindow) -> TimeWindow {
        TimeWindow {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<TimeWindow> for [i64; 2] {
    fn from(window: TimeWindow) -> Self {
        [window.start_seconds(), window.end_seconds()]
    }
}

impl TryFrom<[i64; 2]> for TimeWindow {
    type Error = InputError;

    fn try_from(pair: [i64; 2]) -> Result<Self, Self::Error> {
        Self::from_pair(pair)
    }
}

impl JsonSchema for TimeWindow {
    fn schema_name() -> Cow<'static, str> {
        "TimeWindow".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "[start, end] in seconds of the day",
            "type": "array",
            "items": { "type": "integer" },
            "minItems": 2,
            "maxItems": 2
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start_seconds(), self.end_seconds())
    }
}
