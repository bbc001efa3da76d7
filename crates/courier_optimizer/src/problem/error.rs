use thiserror::Error;

use crate::problem::time_window::TimeWindow;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error(
        "malformed time window [{start}, {end}]: expected 0 <= start < end <= {}",
        TimeWindow::MAX_SECONDS
    )]
    MalformedWindow { start: i64, end: i64 },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("malformed ref `{reference}`: {reason}")]
    MalformedRef { reference: String, reason: String },
    #[error("invalid coordinates [{lat}, {lon}]")]
    InvalidCoordinates { lat: f64, lon: f64 },
    #[error("order time {0} s must lie within a day")]
    InvalidOrderTime(i64),
    #[error("duplicate driver id `{0}`")]
    DuplicateDriver(String),
    #[error("driver `{0}` has no time slot")]
    NoTimeSlots(String),
    #[error("driver `{id}` has an invalid speed {speed}")]
    InvalidSpeed { id: String, speed: f64 },
    #[error("no driver schedule overlaps pickup window {0}")]
    NoMatchingSchedule(TimeWindow),
}
