use std::collections::VecDeque;

use tracing::{Level, debug, instrument, warn};

use crate::{
    grouping::{
        bucket::{Bucket, BucketKey},
        pool::CandidatePool,
        schedule::{ScheduleMember, Schedules},
    },
    json::types::{JsonLocationRecord, LocationsByAddress, WindowKey},
    problem::{driver::DriverIdx, error::InputError, time_window::TimeWindow},
};

/// Input records that could not be turned into bucket stops.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedEntry {
    address: String,
    window: WindowKey,
    records: Vec<JsonLocationRecord>,
    error: InputError,
}

impl UnmatchedEntry {
    pub fn new(
        address: impl Into<String>,
        window: WindowKey,
        records: Vec<JsonLocationRecord>,
        error: InputError,
    ) -> Self {
        UnmatchedEntry {
            address: address.into(),
            window,
            records,
            error,
        }
    }

    /// Pickup address of the entry.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn window(&self) -> &WindowKey {
        &self.window
    }

    pub fn records(&self) -> &[JsonLocationRecord] {
        &self.records
    }

    pub fn error(&self) -> &InputError {
        &self.error
    }
}

/// Splits the input into buckets, one per pickup address and window, each with the
/// drivers of the best matching schedule group that are available in the window.
///
/// Never fails: invalid input ends up in the unmatched list. Without a matching group
/// a bucket keeps an empty driver queue, unless `strict` is set in which case its
/// records are reported as unmatched.
#[instrument(skip_all, level = Level::DEBUG, fields(strict = strict))]
pub fn group_locations(
    locations: &LocationsByAddress,
    schedules: &Schedules,
    strict: bool,
) -> (Vec<Bucket>, Vec<UnmatchedEntry>) {
    let mut buckets = Vec::new();
    let mut unmatched = Vec::new();

    for (address, windows) in locations {
        for (&window_key, records) in windows {
            let Some((anchor_record, deliveries)) = records.split_first() else {
                continue;
            };

            if deliveries.is_empty() {
                debug!(
                    address = address.as_str(),
                    window = %window_key,
                    "Pickup without deliveries"
                );
                continue;
            }

            let window = match window_key.to_window() {
                Ok(window) => window,
                Err(error) => {
                    unmatched.push(UnmatchedEntry::new(
                        address.as_str(),
                        window_key,
                        deliveries.to_vec(),
                        error,
                    ));
                    continue;
                }
            };

            let anchor = match anchor_record.to_anchor(address, window) {
                Ok(anchor) => anchor,
                Err(error) => {
                    unmatched.push(UnmatchedEntry::new(
                        address.as_str(),
                        window_key,
                        deliveries.to_vec(),
                        error,
                    ));
                    continue;
                }
            };

            let mut stops = Vec::with_capacity(deliveries.len());
            let mut valid_records = Vec::with_capacity(deliveries.len());

            for record in deliveries {
                match record.to_stop() {
                    Ok(stop) => {
                        stops.push(stop);
                        valid_records.push(record.clone());
                    }
                    Err(error) => unmatched.push(UnmatchedEntry::new(
                        address.as_str(),
                        window_key,
                        vec![record.clone()],
                        error,
                    )),
                }
            }

            if stops.is_empty() {
                continue;
            }

            let drivers = match matching_drivers(schedules, &window) {
                Some(drivers) => drivers,
                None if strict => {
                    unmatched.push(UnmatchedEntry::new(
                        address.as_str(),
                        window_key,
                        valid_records,
                        InputError::NoMatchingSchedule(window),
                    ));
                    continue;
                }
                None => VecDeque::new(),
            };

            debug!(
                address = address.as_str(),
                window = %window,
                stops = stops.len(),
                drivers = drivers.len(),
                "Created bucket"
            );

            buckets.push(Bucket::new(
                BucketKey::new(address.as_str(), window),
                anchor,
                CandidatePool::new(stops),
                drivers,
            ));
        }
    }

    for entry in &unmatched {
        warn!(
            address = entry.address(),
            window = %entry.window(),
            records = entry.records().len(),
            error = %entry.error(),
            "Unmatched location entry"
        );
    }

    buckets.sort_by(|a, b| a.key().cmp(b.key()));

    (buckets, unmatched)
}

fn matching_drivers(
    schedules: &Schedules,
    window: &TimeWindow,
) -> Option<VecDeque<DriverIdx>> {
    let schedule = schedules.best_match(window)?;

    Some(
        schedule
            .available_during(window)
            .map(ScheduleMember::driver)
            .collect(),
    )
}

/// Total number of stops routed as one visit each.
pub fn count_stops(buckets: &[Bucket]) -> usize {
    buckets.iter().map(|bucket| bucket.pool().len()).sum()
}
