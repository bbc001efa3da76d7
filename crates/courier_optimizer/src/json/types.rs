use std::{borrow::Cow, collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use jiff::SignedDuration;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use tracing::instrument;

use crate::problem::{
    driver::{self, Driver},
    error::InputError,
    kmh::Kmh,
    location::{Location, LocationBuilder},
    stop::Stop,
    time_window::TimeWindow,
};

/// Records keyed by pickup address, then by pickup window. The first record of
/// every list is the pickup anchor.
pub type LocationsByAddress = BTreeMap<String, BTreeMap<WindowKey, Vec<JsonLocationRecord>>>;

/// Pickup window as it appears in the input map keys: `"start,end"`.
///
/// Kept unvalidated so that a malformed window can still be reported with its records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct WindowKey {
    start: i64,
    end: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{0}` is not a `start,end` window key")]
pub struct WindowKeyParseError(String);

impl WindowKey {
    pub fn new(start: i64, end: i64) -> Self {
        WindowKey { start, end }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn to_window(&self) -> Result<TimeWindow, InputError> {
        TimeWindow::new(self.start, self.end)
    }
}

impl From<TimeWindow> for WindowKey {
    fn from(window: TimeWindow) -> Self {
        WindowKey::new(window.start_seconds(), window.end_seconds())
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

impl FromStr for WindowKey {
    type Err = WindowKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || WindowKeyParseError(s.to_owned());

        let (start, end) = s.split_once(',').ok_or_else(error)?;
        let start = start.trim().parse().map_err(|_| error())?;
        let end = end.trim().parse().map_err(|_| error())?;

        Ok(WindowKey { start, end })
    }
}

impl JsonSchema for WindowKey {
    fn schema_name() -> Cow<'static, str> {
        "WindowKey".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "pattern": "^\\s*-?\\d+\\s*,\\s*-?\\d+\\s*$"
        })
    }
}

/// One location of the input. Every field is optional so that incomplete records
/// can be reported instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "LocationRecord")]
pub struct JsonLocationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// `[lat, lon]` in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,

    /// `[start, end]` in seconds of the day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_window: Option<[i64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,

    /// Extra service seconds on top of the per-stop service time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_time: Option<i64>,

    /// External reference. `refA,2;refB,1` merges several orders into one stop.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl JsonLocationRecord {
    pub fn to_location(&self) -> Result<Location, InputError> {
        let mut builder = LocationBuilder::default();

        if let Some(address) = &self.address {
            builder.set_address(address.clone());
        }

        if let Some([lat, lon]) = self.coordinates {
            builder.set_lat_lon(lat, lon);
        }

        if let Some(window) = self.delivery_window {
            builder.set_delivery_window(TimeWindow::from_pair(window)?);
        }

        if let Some(capacity) = self.capacity {
            builder.set_demand(capacity);
        }

        if let Some(order_time) = self.order_time {
            builder.set_order_time(SignedDuration::from_secs(order_time));
        }

        if let Some(reference) = &self.reference {
            builder.set_reference(reference.clone());
        }

        builder.build()
    }

    pub fn to_stop(&self) -> Result<Stop, InputError> {
        Stop::from_location(self.to_location()?)
    }

    /// Builds the pickup anchor of a bucket. Only the coordinates are required: the
    /// anchor takes the pickup window and carries no demand.
    pub fn to_anchor(&self, pickup_address: &str, window: TimeWindow) -> Result<Location, InputError> {
        let [lat, lon] = self
            .coordinates
            .ok_or(InputError::MissingField("coordinates"))?;

        let mut builder = LocationBuilder::default();
        builder
            .set_address(self.address.as_deref().unwrap_or(pickup_address))
            .set_lat_lon(lat, lon)
            .set_delivery_window(window)
            .set_demand(0);

        builder.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Driver")]
pub struct JsonDriver {
    pub id: String,
    pub time_slots: Vec<[i64; 2]>,
    pub capacity: u32,
    /// km/h
    pub speed: f64,
}

impl JsonDriver {
    pub fn to_driver(&self) -> Result<Driver, InputError> {
        let time_slots = self
            .time_slots
            .iter()
            .map(|&slot| TimeWindow::from_pair(slot))
            .collect::<Result<Vec<_>, _>>()?;

        Driver::new(self.id.clone(), time_slots, self.capacity, Kmh::new(self.speed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "DispatchInput")]
pub struct DispatchInput {
    pub drivers: Vec<JsonDriver>,
    pub locations: LocationsByAddress,
}

impl DispatchInput {
    #[instrument(level = "debug")]
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let file = File::open(path)?;
        let input = serde_json::from_reader(BufReader::new(file))?;
        Ok(input)
    }

    /// Validated drivers, in input order.
    pub fn drivers(&self) -> Result<Vec<Driver>, InputError> {
        let drivers = self
            .drivers
            .iter()
            .map(JsonDriver::to_driver)
            .collect::<Result<Vec<_>, _>>()?;

        driver::ensure_unique_ids(&drivers)?;

        Ok(drivers)
    }

    pub fn num_records(&self) -> usize {
        self.locations
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}
