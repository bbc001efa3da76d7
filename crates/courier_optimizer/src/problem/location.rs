use geo::{Distance, Haversine};
use jiff::SignedDuration;

use crate::{
    define_index_newtype,
    problem::{error::InputError, meters::Meters, time_window::TimeWindow},
};

define_index_newtype!(LocationIdx, Location);

/// Longest extra service time a single order can ask for.
pub const MAX_ORDER_TIME: SignedDuration = SignedDuration::from_hours(24);

/// A delivery address (or a pickup anchor when its demand is zero).
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    address: String,
    point: geo::Point,
    delivery_window: TimeWindow,
    demand: u32,
    order_time: SignedDuration,
    reference: Option<String>,
}

impl Location {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }

    pub fn delivery_window(&self) -> &TimeWindow {
        &self.delivery_window
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Service time spent at this location on top of the fixed per-stop dwell.
    pub fn order_time(&self) -> SignedDuration {
        self.order_time
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn haversine_distance(&self, to: &Location) -> Meters {
        point_distance(self.point, to.point)
    }

    pub(crate) fn set_demand(&mut self, demand: u32) {
        self.demand = demand;
    }
}

/// Great-circle distance between two `(lon, lat)` points.
pub fn point_distance(from: geo::Point, to: geo::Point) -> Meters {
    Meters::new(Haversine.distance(from, to))
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

#[derive(Default)]
pub struct LocationBuilder {
    address: Option<String>,
    coordinates: Option<(f64, f64)>,
    delivery_window: Option<TimeWindow>,
    demand: Option<u32>,
    order_time: Option<SignedDuration>,
    reference: Option<String>,
}

impl LocationBuilder {
    pub fn set_address(&mut self, address: impl Into<String>) -> &mut LocationBuilder {
        self.address = Some(address.into());
        self
    }

    pub fn set_lat_lon(&mut self, lat: f64, lon: f64) -> &mut LocationBuilder {
        self.coordinates = Some((lat, lon));
        self
    }

    pub fn set_delivery_window(&mut self, window: TimeWindow) -> &mut LocationBuilder {
        self.delivery_window = Some(window);
        self
    }

    pub fn set_demand(&mut self, demand: u32) -> &mut LocationBuilder {
        self.demand = Some(demand);
        self
    }

    pub fn set_order_time(&mut self, order_time: SignedDuration) -> &mut LocationBuilder {
        self.order_time = Some(order_time);
        self
    }

    pub fn set_reference(&mut self, reference: impl Into<String>) -> &mut LocationBuilder {
        self.reference = Some(reference.into());
        self
    }

    pub fn build(self) -> Result<Location, InputError> {
        let (lat, lon) = self
            .coordinates
            .ok_or(InputError::MissingField("coordinates"))?;

        if !(lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0) {
            return Err(InputError::InvalidCoordinates { lat, lon });
        }

        let order_time = self.order_time.unwrap_or(SignedDuration::ZERO);
        if order_time.is_negative() || order_time > MAX_ORDER_TIME {
            return Err(InputError::InvalidOrderTime(order_time.as_secs()));
        }

        Ok(Location {
            address: self.address.ok_or(InputError::MissingField("address"))?,
            point: geo::Point::new(lon, lat),
            delivery_window: self
                .delivery_window
                .ok_or(InputError::MissingField("delivery_window"))?,
            demand: self.demand.ok_or(InputError::MissingField("capacity"))?,
            order_time,
            reference: self.reference.filter(|reference| !reference.is_empty()),
        })
    }
}
