use std::sync::Arc;

use jiff::SignedDuration;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    problem::{
        driver::Driver,
        kmh::Kmh,
        location::{Location, LocationBuilder, LocationIdx},
        time_window::TimeWindow,
        vehicle_profile::VehicleProfile,
    },
    routing::tour::{RoutingContext, Tour},
};

pub const PICKUP_ADDRESS: &str = "Central Kitchen";

pub fn create_location(
    reference: &str,
    lat: f64,
    lon: f64,
    (start, end): (i64, i64),
    demand: u32,
) -> Location {
    let mut builder = LocationBuilder::default();
    builder
        .set_address(format!("{reference} street"))
        .set_lat_lon(lat, lon)
        .set_delivery_window(TimeWindow::new(start, end).unwrap())
        .set_demand(demand)
        .set_reference(reference);

    builder.build().unwrap()
}

pub fn create_anchor(lat: f64, lon: f64, (start, end): (i64, i64)) -> Location {
    let mut builder = LocationBuilder::default();
    builder
        .set_address(PICKUP_ADDRESS)
        .set_lat_lon(lat, lon)
        .set_delivery_window(TimeWindow::new(start, end).unwrap())
        .set_demand(0);

    builder.build().unwrap()
}

/// Anchor followed by `count - 1` deliveries, each about 1.1 km further north.
pub fn create_line_locations(count: usize) -> Vec<Location> {
    std::iter::once(create_anchor(52.50, 13.40, (28_800, 36_000)))
        .chain((1..count).map(|i| {
            create_location(
                &format!("line-{i}"),
                52.50 + 0.01 * i as f64,
                13.40,
                (28_800, 72_000),
                1,
            )
        }))
        .collect()
}

/// Anchor in the middle of `count` deliveries spread on a ring of a few km, with
/// demands cycling through `1..=max_demand`.
pub fn create_ring_locations(count: usize, max_demand: u32) -> Vec<Location> {
    std::iter::once(create_anchor(52.52, 13.405, (28_800, 36_000)))
        .chain((0..count).map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count as f64;
            let radius = 1.0 + (i % 3) as f64 * 0.5;

            create_location(
                &format!("ring-{i}"),
                52.52 + 0.015 * radius * angle.sin(),
                13.405 + 0.025 * radius * angle.cos(),
                (28_800, 72_000),
                1 + i as u32 % max_demand,
            )
        }))
        .collect()
}

pub fn create_driver(id: &str, slots: &[(i64, i64)], capacity: u32) -> Driver {
    create_driver_with_speed(id, slots, capacity, 25.0)
}

pub fn create_driver_with_speed(
    id: &str,
    slots: &[(i64, i64)],
    capacity: u32,
    speed: f64,
) -> Driver {
    let slots = slots
        .iter()
        .map(|&(start, end)| TimeWindow::new(start, end).unwrap())
        .collect();

    Driver::new(id, slots, capacity, Kmh::new(speed)).unwrap()
}

pub fn create_profile(capacity: u32, speed: f64) -> VehicleProfile {
    VehicleProfile::new(capacity, Kmh::new(speed))
}

pub fn create_thread_pool() -> Arc<ThreadPool> {
    Arc::new(ThreadPoolBuilder::new().num_threads(1).build().unwrap())
}

/// Context at 30 km/h with a 5 minute dwell.
pub fn create_routing_context<'a>(locations: &'a [&'a Location], capacity: u32) -> RoutingContext<'a> {
    RoutingContext::new(
        locations,
        create_profile(capacity, 30.0),
        SignedDuration::from_mins(5),
    )
}

pub fn create_tour(context: &RoutingContext, visits: &[usize]) -> Tour {
    let mut tour = Tour::default();

    for (position, &visit) in visits.iter().enumerate() {
        tour.insert(context, LocationIdx::new(visit), position);
    }

    tour
}
