use std::{collections::VecDeque, fmt};

use crate::{
    dispatch::route::Route,
    grouping::pool::{CandidatePool, StopIdx},
    problem::{
        driver::DriverIdx, location::Location, time_window::TimeWindow,
        vehicle_profile::VehicleProfile,
    },
};

/// Pickup address and pickup window shared by the stops of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    address: String,
    window: TimeWindow,
}

impl BucketKey {
    pub fn new(address: impl Into<String>, window: TimeWindow) -> Self {
        BucketKey {
            address: address.into(),
            window,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.window)
    }
}

/// Stops sharing a pickup, together with the drivers that may serve them.
///
/// Every queued driver has a slot overlapping the pickup window.
#[derive(Debug, Clone)]
pub struct Bucket {
    key: BucketKey,
    anchor: Location,
    pool: CandidatePool,
    drivers: VecDeque<DriverIdx>,
}

impl Bucket {
    pub fn new(
        key: BucketKey,
        anchor: Location,
        pool: CandidatePool,
        drivers: VecDeque<DriverIdx>,
    ) -> Self {
        Bucket {
            key,
            anchor,
            pool,
            drivers,
        }
    }

    pub fn key(&self) -> &BucketKey {
        &self.key
    }

    pub fn anchor(&self) -> &Location {
        &self.anchor
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn drivers(&self) -> &VecDeque<DriverIdx> {
        &self.drivers
    }

    pub fn front_driver(&self) -> Option<DriverIdx> {
        self.drivers.front().copied()
    }

    pub fn pop_driver(&mut self) -> Option<DriverIdx> {
        self.drivers.pop_front()
    }

    /// Routing input for the given stops: the anchor first, then each stop's location.
    pub fn routing_locations(&self, stops: &[StopIdx]) -> Vec<&Location> {
        std::iter::once(&self.anchor)
            .chain(stops.iter().map(|&idx| self.pool.stop(idx).location()))
            .collect()
    }

    /// Consumes `served` (in visiting order) and expands them into a route.
    pub fn take_route(&mut self, served: &[StopIdx], profile: VehicleProfile) -> Route {
        let deliveries = served
            .iter()
            .enumerate()
            .flat_map(|(visit, &idx)| {
                let newly_consumed = self.pool.consume(idx);
                debug_assert!(newly_consumed, "stop {idx} routed twice");

                self.pool.stop(idx).expand(visit)
            })
            .collect();

        Route::new(self.key.clone(), self.anchor.clone(), deliveries, profile)
    }

    pub fn into_parts(self) -> (BucketKey, CandidatePool) {
        (self.key, self.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{problem::stop::Stop, test_utils};

    fn bucket() -> Bucket {
        let stops = [("a", 1), ("b,1;c,2", 3), ("d", 2)]
            .into_iter()
            .map(|(reference, demand)| {
                Stop::from_location(test_utils::create_location(
                    reference,
                    52.53,
                    13.41,
                    (28_800, 72_000),
                    demand,
                ))
                .unwrap()
            })
            .collect();

        let window = TimeWindow::new(28_800, 36_000).unwrap();
        Bucket::new(
            BucketKey::new(test_utils::PICKUP_ADDRESS, window),
            test_utils::create_anchor(52.52, 13.405, (28_800, 36_000)),
            CandidatePool::new(stops),
            VecDeque::from([DriverIdx::new(0), DriverIdx::new(2)]),
        )
    }

    #[test]
    fn test_routing_locations_start_at_anchor() {
        let bucket = bucket();
        let locations = bucket.routing_locations(&[StopIdx::new(2), StopIdx::new(0)]);

        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0], bucket.anchor());
        assert_eq!(locations[1].reference(), Some("d"));
        assert_eq!(locations[2].reference(), Some("a"));
    }

    #[test]
    fn test_take_route_expands_and_consumes() {
        let mut bucket = bucket();

        let route = bucket.take_route(
            &[StopIdx::new(1), StopIdx::new(0)],
            test_utils::create_profile(15, 25.0),
        );

        let references = route
            .deliveries()
            .iter()
            .map(|delivery| (delivery.reference().unwrap(), delivery.visit()))
            .collect::<Vec<_>>();
        assert_eq!(references, vec![("b", 0), ("c", 0), ("a", 1)]);
        assert_eq!(route.demand(), 4);
        assert_eq!(bucket.pool().remaining_count(), 1);
    }

    #[test]
    fn test_driver_queue() {
        let mut bucket = bucket();

        assert_eq!(bucket.front_driver(), Some(DriverIdx::new(0)));
        assert_eq!(bucket.pop_driver(), Some(DriverIdx::new(0)));
        assert_eq!(bucket.front_driver(), Some(DriverIdx::new(2)));
    }
}
