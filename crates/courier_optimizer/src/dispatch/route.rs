use jiff::SignedDuration;

use crate::{
    grouping::bucket::BucketKey,
    problem::{
        location::{Location, point_distance},
        stop::Delivery,
        vehicle_profile::VehicleProfile,
    },
    routing::schedule::{self, LateArrival, Leg},
};

/// A finished route: the deliveries served from one pickup, in visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    key: BucketKey,
    anchor: Location,
    deliveries: Vec<Delivery>,
    profile: VehicleProfile,
}

impl Route {
    pub fn new(
        key: BucketKey,
        anchor: Location,
        deliveries: Vec<Delivery>,
        profile: VehicleProfile,
    ) -> Self {
        Route {
            key,
            anchor,
            deliveries,
            profile,
        }
    }

    pub fn key(&self) -> &BucketKey {
        &self.key
    }

    pub fn anchor(&self) -> &Location {
        &self.anchor
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Profile the route was planned with.
    pub fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    pub fn demand(&self) -> u32 {
        self.deliveries.iter().map(Delivery::demand).sum()
    }

    pub fn num_visits(&self) -> usize {
        self.visits().count()
    }

    /// Same visiting order, planned for another vehicle.
    pub fn with_profile(self, profile: VehicleProfile) -> Self {
        Route { profile, ..self }
    }

    fn visits(&self) -> impl Iterator<Item = &[Delivery]> {
        self.deliveries
            .chunk_by(|a, b| a.visit() == b.visit())
    }

    /// Service start of every delivery, leaving the anchor when the pickup window
    /// opens. Deliveries of one visit share the travel leg and the dwell.
    pub fn schedule(&self, service_time: SignedDuration) -> Result<Vec<SignedDuration>, LateArrival> {
        let mut previous = self.anchor.point();

        let legs = self.visits().map(|visit| {
            let first = &visit[0];
            let leg = Leg {
                travel: self.profile.travel_time(point_distance(previous, first.point())),
                window: *first.delivery_window(),
                dwell: service_time + first.order_time(),
            };
            previous = first.point();
            leg
        });

        let mut service_starts = Vec::new();
        schedule::simulate(self.key.window().start(), legs, |timing| {
            service_starts.push(timing.service_start)
        })?;

        Ok(self
            .visits()
            .zip(service_starts)
            .flat_map(|(visit, start)| std::iter::repeat_n(start, visit.len()))
            .collect())
    }

    /// Fits the profile capacity and meets every delivery window.
    pub fn is_feasible(&self, service_time: SignedDuration) -> bool {
        self.profile.fits(self.demand()) && self.schedule(service_time).is_ok()
    }
}

/// A route owned by an in-house driver.
#[derive(Debug, Clone, PartialEq)]
pub struct InhouseRoute {
    driver_id: String,
    route: Route,
}

impl InhouseRoute {
    pub fn new(driver_id: impl Into<String>, route: Route) -> Self {
        InhouseRoute {
            driver_id: driver_id.into(),
            route,
        }
    }

    pub fn driver_id(&self) -> &str {
        &self.driver_id
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn into_route(self) -> Route {
        self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{stop::Stop, time_window::TimeWindow},
        test_utils,
    };

    fn route(stops: &[(&str, f64, (i64, i64), u32)], profile: VehicleProfile) -> Route {
        let window = TimeWindow::new(28_800, 36_000).unwrap();
        let deliveries = stops
            .iter()
            .enumerate()
            .flat_map(|(visit, &(reference, lat, delivery_window, demand))| {
                Stop::from_location(test_utils::create_location(
                    reference,
                    lat,
                    13.40,
                    delivery_window,
                    demand,
                ))
                .unwrap()
                .expand(visit)
            })
            .collect();

        Route::new(
            BucketKey::new(test_utils::PICKUP_ADDRESS, window),
            test_utils::create_anchor(52.50, 13.40, (28_800, 36_000)),
            deliveries,
            profile,
        )
    }

    #[test]
    fn test_schedule_shares_composite_visit() {
        let route = route(
            &[
                ("a,1;b,2", 52.51, (28_800, 72_000), 3),
                ("c", 52.52, (40_000, 72_000), 1),
            ],
            test_utils::create_profile(15, 30.0),
        );

        let starts = route.schedule(SignedDuration::from_mins(30)).unwrap();

        assert_eq!(starts.len(), 3);
        assert_eq!(starts[0], starts[1]);
        assert!(starts[0] > SignedDuration::from_secs(28_800));
        // Early arrival waits for the window
        assert_eq!(starts[2], SignedDuration::from_secs(40_000));
        assert_eq!(route.num_visits(), 2);
        assert_eq!(route.demand(), 4);
    }

    #[test]
    fn test_feasibility_depends_on_profile() {
        let route = route(
            &[("far", 52.70, (28_800, 30_500), 2)],
            test_utils::create_profile(3, 30.0),
        );

        // About 22 km: 44 minutes at 30 km/h, 27 minutes at 50 km/h
        assert!(!route.is_feasible(SignedDuration::from_mins(30)));

        let route = route.with_profile(test_utils::create_profile(3, 50.0));
        assert!(route.is_feasible(SignedDuration::from_mins(30)));

        let route = route.with_profile(test_utils::create_profile(1, 50.0));
        assert!(!route.is_feasible(SignedDuration::from_mins(30)));
    }
}
