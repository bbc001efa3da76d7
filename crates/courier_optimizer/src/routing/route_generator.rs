use std::sync::Arc;

use jiff::SignedDuration;
use rayon::ThreadPool;
use tracing::{Level, debug, instrument, warn};

use crate::{
    problem::{
        location::{Location, LocationIdx},
        vehicle_profile::VehicleProfile,
    },
    routing::{
        construction::construct_tours,
        local_search::LocalSearch,
        solver_params::{SearchBudget, SolverParams},
        tour::RoutingContext,
    },
    timer_debug,
};

/// Capacitated routing with delivery windows around a single pickup anchor.
pub struct RouteGenerator {
    profile: VehicleProfile,
    service_time: SignedDuration,
    params: SolverParams,
    thread_pool: Arc<ThreadPool>,
}

impl RouteGenerator {
    pub fn new(
        profile: VehicleProfile,
        service_time: SignedDuration,
        params: SolverParams,
        thread_pool: Arc<ThreadPool>,
    ) -> Self {
        RouteGenerator {
            profile,
            service_time,
            params,
            thread_pool,
        }
    }

    pub fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    /// `locations[0]` is the anchor. Returns at most `num_vehicles` routes, each the
    /// delivery indices (`>= 1`) in visiting order. An empty result means nothing
    /// could be routed.
    #[instrument(
        skip_all,
        level = Level::DEBUG,
        fields(
            locations = locations.len(),
            num_vehicles = num_vehicles,
            capacity = self.profile.capacity()
        )
    )]
    pub fn generate_routes(&self, locations: &[&Location], num_vehicles: usize) -> Vec<Vec<usize>> {
        if locations.len() < 2 || num_vehicles == 0 {
            return vec![];
        }

        let context = RoutingContext::new(locations, self.profile, self.service_time);

        let candidates = (1..locations.len())
            .map(LocationIdx::new)
            .filter(|&idx| context.is_servable(idx))
            .collect::<Vec<_>>();

        if candidates.len() + 1 < locations.len() {
            debug!(
                excluded = locations.len() - 1 - candidates.len(),
                "Excluded locations over capacity or out of reach"
            );
        }

        if candidates.is_empty() {
            return vec![];
        }

        let mut budget = SearchBudget::start(&self.params.termination);

        self.thread_pool.install(|| {
            let Some(mut tours) = timer_debug!(
                "Construction",
                construct_tours(&context, &candidates, num_vehicles, &budget)
            ) else {
                warn!(
                    max_duration = ?self.params.termination.max_duration,
                    "Route construction ran out of time"
                );
                return vec![];
            };

            let applied = timer_debug!(
                "Local search",
                LocalSearch::new().intensify(&context, &mut tours, &mut budget)
            );

            let objective = tours
                .iter()
                .fold(SignedDuration::ZERO, |total, tour| total + tour.total_duration(&context));

            debug!(
                routes = tours.len(),
                applied,
                iterations = budget.iterations(),
                objective = %objective,
                "Generated routes"
            );

            tours
                .into_iter()
                .map(|tour| tour.visits().iter().map(LocationIdx::get).collect())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        routing::{
            schedule,
            solver_params::{Termination, Threads},
        },
        test_utils,
    };

    fn generator(capacity: u32, speed: f64) -> RouteGenerator {
        RouteGenerator::new(
            test_utils::create_profile(capacity, speed),
            SignedDuration::from_mins(30),
            SolverParams {
                termination: Termination {
                    max_duration: SignedDuration::from_secs(10),
                    max_iterations: 1_000,
                },
                threads: Threads::Single,
            },
            test_utils::create_thread_pool(),
        )
    }

    /// Checks the window of every delivery of `route`, departing the anchor at its
    /// window start.
    fn assert_route_feasible(locations: &[&Location], route: &[usize], speed: f64) {
        let profile = test_utils::create_profile(u32::MAX, speed);
        let mut previous = locations[0];

        let legs = route
            .iter()
            .map(|&idx| {
                let location = locations[idx];
                let leg = schedule::Leg {
                    travel: profile.travel_time(previous.haversine_distance(location)),
                    window: *location.delivery_window(),
                    dwell: SignedDuration::from_mins(30) + location.order_time(),
                };
                previous = location;
                leg
            })
            .collect::<Vec<_>>();

        schedule::simulate(locations[0].delivery_window().start(), legs, |_| {})
            .expect("route meets every window");
    }

    #[test]
    fn test_empty_input() {
        let anchor = test_utils::create_anchor(52.52, 13.405, (28_800, 36_000));
        let generator = generator(3, 25.0);

        assert!(generator.generate_routes(&[&anchor], 3).is_empty());
        assert!(generator.generate_routes(&[], 3).is_empty());
    }

    #[test]
    fn test_routes_respect_capacity_and_windows() {
        let locations = test_utils::create_ring_locations(12, 3);
        let refs = locations.iter().collect::<Vec<_>>();
        let generator = generator(6, 25.0);

        let routes = generator.generate_routes(&refs, 12);

        let mut served = routes.iter().flatten().copied().collect::<Vec<_>>();
        served.sort_unstable();
        served.dedup();
        assert_eq!(served.len(), routes.iter().map(Vec::len).sum::<usize>());
        assert!(served.iter().all(|&idx| (1..locations.len()).contains(&idx)));

        for route in &routes {
            let demand: u32 = route.iter().map(|&idx| locations[idx].demand()).sum();
            assert!(demand <= 6);
            assert_route_feasible(&refs, route, 25.0);
        }
    }

    #[test]
    fn test_skips_location_over_capacity() {
        let locations = [
            test_utils::create_anchor(52.52, 13.405, (28_800, 36_000)),
            test_utils::create_location("small", 52.53, 13.41, (28_800, 72_000), 2),
            test_utils::create_location("big", 52.53, 13.42, (28_800, 72_000), 5),
        ];
        let refs = locations.iter().collect::<Vec<_>>();

        let routes = generator(3, 25.0).generate_routes(&refs, 2);

        assert_eq!(routes, vec![vec![1]]);
    }

    #[test]
    fn test_deterministic_across_thread_counts() {
        let locations = test_utils::create_ring_locations(15, 2);
        let refs = locations.iter().collect::<Vec<_>>();

        let single = generator(5, 25.0).generate_routes(&refs, 15);

        let multi = RouteGenerator::new(
            test_utils::create_profile(5, 25.0),
            SignedDuration::from_mins(30),
            SolverParams {
                termination: Termination {
                    max_duration: SignedDuration::from_secs(10),
                    max_iterations: 1_000,
                },
                threads: Threads::Multi(4),
            },
            Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(4)
                    .build()
                    .unwrap(),
            ),
        )
        .generate_routes(&refs, 15);

        assert_eq!(single, multi);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let locations = test_utils::create_ring_locations(6, 2);
        let before = locations.clone();
        let refs = locations.iter().collect::<Vec<_>>();

        generator(4, 25.0).generate_routes(&refs, 6);

        assert_eq!(locations, before);
    }
}
