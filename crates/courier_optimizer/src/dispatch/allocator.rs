use std::{cmp::Reverse, sync::Arc};

use fxhash::FxHashSet;
use jiff::SignedDuration;
use rayon::ThreadPool;
use tracing::{Level, debug, info, instrument};

use crate::{
    dispatch::{
        plan::UnservedStop,
        route::{InhouseRoute, Route},
    },
    grouping::{bucket::Bucket, pool::StopIdx},
    problem::{
        driver::{Driver, DriverIdx},
        vehicle_profile::VehicleProfile,
    },
    routing::{route_generator::RouteGenerator, solver_params::SolverParams},
};

/// Runs the in-house and public passes over the buckets.
pub struct Allocator {
    service_time: SignedDuration,
    public_profile: VehicleProfile,
    solver_params: SolverParams,
    thread_pool: Arc<ThreadPool>,
}

impl Allocator {
    pub fn new(
        service_time: SignedDuration,
        public_profile: VehicleProfile,
        solver_params: SolverParams,
        thread_pool: Arc<ThreadPool>,
    ) -> Self {
        Allocator {
            service_time,
            public_profile,
            solver_params,
            thread_pool,
        }
    }

    fn generator(&self, profile: VehicleProfile) -> RouteGenerator {
        RouteGenerator::new(
            profile,
            self.service_time,
            self.solver_params.clone(),
            Arc::clone(&self.thread_pool),
        )
    }

    /// Gives each driver at most one route, the heaviest the generator finds for the
    /// driver in the first bucket that can use them. Buckets left without stops are
    /// dropped.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn inhouse_pass(&self, buckets: &mut Vec<Bucket>, drivers: &[Driver]) -> Vec<InhouseRoute> {
        let mut assigned: FxHashSet<DriverIdx> = FxHashSet::default();
        let mut routes = Vec::new();

        for bucket in buckets.iter_mut() {
            while !bucket.pool().is_exhausted() {
                while bucket
                    .front_driver()
                    .is_some_and(|driver_idx| assigned.contains(&driver_idx))
                {
                    bucket.pop_driver();
                }

                let Some(driver_idx) = bucket.front_driver() else {
                    break;
                };
                let driver = &drivers[driver_idx];
                let profile = driver.profile();

                let candidates = bucket
                    .pool()
                    .remaining()
                    .filter(|(_, stop)| profile.fits(stop.demand()))
                    .map(|(idx, _)| idx)
                    .collect::<Vec<_>>();

                let Some(served) = self.best_route(bucket, &candidates, profile) else {
                    debug!(
                        bucket = %bucket.key(),
                        driver = driver.id(),
                        candidates = candidates.len(),
                        "No route for driver"
                    );
                    break;
                };

                bucket.pop_driver();
                assigned.insert(driver_idx);

                let route = bucket.take_route(&served, profile);
                debug!(
                    bucket = %bucket.key(),
                    driver = driver.id(),
                    visits = served.len(),
                    demand = route.demand(),
                    "Assigned in-house route"
                );
                routes.push(InhouseRoute::new(driver.id(), route));
            }
        }

        buckets.retain(|bucket| !bucket.pool().is_exhausted());

        info!(
            routes = routes.len(),
            drivers = drivers.len(),
            buckets_left = buckets.len(),
            "In-house pass done"
        );

        routes
    }

    /// Heaviest route over `candidates`, as stop indices in visiting order. The first
    /// route wins ties.
    fn best_route(
        &self,
        bucket: &Bucket,
        candidates: &[StopIdx],
        profile: VehicleProfile,
    ) -> Option<Vec<StopIdx>> {
        if candidates.is_empty() {
            return None;
        }

        let locations = bucket.routing_locations(candidates);
        let routes = self
            .generator(profile)
            .generate_routes(&locations, candidates.len());

        routes
            .into_iter()
            .map(|route| {
                route
                    .into_iter()
                    .map(|location| candidates[location - 1])
                    .collect::<Vec<_>>()
            })
            .min_by_key(|stops| {
                Reverse(
                    stops
                        .iter()
                        .map(|&idx| bucket.pool().stop(idx).demand())
                        .sum::<u32>(),
                )
            })
    }

    /// Routes what is left of every bucket with the public vehicle. Stops no route
    /// could take are returned as unserved.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn public_pass(&self, buckets: Vec<Bucket>) -> (Vec<Route>, Vec<UnservedStop>) {
        let generator = self.generator(self.public_profile);
        let mut routes = Vec::new();
        let mut unserved = Vec::new();

        for mut bucket in buckets {
            let candidates = bucket
                .pool()
                .remaining()
                .map(|(idx, _)| idx)
                .collect::<Vec<_>>();

            if !candidates.is_empty() {
                let locations = bucket.routing_locations(&candidates);
                let generated = generator.generate_routes(&locations, candidates.len());

                debug!(
                    bucket = %bucket.key(),
                    candidates = candidates.len(),
                    routes = generated.len(),
                    "Public routes"
                );

                for route in generated {
                    let served = route
                        .into_iter()
                        .map(|location| candidates[location - 1])
                        .collect::<Vec<_>>();
                    routes.push(bucket.take_route(&served, self.public_profile));
                }
            }

            let (key, pool) = bucket.into_parts();
            unserved.extend(
                pool.into_remaining()
                    .into_iter()
                    .map(|stop| UnservedStop::new(key.clone(), stop)),
            );
        }

        info!(
            routes = routes.len(),
            unserved = unserved.len(),
            "Public pass done"
        );

        (routes, unserved)
    }
}
