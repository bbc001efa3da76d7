use std::sync::Arc;

use jiff::SignedDuration;
use rayon::ThreadPool;
use tracing::{info, instrument, warn};

use crate::{
    dispatch::{
        allocator::Allocator, error::DispatchError, merge::RouteMerger, plan::DispatchPlan,
    },
    grouping::{
        locations::{count_stops, group_locations},
        schedule::group_drivers_by_time_slot,
    },
    json::types::{DispatchInput, LocationsByAddress},
    problem::{
        driver::{self, Driver},
        vehicle_profile::VehicleProfile,
    },
    routing::solver_params::SolverParams,
    timer_debug,
};

#[derive(Clone, Debug)]
pub struct DispatchParams {
    /// Fixed time spent at every visit.
    pub service_time: SignedDuration,
    pub public_profile: VehicleProfile,
    /// Report unmatched entries as an error instead of planning without them.
    pub strict: bool,
    pub solver: SolverParams,
}

impl Default for DispatchParams {
    fn default() -> Self {
        DispatchParams {
            service_time: SignedDuration::from_mins(30),
            public_profile: VehicleProfile::PUBLIC,
            strict: false,
            solver: SolverParams::default(),
        }
    }
}

/// Chains grouping, the in-house and public passes and the route merge.
pub struct Optimizer {
    params: DispatchParams,
    thread_pool: Arc<ThreadPool>,
}

impl Optimizer {
    pub fn new(params: DispatchParams) -> Result<Self, DispatchError> {
        let thread_pool = Arc::new(params.solver.build_thread_pool()?);

        Ok(Optimizer {
            params,
            thread_pool,
        })
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    pub fn run_input(&self, input: &DispatchInput) -> Result<DispatchPlan, DispatchError> {
        let drivers = input.drivers()?;
        self.run(&input.locations, &drivers)
    }

    #[instrument(skip_all, fields(drivers = drivers.len(), pickups = locations.len()))]
    pub fn run(
        &self,
        locations: &LocationsByAddress,
        drivers: &[Driver],
    ) -> Result<DispatchPlan, DispatchError> {
        driver::ensure_unique_ids(drivers)?;

        let schedules = timer_debug!("Driver grouping", group_drivers_by_time_slot(drivers));
        let (mut buckets, unmatched) = timer_debug!(
            "Location grouping",
            group_locations(locations, &schedules, self.params.strict)
        );

        info!(
            schedules = schedules.len(),
            buckets = buckets.len(),
            stops = count_stops(&buckets),
            unmatched = unmatched.len(),
            "Grouped input"
        );

        if self.params.strict && !unmatched.is_empty() {
            warn!(unmatched = unmatched.len(), "Strict mode: aborting before allocation");
            return Err(DispatchError::Unmatched(unmatched));
        }

        let allocator = Allocator::new(
            self.params.service_time,
            self.params.public_profile,
            self.params.solver.clone(),
            Arc::clone(&self.thread_pool),
        );

        let inhouse = timer_debug!("In-house pass", allocator.inhouse_pass(&mut buckets, drivers));
        let (public, unserved) = timer_debug!("Public pass", allocator.public_pass(buckets));

        let merger = RouteMerger::new(self.params.public_profile, self.params.service_time);
        let (inhouse, public) = merger.merge_routes(inhouse, public, drivers)?;

        let plan = DispatchPlan::new(inhouse, public, unserved, unmatched);

        info!(
            inhouse = plan.inhouse().len(),
            public = plan.public().len(),
            unserved = plan.unserved().len(),
            unmatched = plan.unmatched().len(),
            "Dispatch plan ready"
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        json::types::{JsonLocationRecord, WindowKey},
        problem::error::InputError,
        routing::solver_params::{Termination, Threads},
        test_utils,
    };

    fn params(strict: bool) -> DispatchParams {
        DispatchParams {
            strict,
            solver: SolverParams {
                termination: Termination {
                    max_duration: SignedDuration::from_secs(10),
                    max_iterations: 1_000,
                },
                threads: Threads::Single,
            },
            ..DispatchParams::default()
        }
    }

    fn record(reference: &str, window: Option<[i64; 2]>, capacity: u32) -> JsonLocationRecord {
        JsonLocationRecord {
            address: Some(format!("{reference} street")),
            coordinates: Some([52.525, 13.41]),
            delivery_window: window,
            capacity: Some(capacity),
            order_time: None,
            reference: Some(reference.to_owned()),
        }
    }

    fn locations() -> LocationsByAddress {
        let anchor = JsonLocationRecord {
            address: None,
            coordinates: Some([52.52, 13.405]),
            delivery_window: None,
            capacity: None,
            order_time: None,
            reference: None,
        };

        let windows = BTreeMap::from([(
            WindowKey::new(28_800, 36_000),
            vec![
                anchor,
                record("a", Some([28_800, 72_000]), 2),
                record("b", Some([28_800, 72_000]), 2),
                record("broken", None, 1),
            ],
        )]);

        LocationsByAddress::from([(test_utils::PICKUP_ADDRESS.to_owned(), windows)])
    }

    #[test]
    fn test_run_plans_every_valid_stop() {
        let drivers = vec![test_utils::create_driver("d1", &[(28_800, 39_600)], 3)];
        let optimizer = Optimizer::new(params(false)).unwrap();

        let plan = optimizer.run(&locations(), &drivers).unwrap();

        assert_eq!(plan.inhouse().len(), 1);
        assert_eq!(plan.inhouse()[0].driver_id(), "d1");
        assert_eq!(plan.public().len(), 1);
        assert!(plan.unserved().is_empty());
        assert_eq!(plan.unmatched().len(), 1);
        assert_eq!(plan.num_routed_orders(), 2);
    }

    #[test]
    fn test_strict_run_fails_on_unmatched() {
        let drivers = vec![test_utils::create_driver("d1", &[(28_800, 39_600)], 3)];
        let optimizer = Optimizer::new(params(true)).unwrap();

        let result = optimizer.run(&locations(), &drivers);

        assert!(matches!(result, Err(DispatchError::Unmatched(entries)) if entries.len() == 1));
    }

    #[test]
    fn test_duplicate_drivers_are_rejected() {
        let drivers = vec![
            test_utils::create_driver("d1", &[(28_800, 39_600)], 3),
            test_utils::create_driver("d1", &[(28_800, 39_600)], 15),
        ];
        let optimizer = Optimizer::new(params(false)).unwrap();

        assert!(matches!(
            optimizer.run(&locations(), &drivers),
            Err(DispatchError::Input(InputError::DuplicateDriver(_)))
        ));
    }
}
