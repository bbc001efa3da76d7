use fxhash::FxHashMap;
use jiff::SignedDuration;
use tracing::{Level, info, instrument, warn};

use crate::{
    dispatch::{
        error::MergeError,
        route::{InhouseRoute, Route},
    },
    problem::{driver::Driver, vehicle_profile::VehicleProfile},
};

const PUBLIC_OWNER: &str = "public vehicle";

/// Validates the routes of both passes and hands public routes to idle drivers.
pub struct RouteMerger {
    public_profile: VehicleProfile,
    service_time: SignedDuration,
}

impl RouteMerger {
    pub fn new(public_profile: VehicleProfile, service_time: SignedDuration) -> Self {
        RouteMerger {
            public_profile,
            service_time,
        }
    }

    /// In-house routes come back ordered by `drivers`, public routes keep their
    /// relative order with demoted routes last. No route is lost or duplicated.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn merge_routes(
        &self,
        inhouse: Vec<InhouseRoute>,
        public: Vec<Route>,
        drivers: &[Driver],
    ) -> Result<(Vec<InhouseRoute>, Vec<Route>), MergeError> {
        let drivers_by_id = drivers
            .iter()
            .map(|driver| (driver.id(), driver))
            .collect::<FxHashMap<_, _>>();

        for route in &public {
            self.ensure_public_capacity(PUBLIC_OWNER, route)?;
        }

        let mut owned: FxHashMap<String, Route> = FxHashMap::default();
        let mut demoted = Vec::new();

        for route in inhouse {
            let rejection = match drivers_by_id.get(route.driver_id()) {
                None => Some("unknown driver"),
                Some(_) if owned.contains_key(route.driver_id()) => Some("driver already has a route"),
                Some(driver) if !driver.profile().fits(route.route().demand()) => {
                    Some("over driver capacity")
                }
                Some(_) => None,
            };

            match rejection {
                None => {
                    let driver_id = route.driver_id().to_owned();
                    owned.insert(driver_id, route.into_route());
                }
                Some(reason) => {
                    warn!(
                        driver = route.driver_id(),
                        pickup = %route.route().key(),
                        reason,
                        "Demoting in-house route to public"
                    );
                    demoted.push(self.demote(route)?);
                }
            }
        }

        let mut public = public
            .into_iter()
            .chain(demoted)
            .map(Some)
            .collect::<Vec<_>>();

        let mut promoted = 0;
        for driver in drivers {
            if owned.contains_key(driver.id()) {
                continue;
            }

            let takeover = public.iter().position(|route| {
                route
                    .as_ref()
                    .is_some_and(|route| can_take_over(driver, route))
            });

            if let Some(route) = takeover.and_then(|position| public[position].take()) {
                info!(
                    driver = driver.id(),
                    pickup = %route.key(),
                    demand = route.demand(),
                    "Idle driver takes over public route"
                );
                owned.insert(driver.id().to_owned(), route.with_profile(driver.profile()));
                promoted += 1;
            }
        }

        let inhouse = drivers
            .iter()
            .filter_map(|driver| {
                owned
                    .remove(driver.id())
                    .map(|route| InhouseRoute::new(driver.id(), route))
            })
            .collect::<Vec<_>>();

        let public = public.into_iter().flatten().collect::<Vec<_>>();

        info!(
            inhouse = inhouse.len(),
            public = public.len(),
            promoted,
            "Merged routes"
        );

        Ok((inhouse, public))
    }

    fn ensure_public_capacity(&self, owner: &str, route: &Route) -> Result<(), MergeError> {
        if self.public_profile.fits(route.demand()) {
            Ok(())
        } else {
            Err(MergeError::CapacityViolation {
                owner: owner.to_owned(),
                pickup: route.key().to_string(),
                demand: route.demand(),
                capacity: self.public_profile.capacity(),
            })
        }
    }

    fn demote(&self, route: InhouseRoute) -> Result<Route, MergeError> {
        self.ensure_public_capacity(route.driver_id(), route.route())?;

        let owner = route.driver_id().to_owned();
        let route = route.into_route().with_profile(self.public_profile);

        if !route.is_feasible(self.service_time) {
            return Err(MergeError::InfeasibleRoute {
                owner,
                pickup: route.key().to_string(),
            });
        }

        Ok(route)
    }
}

/// A faster driver only brings arrivals forward, so every window stays satisfied.
fn can_take_over(driver: &Driver, route: &Route) -> bool {
    driver.profile().fits(route.demand())
        && driver.is_available_during(route.key().window())
        && driver.speed().value() >= route.profile().speed().value()
}
