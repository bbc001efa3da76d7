use jiff::SignedDuration;

use crate::{
    define_index_newtype,
    problem::{
        location::{Location, LocationIdx},
        time_window::TimeWindow,
        travel_matrix::TravelMatrix,
        vehicle_profile::VehicleProfile,
    },
    routing::schedule::{self, Leg},
};

/// Location 0 of every routing call is the pickup anchor.
pub const ANCHOR: LocationIdx = LocationIdx::new(0);

define_index_newtype!(TourIdx, Tour);

/// Everything a route generation call needs to evaluate tours: the locations,
/// their travel matrix and the vehicle the tours are planned for.
pub struct RoutingContext<'a> {
    locations: &'a [&'a Location],
    matrix: TravelMatrix,
    profile: VehicleProfile,
    service_time: SignedDuration,
}

impl<'a> RoutingContext<'a> {
    pub fn new(
        locations: &'a [&'a Location],
        profile: VehicleProfile,
        service_time: SignedDuration,
    ) -> Self {
        RoutingContext {
            locations,
            matrix: TravelMatrix::from_haversine(locations, profile.speed()),
            profile,
            service_time,
        }
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn location(&self, idx: LocationIdx) -> &Location {
        self.locations[idx]
    }

    pub fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    pub fn demand(&self, idx: LocationIdx) -> u32 {
        self.location(idx).demand()
    }

    pub fn window(&self, idx: LocationIdx) -> &TimeWindow {
        self.location(idx).delivery_window()
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> SignedDuration {
        self.matrix.travel_time(from, to)
    }

    pub fn dwell(&self, idx: LocationIdx) -> SignedDuration {
        self.service_time + self.location(idx).order_time()
    }

    /// Vehicles leave the anchor when its window opens.
    pub fn departure(&self) -> SignedDuration {
        self.window(ANCHOR).start()
    }

    /// Checks the delivery windows of a visiting order, anchor excluded.
    pub fn is_feasible<I>(&self, visits: I) -> bool
    where
        I: IntoIterator<Item = LocationIdx>,
    {
        let mut previous = ANCHOR;
        let legs = visits.into_iter().map(|visit| {
            let leg = Leg {
                travel: self.travel_time(previous, visit),
                window: *self.window(visit),
                dwell: self.dwell(visit),
            };
            previous = visit;
            leg
        });

        schedule::simulate(self.departure(), legs, |_| {}).is_ok()
    }

    /// A location can be routed at all when it fits the vehicle and a direct trip
    /// from the anchor reaches it in time.
    pub fn is_servable(&self, idx: LocationIdx) -> bool {
        idx != ANCHOR
            && self.profile.fits(self.demand(idx))
            && self.is_feasible(std::iter::once(idx))
    }
}

/// Visiting order of one vehicle. The anchor is implicit at both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tour {
    visits: Vec<LocationIdx>,
    demand: u32,
}

impl Tour {
    pub fn visits(&self) -> &[LocationIdx] {
        &self.visits
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Location at `position`, the anchor past the last visit.
    pub fn location_at(&self, position: usize) -> LocationIdx {
        self.visits.get(position).copied().unwrap_or(ANCHOR)
    }

    pub fn previous_location(&self, position: usize) -> LocationIdx {
        if position == 0 {
            ANCHOR
        } else {
            self.visits[position - 1]
        }
    }

    pub fn next_location(&self, position: usize) -> LocationIdx {
        self.location_at(position + 1)
    }

    pub fn insert(&mut self, context: &RoutingContext, location: LocationIdx, position: usize) {
        self.demand += context.demand(location);
        self.visits.insert(position, location);
    }

    pub fn remove(&mut self, context: &RoutingContext, position: usize) -> LocationIdx {
        let location = self.visits.remove(position);
        self.demand -= context.demand(location);
        location
    }

    /// Reverses the visits between `from` and `to`, both included.
    pub fn reverse(&mut self, from: usize, to: usize) {
        self.visits[from..=to].reverse();
    }

    /// Visiting order with `location` inserted at `position`.
    pub fn with_insertion(
        &self,
        location: LocationIdx,
        position: usize,
    ) -> impl Iterator<Item = LocationIdx> + '_ {
        self.visits[..position]
            .iter()
            .copied()
            .chain(std::iter::once(location))
            .chain(self.visits[position..].iter().copied())
    }

    /// Visiting order without the visit at `position`.
    pub fn without(&self, position: usize) -> impl Iterator<Item = LocationIdx> + '_ {
        self.visits[..position]
            .iter()
            .chain(self.visits[position + 1..].iter())
            .copied()
    }

    /// Added travel time when inserting `location` before the visit at `position`.
    pub fn insertion_delta(
        &self,
        context: &RoutingContext,
        location: LocationIdx,
        position: usize,
    ) -> SignedDuration {
        let previous = self.previous_location(position);
        let next = self.location_at(position);

        context.travel_time(previous, location) + context.travel_time(location, next)
            - context.travel_time(previous, next)
    }

    /// Travel time from the anchor through every visit and back.
    pub fn travel_duration(&self, context: &RoutingContext) -> SignedDuration {
        let mut previous = ANCHOR;
        let mut total = SignedDuration::ZERO;

        for &visit in self.visits.iter().chain(std::iter::once(&ANCHOR)) {
            total += context.travel_time(previous, visit);
            previous = visit;
        }

        total
    }

    /// Travel plus the dwell of every visit.
    pub fn total_duration(&self, context: &RoutingContext) -> SignedDuration {
        self.visits
            .iter()
            .fold(self.travel_duration(context), |total, &visit| {
                total + context.dwell(visit)
            })
    }

    pub fn is_feasible(&self, context: &RoutingContext) -> bool {
        context.profile().fits(self.demand) && context.is_feasible(self.visits.iter().copied())
    }
}
