use jiff::SignedDuration;

use crate::routing::{
    ls::r#move::LocalSearchOperator,
    tour::{RoutingContext, Tour, TourIdx},
};

/// **Inter-Route Relocate**
///
/// Moves the visit at `from` in `from_tour` to position `to` in `to_tour`.
/// A tour emptied by the move is dropped once the search ends.
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [from] -> (B) ...
///    R2: ... (X) -> (Y) ...
///
/// AFTER:
///    R1: ... (A) -> (B) ...
///    R2: ... (X) -> [from] -> (Y) ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterRelocateOperator {
    params: InterRelocateParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterRelocateParams {
    pub from_tour: TourIdx,
    pub to_tour: TourIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateParams) -> Self {
        debug_assert_ne!(
            params.from_tour, params.to_tour,
            "InterRelocate cannot be used for intra-route relocation"
        );

        InterRelocateOperator { params }
    }
}

impl LocalSearchOperator for InterRelocateOperator {
    fn generate_moves<C>(tours: &[Tour], (r1, r2): (TourIdx, TourIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let source = &tours[r1];
        let target = &tours[r2];

        for from in 0..source.len() {
            for to in 0..=target.len() {
                consumer(InterRelocateOperator::new(InterRelocateParams {
                    from_tour: r1,
                    to_tour: r2,
                    from,
                    to,
                }));
            }
        }
    }

    fn delta(&self, context: &RoutingContext, tours: &[Tour]) -> SignedDuration {
        let source = &tours[self.params.from_tour];
        let target = &tours[self.params.to_tour];

        let moved = source.location_at(self.params.from);
        let a = source.previous_location(self.params.from);
        let b = source.next_location(self.params.from);

        let removal =
            context.travel_time(a, b) - context.travel_time(a, moved) - context.travel_time(moved, b);

        removal + target.insertion_delta(context, moved, self.params.to)
    }

    fn is_valid(&self, context: &RoutingContext, tours: &[Tour]) -> bool {
        let source = &tours[self.params.from_tour];
        let target = &tours[self.params.to_tour];
        let moved = source.location_at(self.params.from);

        context
            .profile()
            .fits(target.demand() + context.demand(moved))
            && context.is_feasible(target.with_insertion(moved, self.params.to))
            && context.is_feasible(source.without(self.params.from))
    }

    fn apply(&self, context: &RoutingContext, tours: &mut [Tour]) {
        let moved = tours[self.params.from_tour.get()].remove(context, self.params.from);
        tours[self.params.to_tour.get()].insert(context, moved, self.params.to);
    }
}
