use jiff::SignedDuration;

use crate::{
    problem::location::LocationIdx,
    routing::{
        ls::r#move::LocalSearchOperator,
        tour::{ANCHOR, RoutingContext, Tour, TourIdx},
    },
};

/// **Intra-Route Relocate**
///
/// Moves the visit at `from` so that it ends up at position `to` of the same tour.
///
/// ```text
/// BEFORE:
///    ... (A) -> [from] -> (B) ... (X) -> (Y) ...
///
/// AFTER:
///    ... (A) -> (B) ... (X) -> [from] -> (Y) ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocateOperator {
    params: RelocateParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocateParams {
    pub tour: TourIdx,
    pub from: usize,
    /// Position in the tour once the visit has been removed.
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateParams) -> Self {
        debug_assert_ne!(params.from, params.to, "Relocate: from and to must differ");

        RelocateOperator { params }
    }

    /// Neighbours of position `to` once the visit at `from` is gone.
    fn insertion_neighbours(&self, tour: &Tour) -> (LocationIdx, LocationIdx) {
        let reduced = |position: usize| {
            if position >= self.params.from {
                tour.location_at(position + 1)
            } else {
                tour.location_at(position)
            }
        };

        let previous = if self.params.to == 0 {
            ANCHOR
        } else {
            reduced(self.params.to - 1)
        };

        (previous, reduced(self.params.to))
    }
}

impl LocalSearchOperator for RelocateOperator {
    fn generate_moves<C>(tours: &[Tour], (r1, r2): (TourIdx, TourIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let tour = &tours[r1];

        for from in 0..tour.len() {
            for to in 0..tour.len() {
                if from != to {
                    consumer(RelocateOperator::new(RelocateParams { tour: r1, from, to }));
                }
            }
        }
    }

    fn delta(&self, context: &RoutingContext, tours: &[Tour]) -> SignedDuration {
        let tour = &tours[self.params.tour];

        let moved = tour.location_at(self.params.from);
        let a = tour.previous_location(self.params.from);
        let b = tour.next_location(self.params.from);

        let (x, y) = self.insertion_neighbours(tour);

        context.travel_time(a, b) - context.travel_time(a, moved) - context.travel_time(moved, b)
            + context.travel_time(x, moved)
            + context.travel_time(moved, y)
            - context.travel_time(x, y)
    }

    fn is_valid(&self, context: &RoutingContext, tours: &[Tour]) -> bool {
        let tour = &tours[self.params.tour];
        let moved = tour.location_at(self.params.from);

        let mut visits = tour.without(self.params.from).collect::<Vec<_>>();
        visits.insert(self.params.to, moved);

        context.is_feasible(visits)
    }

    fn apply(&self, context: &RoutingContext, tours: &mut [Tour]) {
        let tour = &mut tours[self.params.tour.get()];
        let moved = tour.remove(context, self.params.from);
        tour.insert(context, moved, self.params.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn relocate(from: usize, to: usize) -> RelocateOperator {
        RelocateOperator::new(RelocateParams {
            tour: TourIdx::new(0),
            from,
            to,
        })
    }

    #[test]
    fn test_relocate_forward_and_backward() {
        let locations = test_utils::create_line_locations(5);
        let refs = locations.iter().collect::<Vec<_>>();
        let context = test_utils::create_routing_context(&refs, 10);

        for (from, to, expected) in [
            (0, 3, [2, 3, 4, 1]),
            (3, 0, [4, 1, 2, 3]),
            (1, 2, [1, 3, 2, 4]),
        ] {
            let mut tours = vec![test_utils::create_tour(&context, &[1, 2, 3, 4])];
            let before = tours[0].travel_duration(&context);
            let op = relocate(from, to);
            let delta = op.delta(&context, &tours);

            op.apply(&context, &mut tours);

            let expected = expected.map(LocationIdx::new);
            assert_eq!(tours[0].visits(), &expected);
            assert_eq!(tours[0].travel_duration(&context), before + delta);
            assert_eq!(tours[0].demand(), 4);
        }
    }

    #[test]
    fn test_improving_relocate() {
        let locations = test_utils::create_line_locations(4);
        let refs = locations.iter().collect::<Vec<_>>();
        let context = test_utils::create_routing_context(&refs, 10);
        let tours = vec![test_utils::create_tour(&context, &[2, 1, 3])];

        let op = relocate(1, 0);

        assert!(op.delta(&context, &tours) < SignedDuration::ZERO);
        assert!(op.is_valid(&context, &tours));
    }
}
