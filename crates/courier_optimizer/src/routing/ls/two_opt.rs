use jiff::SignedDuration;

use crate::routing::{
    ls::r#move::LocalSearchOperator,
    tour::{RoutingContext, Tour, TourIdx},
};

/// **Intra-Route 2-Opt**
///
/// Reverses the visits between `from` and `to` (inclusive).
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///
/// AFTER:
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
///
/// Edges Removed: (prev->from), (to->next)
/// Edges Added:   (prev->to),   (from->next)
/// ```
///
/// Travel times are symmetric so the reversed segment keeps its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoOptParams {
    pub tour: TourIdx,
    pub from: usize,
    pub to: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        debug_assert!(params.from < params.to, "TwoOpt: cannot have from >= to");

        TwoOptOperator { params }
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(tours: &[Tour], (r1, r2): (TourIdx, TourIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let tour = &tours[r1];

        for from in 0..tour.len().saturating_sub(1) {
            for to in (from + 1)..tour.len() {
                consumer(TwoOptOperator::new(TwoOptParams { tour: r1, from, to }));
            }
        }
    }

    fn delta(&self, context: &RoutingContext, tours: &[Tour]) -> SignedDuration {
        let tour = &tours[self.params.tour];

        let prev = tour.previous_location(self.params.from);
        let from = tour.location_at(self.params.from);
        let to = tour.location_at(self.params.to);
        let next = tour.next_location(self.params.to);

        let current = context.travel_time(prev, from) + context.travel_time(to, next);
        let updated = context.travel_time(prev, to) + context.travel_time(from, next);

        updated - current
    }

    fn is_valid(&self, context: &RoutingContext, tours: &[Tour]) -> bool {
        let visits = tours[self.params.tour].visits();
        let (from, to) = (self.params.from, self.params.to);

        context.is_feasible(
            visits[..from]
                .iter()
                .chain(visits[from..=to].iter().rev())
                .chain(visits[to + 1..].iter())
                .copied(),
        )
    }

    fn apply(&self, _context: &RoutingContext, tours: &mut [Tour]) {
        tours[self.params.tour.get()].reverse(self.params.from, self.params.to);
    }
}
