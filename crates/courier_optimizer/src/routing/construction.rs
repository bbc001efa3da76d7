use jiff::SignedDuration;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::{
    problem::location::LocationIdx,
    routing::{
        solver_params::SearchBudget,
        tour::{ANCHOR, RoutingContext, Tour},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Insertion {
    candidate: usize,
    location: LocationIdx,
    position: usize,
    delta: SignedDuration,
}

impl Insertion {
    fn key(&self) -> (SignedDuration, LocationIdx, usize) {
        (self.delta, self.location, self.position)
    }
}

/// Sequential insertion: a tour is seeded with the most urgent location, then grown
/// with the cheapest feasible insertion until nothing fits anymore.
///
/// Returns `None` when the time budget runs out before every tour is closed.
pub fn construct_tours(
    context: &RoutingContext,
    candidates: &[LocationIdx],
    num_vehicles: usize,
    budget: &SearchBudget,
) -> Option<Vec<Tour>> {
    let mut unrouted = candidates.to_vec();
    let mut tours = Vec::new();

    while !unrouted.is_empty() && tours.len() < num_vehicles {
        let seed_position = select_seed(context, &unrouted)?;
        let seed = unrouted.remove(seed_position);

        let mut tour = Tour::default();
        tour.insert(context, seed, 0);

        loop {
            if budget.is_time_exhausted() {
                return None;
            }

            let Some(insertion) = best_insertion(context, &tour, &unrouted) else {
                break;
            };

            unrouted.remove(insertion.candidate);
            tour.insert(context, insertion.location, insertion.position);
        }

        debug!(
            tour = tours.len(),
            visits = tour.len(),
            demand = tour.demand(),
            "Closed tour"
        );
        tours.push(tour);
    }

    Some(tours)
}

/// Earliest window end first, then the location farthest from the anchor.
fn select_seed(context: &RoutingContext, unrouted: &[LocationIdx]) -> Option<usize> {
    unrouted
        .iter()
        .enumerate()
        .min_by(|&(_, &a), &(_, &b)| {
            context
                .window(a)
                .end()
                .cmp(&context.window(b).end())
                .then_with(|| {
                    context
                        .travel_time(ANCHOR, b)
                        .cmp(&context.travel_time(ANCHOR, a))
                })
                .then_with(|| a.cmp(&b))
        })
        .map(|(position, _)| position)
}

fn best_insertion(
    context: &RoutingContext,
    tour: &Tour,
    unrouted: &[LocationIdx],
) -> Option<Insertion> {
    let capacity = context.profile().capacity();

    unrouted
        .par_iter()
        .enumerate()
        .filter(|&(_, &location)| tour.demand() + context.demand(location) <= capacity)
        .filter_map(|(candidate, &location)| {
            (0..=tour.len())
                .filter_map(|position| {
                    let insertion = Insertion {
                        candidate,
                        location,
                        position,
                        delta: tour.insertion_delta(context, location, position),
                    };

                    context
                        .is_feasible(tour.with_insertion(location, position))
                        .then_some(insertion)
                })
                .min_by_key(Insertion::key)
        })
        .min_by_key(Insertion::key)
}
