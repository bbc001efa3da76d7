use jiff::SignedDuration;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::routing::{
    ls::{
        inter_relocate::InterRelocateOperator,
        r#move::{LocalSearchMove, LocalSearchOperator},
        relocate::RelocateOperator,
        two_opt::TwoOptOperator,
    },
    solver_params::SearchBudget,
    tour::{RoutingContext, Tour, TourIdx},
};

type TourPair = (TourIdx, TourIdx);

/// Best-improvement descent: every iteration applies the single best strictly
/// improving move over all tour pairs.
pub struct LocalSearch {
    pairs: Vec<TourPair>,
}

struct CandidateMove {
    pair: usize,
    delta: SignedDuration,
    op: LocalSearchMove,
}

impl LocalSearch {
    pub fn new() -> Self {
        LocalSearch { pairs: Vec::new() }
    }

    /// Improves `tours` in place until no move improves or the budget runs out.
    /// Returns the number of applied moves.
    #[instrument(skip_all, level = "debug")]
    pub fn intensify(
        &mut self,
        context: &RoutingContext,
        tours: &mut Vec<Tour>,
        budget: &mut SearchBudget,
    ) -> usize {
        let mut applied = 0;

        loop {
            if budget.is_exhausted() {
                debug!(applied, "Local search budget exhausted");
                break;
            }

            self.build_pairs(tours);

            let Some(best) = self.find_best_move(context, tours) else {
                break;
            };

            debug!(
                operator = best.op.operator_name(),
                delta = ?best.delta,
                "Applying move"
            );

            best.op.apply(context, tours);
            budget.record_iteration();
            applied += 1;
        }

        tours.retain(|tour| !tour.is_empty());

        applied
    }

    fn build_pairs(&mut self, tours: &[Tour]) {
        self.pairs.clear();

        let routes = (0..tours.len()).map(TourIdx::new);
        for r1 in routes.clone().filter(|&r1| !tours[r1].is_empty()) {
            self.pairs.extend(routes.clone().map(|r2| (r1, r2)));
        }
    }

    fn find_best_move(&self, context: &RoutingContext, tours: &[Tour]) -> Option<CandidateMove> {
        self.pairs
            .par_iter()
            .enumerate()
            .filter_map(|(pair, &(r1, r2))| {
                let mut best_delta = SignedDuration::ZERO;
                let mut best_move: Option<LocalSearchMove> = None;

                TwoOptOperator::generate_moves(tours, (r1, r2), |op| {
                    let delta = op.delta(context, tours);
                    if delta < best_delta && op.is_valid(context, tours) {
                        best_delta = delta;
                        best_move = Some(LocalSearchMove::TwoOpt(op));
                    }
                });

                RelocateOperator::generate_moves(tours, (r1, r2), |op| {
                    let delta = op.delta(context, tours);
                    if delta < best_delta && op.is_valid(context, tours) {
                        best_delta = delta;
                        best_move = Some(LocalSearchMove::Relocate(op));
                    }
                });

                InterRelocateOperator::generate_moves(tours, (r1, r2), |op| {
                    let delta = op.delta(context, tours);
                    if delta < best_delta && op.is_valid(context, tours) {
                        best_delta = delta;
                        best_move = Some(LocalSearchMove::InterRelocate(op));
                    }
                });

                best_move.map(|op| CandidateMove {
                    pair,
                    delta: best_delta,
                    op,
                })
            })
            .min_by_key(|candidate| (candidate.delta, candidate.pair))
    }
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::new()
    }
}
