use jiff::SignedDuration;

use crate::routing::{
    ls::{inter_relocate::InterRelocateOperator, relocate::RelocateOperator, two_opt::TwoOptOperator},
    tour::{RoutingContext, Tour, TourIdx},
};

pub trait LocalSearchOperator: Sized {
    /// Calls `consumer` with every move of this kind between the tours of `pair`.
    fn generate_moves<C>(tours: &[Tour], pair: (TourIdx, TourIdx), consumer: C)
    where
        C: FnMut(Self);

    /// Change in total travel time. Negative when the move improves the tours.
    fn delta(&self, context: &RoutingContext, tours: &[Tour]) -> SignedDuration;

    /// Capacity and delivery windows still hold after the move.
    fn is_valid(&self, context: &RoutingContext, tours: &[Tour]) -> bool;

    fn apply(&self, context: &RoutingContext, tours: &mut [Tour]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSearchMove {
    /// Reverses a segment of one tour.
    TwoOpt(TwoOptOperator),
    /// Moves a visit to another position of the same tour.
    Relocate(RelocateOperator),
    /// Moves a visit from one tour to another.
    InterRelocate(InterRelocateOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::TwoOpt(_) => "Two-Opt",
            LocalSearchMove::Relocate(_) => "Relocate",
            LocalSearchMove::InterRelocate(_) => "Inter-Relocate",
        }
    }

    pub fn delta(&self, context: &RoutingContext, tours: &[Tour]) -> SignedDuration {
        match self {
            LocalSearchMove::TwoOpt(op) => op.delta(context, tours),
            LocalSearchMove::Relocate(op) => op.delta(context, tours),
            LocalSearchMove::InterRelocate(op) => op.delta(context, tours),
        }
    }

    pub fn is_valid(&self, context: &RoutingContext, tours: &[Tour]) -> bool {
        match self {
            LocalSearchMove::TwoOpt(op) => op.is_valid(context, tours),
            LocalSearchMove::Relocate(op) => op.is_valid(context, tours),
            LocalSearchMove::InterRelocate(op) => op.is_valid(context, tours),
        }
    }

    pub fn apply(&self, context: &RoutingContext, tours: &mut [Tour]) {
        match self {
            LocalSearchMove::TwoOpt(op) => op.apply(context, tours),
            LocalSearchMove::Relocate(op) => op.apply(context, tours),
            LocalSearchMove::InterRelocate(op) => op.apply(context, tours),
        }
    }
}
