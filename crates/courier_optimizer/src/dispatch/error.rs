use rayon::ThreadPoolBuildError;
use thiserror::Error;

use crate::{grouping::locations::UnmatchedEntry, problem::error::InputError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    #[error("route of {owner} at {pickup} carries {demand} units, capacity is {capacity}")]
    CapacityViolation {
        owner: String,
        pickup: String,
        demand: u32,
        capacity: u32,
    },
    #[error("route of {owner} at {pickup} misses a delivery window at the public speed")]
    InfeasibleRoute { owner: String, pickup: String },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{} location entries could not be matched", .0.len())]
    Unmatched(Vec<UnmatchedEntry>),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("failed to build the solver thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}
