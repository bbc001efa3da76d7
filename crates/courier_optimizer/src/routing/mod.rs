pub mod construction;
pub mod local_search;
pub mod ls;
pub mod route_generator;
pub mod schedule;
pub mod solver_params;
pub mod tour;
