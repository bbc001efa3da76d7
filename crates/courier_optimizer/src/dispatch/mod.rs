pub mod allocator;
pub mod error;
pub mod merge;
pub mod optimizer;
pub mod plan;
pub mod route;
