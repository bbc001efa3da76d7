pub mod bucket;
pub mod locations;
pub mod pool;
pub mod schedule;
