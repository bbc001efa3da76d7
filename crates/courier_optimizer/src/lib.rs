pub mod dispatch;
pub mod grouping;
pub mod json;
pub mod problem;
pub mod routing;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
