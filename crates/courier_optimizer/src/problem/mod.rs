pub mod driver;
pub mod error;
pub mod kmh;
pub mod location;
pub mod meters;
pub mod stop;
pub mod time_window;
pub mod travel_matrix;
pub mod vehicle_profile;
