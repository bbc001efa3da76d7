use jiff::SignedDuration;

use crate::problem::{kmh::Kmh, meters::Meters};

/// Capacity and speed a route is planned with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    capacity: u32,
    speed: Kmh,
}

impl VehicleProfile {
    /// Pooled third-party carrier used for the public pass.
    pub const PUBLIC: VehicleProfile = VehicleProfile::new(30, Kmh::new(30.0));

    pub const fn new(capacity: u32, speed: Kmh) -> Self {
        VehicleProfile { capacity, speed }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn speed(&self) -> Kmh {
        self.speed
    }

    pub fn fits(&self, demand: u32) -> bool {
        demand <= self.capacity
    }

    pub fn travel_time(&self, distance: Meters) -> SignedDuration {
        distance / self.speed
    }
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self::PUBLIC
    }
}
