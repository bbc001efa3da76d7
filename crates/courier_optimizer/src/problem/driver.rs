use crate::{
    define_index_newtype,
    problem::{
        error::InputError, kmh::Kmh, time_window::TimeWindow, vehicle_profile::VehicleProfile,
    },
};

define_index_newtype!(DriverIdx, Driver);

#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    id: String,
    time_slots: Vec<TimeWindow>,
    capacity: u32,
    speed: Kmh,
}

impl Driver {
    pub fn new(
        id: impl Into<String>,
        time_slots: Vec<TimeWindow>,
        capacity: u32,
        speed: Kmh,
    ) -> Result<Self, InputError> {
        let id = id.into();

        if time_slots.is_empty() {
            return Err(InputError::NoTimeSlots(id));
        }

        if !speed.is_valid() {
            return Err(InputError::InvalidSpeed {
                id,
                speed: speed.value(),
            });
        }

        Ok(Driver {
            id,
            time_slots,
            capacity,
            speed,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time_slots(&self) -> &[TimeWindow] {
        &self.time_slots
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn speed(&self) -> Kmh {
        self.speed
    }

    pub fn profile(&self) -> VehicleProfile {
        VehicleProfile::new(self.capacity, self.speed)
    }

    pub fn is_available_during(&self, window: &TimeWindow) -> bool {
        self.time_slots.iter().any(|slot| slot.overlaps(window))
    }
}

/// Rejects a driver list that reuses an id.
pub fn ensure_unique_ids(drivers: &[Driver]) -> Result<(), InputError> {
    let mut seen = fxhash::FxHashSet::default();

    for driver in drivers {
        if !seen.insert(driver.id()) {
            return Err(InputError::DuplicateDriver(driver.id().to_owned()));
        }
    }

    Ok(())
}
