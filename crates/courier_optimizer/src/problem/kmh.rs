use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Kmh(f64);

impl Kmh {
    /// Slowest speed a vehicle is planned with.
    pub const MIN: Kmh = Kmh(1.0);

    pub const fn new(value: f64) -> Self {
        Kmh(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 >= Self::MIN.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(Kmh::new(25.0).is_valid());
        assert!(Kmh::MIN.is_valid());
        assert!(!Kmh::new(0.0).is_valid());
        assert!(!Kmh::new(1e-300).is_valid());
        assert!(!Kmh::new(f64::INFINITY).is_valid());
        assert!(!Kmh::new(f64::NAN).is_valid());
    }
}
