use jiff::SignedDuration;

use crate::problem::{
    kmh::Kmh,
    location::{Location, LocationIdx},
};

/// Flat travel-time matrix between the locations of one routing call.
/// The entry for a pair is stored at `from * num_locations + to`.
pub struct TravelMatrix {
    times: Vec<SignedDuration>,
    num_locations: usize,
}

impl TravelMatrix {
    pub fn from_haversine(locations: &[&Location], speed: Kmh) -> Self {
        let num_locations = locations.len();
        let mut times = vec![SignedDuration::ZERO; num_locations * num_locations];

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate().skip(i + 1) {
                let time = from.haversine_distance(to) / speed;

                times[i * num_locations + j] = time;
                times[j * num_locations + i] = time;
            }
        }

        TravelMatrix {
            times,
            num_locations,
        }
    }

    #[inline(always)]
    fn index(&self, from: LocationIdx, to: LocationIdx) -> usize {
        from.get() * self.num_locations + to.get()
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> SignedDuration {
        self.times[self.index(from, to)]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_matrix_from_haversine() {
        let locations = [
            test_utils::create_location("a", 0.0, 0.0, (0, 3_600), 0),
            test_utils::create_location("b", 0.0, 0.1, (0, 3_600), 1),
            test_utils::create_location("c", 0.1, 0.1, (0, 3_600), 1),
        ];
        let refs = locations.iter().collect::<Vec<_>>();
        let speed = Kmh::new(30.0);
        let matrix = TravelMatrix::from_haversine(&refs, speed);

        assert_eq!(matrix.num_locations(), 3);

        let a = LocationIdx::new(0);
        let b = LocationIdx::new(1);
        let c = LocationIdx::new(2);

        assert_eq!(matrix.travel_time(a, a), SignedDuration::ZERO);
        assert_eq!(matrix.travel_time(a, c), matrix.travel_time(c, a));
        assert_eq!(
            matrix.travel_time(b, c),
            locations[1].haversine_distance(&locations[2]) / speed
        );
        assert!(matrix.travel_time(a, c) > matrix.travel_time(a, b));
    }
}
