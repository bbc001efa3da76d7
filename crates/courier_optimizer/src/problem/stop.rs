use jiff::SignedDuration;
use tracing::warn;

use crate::problem::{error::InputError, location::Location, time_window::TimeWindow};

const REF_DELIMITER: char = ';';
const REF_CAPACITY_DELIMITER: char = ',';

/// One order merged into a composite stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRef {
    id: String,
    demand: u32,
}

impl SubRef {
    pub fn new(id: impl Into<String>, demand: u32) -> Self {
        SubRef {
            id: id.into(),
            demand,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }
}

/// A candidate stop, classified once when the input is ingested.
#[derive(Debug, Clone, PartialEq)]
pub enum Stop {
    Simple(Location),
    /// Several orders delivered at the same address in a single visit.
    Composite {
        parent: Location,
        parts: Vec<SubRef>,
    },
}

impl Stop {
    /// Classifies a location by its reference: `refA,2;refB,1` becomes a composite stop
    /// whose routing demand is the sum of its parts.
    pub fn from_location(mut location: Location) -> Result<Self, InputError> {
        let parts = match location.reference() {
            Some(reference) => parse_composite_ref(reference)?,
            None => None,
        };

        let Some(parts) = parts else {
            return Ok(Stop::Simple(location));
        };

        let demand: u32 = parts.iter().map(SubRef::demand).sum();
        if demand != location.demand() {
            warn!(
                address = location.address(),
                declared = location.demand(),
                demand,
                "Composite stop capacity differs from the sum of its orders"
            );
            location.set_demand(demand);
        }

        Ok(Stop::Composite {
            parent: location,
            parts,
        })
    }

    pub fn location(&self) -> &Location {
        match self {
            Stop::Simple(location) => location,
            Stop::Composite { parent, .. } => parent,
        }
    }

    pub fn demand(&self) -> u32 {
        self.location().demand()
    }

    /// Turns the stop into the plain deliveries of route visit number `visit`.
    pub fn expand(&self, visit: usize) -> Vec<Delivery> {
        match self {
            Stop::Simple(location) => vec![Delivery::new(
                location,
                location.reference().map(str::to_owned),
                location.demand(),
                visit,
            )],
            Stop::Composite { parent, parts } => parts
                .iter()
                .map(|part| Delivery::new(parent, Some(part.id.clone()), part.demand, visit))
                .collect(),
        }
    }
}

/// Returns `None` for a plain reference, the parsed orders for a delimited one.
pub fn parse_composite_ref(reference: &str) -> Result<Option<Vec<SubRef>>, InputError> {
    if !reference.contains(REF_DELIMITER) {
        return Ok(None);
    }

    let malformed = |reason: &str| InputError::MalformedRef {
        reference: reference.to_owned(),
        reason: reason.to_owned(),
    };

    let parts = reference
        .split(REF_DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (id, demand) = part
                .split_once(REF_CAPACITY_DELIMITER)
                .ok_or_else(|| malformed(&format!("`{part}` is not a `ref,capacity` pair")))?;

            let id = id.trim();
            if id.is_empty() {
                return Err(malformed(&format!("`{part}` has an empty id")));
            }

            let demand = demand
                .trim()
                .parse::<u32>()
                .map_err(|_| malformed(&format!("`{part}` has an invalid capacity")))?;

            Ok(SubRef::new(id, demand))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if parts.is_empty() {
        return Err(malformed("no orders"));
    }

    Ok(Some(parts))
}

/// A single order as it appears in a finished route.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    reference: Option<String>,
    address: String,
    point: geo::Point,
    delivery_window: TimeWindow,
    demand: u32,
    order_time: SignedDuration,
    visit: usize,
}

impl Delivery {
    fn new(location: &Location, reference: Option<String>, demand: u32, visit: usize) -> Self {
        Delivery {
            reference,
            address: location.address().to_owned(),
            point: location.point(),
            delivery_window: *location.delivery_window(),
            demand,
            order_time: location.order_time(),
            visit,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn delivery_window(&self) -> &TimeWindow {
        &self.delivery_window
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    pub fn order_time(&self) -> SignedDuration {
        self.order_time
    }

    /// Position of the visit this delivery belongs to. Deliveries expanded from one
    /// composite stop share it.
    pub fn visit(&self) -> usize {
        self.visit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_plain_reference_is_simple() {
        let location = test_utils::create_location("A-17", 52.53, 13.40, (0, 7_200), 2);
        let stop = Stop::from_location(location).unwrap();

        assert!(matches!(stop, Stop::Simple(_)));
        assert_eq!(stop.demand(), 2);
        assert_eq!(stop.expand(0).len(), 1);
    }

    #[test]
    fn test_parse_composite_ref() {
        assert_eq!(parse_composite_ref("A-1").unwrap(), None);
        assert_eq!(
            parse_composite_ref("A-1,2;A-2,3;").unwrap(),
            Some(vec![SubRef::new("A-1", 2), SubRef::new("A-2", 3)])
        );
        assert!(matches!(
            parse_composite_ref("A-1,2;A-2"),
            Err(InputError::MalformedRef { .. })
        ));
        assert!(matches!(
            parse_composite_ref("A-1,x;A-2,1"),
            Err(InputError::MalformedRef { .. })
        ));
        assert!(matches!(
            parse_composite_ref(";;"),
            Err(InputError::MalformedRef { .. })
        ));
    }

    #[test]
    fn test_composite_demand_is_sum_of_parts() {
        let location = test_utils::create_location("B-1,1;B-2,3", 52.53, 13.40, (0, 7_200), 5);
        let stop = Stop::from_location(location).unwrap();

        assert!(matches!(&stop, Stop::Composite { parts, .. } if parts.len() == 2));
        assert_eq!(stop.demand(), 4);
    }

    #[test]
    fn test_expand_composite() {
        let location = test_utils::create_location("B-1,1;B-2,3", 52.53, 13.40, (0, 7_200), 4);
        let stop = Stop::from_location(location).unwrap();

        let deliveries = stop.expand(3);

        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].reference(), Some("B-1"));
        assert_eq!(deliveries[0].demand(), 1);
        assert_eq!(deliveries[1].reference(), Some("B-2"));
        assert_eq!(deliveries[1].demand(), 3);

        for delivery in &deliveries {
            assert_eq!(delivery.address(), stop.location().address());
            assert_eq!(delivery.point(), stop.location().point());
            assert_eq!(delivery.delivery_window(), stop.location().delivery_window());
            assert_eq!(delivery.visit(), 3);
        }
    }
}
