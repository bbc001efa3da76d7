use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    dispatch::{plan::DispatchPlan, route::Route},
    grouping::locations::UnmatchedEntry,
    json::types::{JsonLocationRecord, WindowKey},
    problem::{stop::Delivery, time_window::TimeWindow},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "DispatchPlan")]
pub struct JsonDispatchPlan {
    pub inhouse: Vec<JsonInhouseRoute>,
    pub public: Vec<JsonRoute>,
    pub unserved: Vec<JsonUnservedStop>,
    pub unmatched: Vec<JsonUnmatchedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "InhouseRoute")]
pub struct JsonInhouseRoute {
    pub driver_id: String,
    #[serde(flatten)]
    pub route: JsonRoute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "Route")]
pub struct JsonRoute {
    pub pickup_address: String,
    pub pickup_window: TimeWindow,
    pub demand: u32,
    pub capacity: u32,
    /// km/h the route was planned with.
    pub speed: f64,
    pub stops: Vec<JsonStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "Stop")]
pub struct JsonStop {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub address: String,
    /// `[lat, lon]`
    pub coordinates: [f64; 2],
    pub demand: u32,
    pub delivery_window: TimeWindow,
    /// Start of service in seconds of the day. Missing when the route misses a window.
    pub eta: Option<i64>,
    /// Deliveries of the same visit share a value.
    pub visit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "UnservedStop")]
pub struct JsonUnservedStop {
    pub pickup_address: String,
    pub pickup_window: TimeWindow,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub address: String,
    pub coordinates: [f64; 2],
    pub demand: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "UnmatchedEntry")]
pub struct JsonUnmatchedEntry {
    pub pickup_address: String,
    pub pickup_window: WindowKey,
    pub records: Vec<JsonLocationRecord>,
    pub error: String,
}

impl JsonDispatchPlan {
    pub fn from_plan(plan: &DispatchPlan, service_time: SignedDuration) -> Self {
        JsonDispatchPlan {
            inhouse: plan
                .inhouse()
                .iter()
                .map(|route| JsonInhouseRoute {
                    driver_id: route.driver_id().to_owned(),
                    route: JsonRoute::from_route(route.route(), service_time),
                })
                .collect(),
            public: plan
                .public()
                .iter()
                .map(|route| JsonRoute::from_route(route, service_time))
                .collect(),
            unserved: plan
                .unserved()
                .iter()
                .map(|unserved| {
                    let location = unserved.stop().location();
                    JsonUnservedStop {
                        pickup_address: unserved.key().address().to_owned(),
                        pickup_window: *unserved.key().window(),
                        reference: location.reference().map(str::to_owned),
                        address: location.address().to_owned(),
                        coordinates: [location.lat(), location.lon()],
                        demand: location.demand(),
                    }
                })
                .collect(),
            unmatched: plan.unmatched().iter().map(JsonUnmatchedEntry::from).collect(),
        }
    }
}

impl JsonRoute {
    pub fn from_route(route: &Route, service_time: SignedDuration) -> Self {
        let etas = match route.schedule(service_time) {
            Ok(starts) => starts.into_iter().map(|start| Some(start.as_secs())).collect(),
            Err(late) => {
                warn!(pickup = %route.key(), %late, "Route misses a delivery window");
                vec![None; route.deliveries().len()]
            }
        };

        JsonRoute {
            pickup_address: route.key().address().to_owned(),
            pickup_window: *route.key().window(),
            demand: route.demand(),
            capacity: route.profile().capacity(),
            speed: route.profile().speed().value(),
            stops: route
                .deliveries()
                .iter()
                .zip(etas)
                .map(|(delivery, eta)| JsonStop::from_delivery(delivery, eta))
                .collect(),
        }
    }
}

impl JsonStop {
    fn from_delivery(delivery: &Delivery, eta: Option<i64>) -> Self {
        JsonStop {
            reference: delivery.reference().map(str::to_owned),
            address: delivery.address().to_owned(),
            coordinates: [delivery.lat(), delivery.lon()],
            demand: delivery.demand(),
            delivery_window: *delivery.delivery_window(),
            eta,
            visit: delivery.visit(),
        }
    }
}

impl From<&UnmatchedEntry> for JsonUnmatchedEntry {
    fn from(entry: &UnmatchedEntry) -> Self {
        JsonUnmatchedEntry {
            pickup_address: entry.address().to_owned(),
            pickup_window: *entry.window(),
            records: entry.records().to_vec(),
            error: entry.error().to_string(),
        }
    }
}
