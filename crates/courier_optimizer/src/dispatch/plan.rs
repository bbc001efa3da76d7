use crate::{
    dispatch::route::{InhouseRoute, Route},
    grouping::{bucket::BucketKey, locations::UnmatchedEntry},
    problem::stop::Stop,
};

/// A stop neither pass could route.
#[derive(Debug, Clone, PartialEq)]
pub struct UnservedStop {
    key: BucketKey,
    stop: Stop,
}

impl UnservedStop {
    pub fn new(key: BucketKey, stop: Stop) -> Self {
        UnservedStop { key, stop }
    }

    pub fn key(&self) -> &BucketKey {
        &self.key
    }

    pub fn stop(&self) -> &Stop {
        &self.stop
    }
}

/// Outcome of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchPlan {
    inhouse: Vec<InhouseRoute>,
    public: Vec<Route>,
    unserved: Vec<UnservedStop>,
    unmatched: Vec<UnmatchedEntry>,
}

impl DispatchPlan {
    pub fn new(
        inhouse: Vec<InhouseRoute>,
        public: Vec<Route>,
        unserved: Vec<UnservedStop>,
        unmatched: Vec<UnmatchedEntry>,
    ) -> Self {
        DispatchPlan {
            inhouse,
            public,
            unserved,
            unmatched,
        }
    }

    pub fn inhouse(&self) -> &[InhouseRoute] {
        &self.inhouse
    }

    pub fn public(&self) -> &[Route] {
        &self.public
    }

    pub fn unserved(&self) -> &[UnservedStop] {
        &self.unserved
    }

    pub fn unmatched(&self) -> &[UnmatchedEntry] {
        &self.unmatched
    }

    /// Orders delivered by a route of either kind.
    pub fn num_routed_orders(&self) -> usize {
        self.inhouse
            .iter()
            .map(InhouseRoute::route)
            .chain(&self.public)
            .map(|route| route.deliveries().len())
            .sum()
    }
}
