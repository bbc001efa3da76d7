use fxhash::FxHashSet;

use crate::{define_index_newtype, problem::stop::Stop};

define_index_newtype!(StopIdx, Stop);

/// Stops of a bucket. A stop is consumed at most once and never handed out again.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    stops: Vec<Stop>,
    consumed: FxHashSet<StopIdx>,
}

impl CandidatePool {
    pub fn new(stops: Vec<Stop>) -> Self {
        CandidatePool {
            stops,
            consumed: FxHashSet::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx]
    }

    pub fn remaining(&self) -> impl Iterator<Item = (StopIdx, &Stop)> {
        self.stops
            .iter()
            .enumerate()
            .map(|(index, stop)| (StopIdx::new(index), stop))
            .filter(|(idx, _)| !self.consumed.contains(idx))
    }

    pub fn remaining_count(&self) -> usize {
        self.stops.len() - self.consumed.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_count() == 0
    }

    /// Returns `false` when the stop was already consumed.
    pub fn consume(&mut self, idx: StopIdx) -> bool {
        debug_assert!(idx.get() < self.stops.len());
        self.consumed.insert(idx)
    }

    pub fn into_remaining(self) -> Vec<Stop> {
        let consumed = self.consumed;

        self.stops
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !consumed.contains(&StopIdx::new(*index)))
            .map(|(_, stop)| stop)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn pool() -> CandidatePool {
        CandidatePool::new(
            ["a", "b", "c"]
                .into_iter()
                .map(|reference| {
                    Stop::from_location(test_utils::create_location(
                        reference,
                        52.53,
                        13.41,
                        (28_800, 72_000),
                        1,
                    ))
                    .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_consume_once() {
        let mut pool = pool();

        assert!(pool.consume(StopIdx::new(1)));
        assert!(!pool.consume(StopIdx::new(1)));
        assert_eq!(pool.remaining_count(), 2);
        assert_eq!(
            pool.remaining().map(|(idx, _)| idx).collect::<Vec<_>>(),
            vec![StopIdx::new(0), StopIdx::new(2)]
        );
    }

    #[test]
    fn test_exhaustion() {
        let mut pool = pool();
        for index in 0..3 {
            pool.consume(StopIdx::new(index));
        }

        assert!(pool.is_exhausted());
        assert!(pool.remaining().next().is_none());
        assert!(pool.into_remaining().is_empty());
    }

    #[test]
    fn test_into_remaining_keeps_order() {
        let mut pool = pool();
        pool.consume(StopIdx::new(0));

        let remaining = pool.into_remaining();

        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].location().reference(), Some("b"));
        assert_eq!(remaining[1].location().reference(), Some("c"));
    }
}
