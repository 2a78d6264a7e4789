//! # Fair candidate selection.
//!
//! Orders the consumers of a snapshot so the one that has received the
//! fewest messages is offered first. This approximates round-robin fairness
//! under variable consumer speed: a fast or greedy consumer cannot starve
//! the others because every acceptance pushes it back in the order.
//!
//! ## Rules
//! - Draining consumers are excluded entirely.
//! - Ascending by received count; ties break on consumer id so one dispatch
//!   pass is deterministic regardless of the registry map's iteration order.
//! - The result is a finite ordered sequence; the engine walks it
//!   front-to-back and stops at the first acceptance.

use super::consumer::ConsumerRef;

/// Produces the ordered candidate list for one dispatch pass.
///
/// Counters are read once per consumer at selection time; the sort key is
/// stable for the duration of the pass even if counters move concurrently.
pub fn select_candidates(snapshot: Vec<ConsumerRef>) -> Vec<ConsumerRef> {
    let mut keyed: Vec<(u64, ConsumerRef)> = snapshot
        .into_iter()
        .filter(|c| !c.is_draining())
        .map(|c| (c.received_count(), c))
        .collect();
    keyed.sort_by(|(count_a, a), (count_b, b)| {
        count_a.cmp(count_b).then_with(|| a.id().cmp(b.id()))
    });
    keyed.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::Consumer;
    use crate::message::Message;
    use std::sync::Arc;

    struct Fixed {
        id: &'static str,
        count: u64,
        draining: bool,
    }

    impl Consumer for Fixed {
        fn id(&self) -> &str {
            self.id
        }
        fn received_count(&self) -> u64 {
            self.count
        }
        fn is_draining(&self) -> bool {
            self.draining
        }
        fn try_deliver(&self, _message: &Message) -> bool {
            false
        }
    }

    fn fixed(id: &'static str, count: u64, draining: bool) -> ConsumerRef {
        Arc::new(Fixed {
            id,
            count,
            draining,
        })
    }

    fn ids(candidates: &[ConsumerRef]) -> Vec<&str> {
        candidates.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_lowest_count_is_first() {
        let snap = vec![fixed("a", 5, false), fixed("b", 1, false), fixed("c", 3, false)];
        assert_eq!(ids(&select_candidates(snap)), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_draining_excluded_even_with_lowest_count() {
        let snap = vec![fixed("a", 5, false), fixed("b", 0, true)];
        assert_eq!(ids(&select_candidates(snap)), vec!["a"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let snap = vec![fixed("z", 2, false), fixed("a", 2, false), fixed("m", 2, false)];
        assert_eq!(ids(&select_candidates(snap)), vec!["a", "m", "z"]);

        // Same input in another order yields the same candidate order.
        let snap = vec![fixed("m", 2, false), fixed("z", 2, false), fixed("a", 2, false)];
        assert_eq!(ids(&select_candidates(snap)), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_empty_and_all_draining() {
        assert!(select_candidates(Vec::new()).is_empty());
        let snap = vec![fixed("a", 0, true), fixed("b", 1, true)];
        assert!(select_candidates(snap).is_empty());
    }
}
