//! Shared state for one consumer instance
//!
//! One bundle is constructed per consumer and passed by `Arc` into every
//! discovery and poller task - no module-level singletons. The retry budget
//! and success counter are process-wide by design, not per-table: any shard's
//! second consecutive successful continuation re-arms discovery retries for
//! every table.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tabletail_client::ShardId;

/// Bounded counter of discovery/iterator retries remaining across the run
///
/// Monotonically non-increasing except through [`RetryBudget::reset`].
#[derive(Debug)]
pub struct RetryBudget {
    remaining: AtomicU32,
    initial: u32,
}

impl RetryBudget {
    pub fn new(initial: u32) -> Self {
        Self {
            remaining: AtomicU32::new(initial),
            initial,
        }
    }

    /// Retries remaining
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Relaxed)
    }

    /// Consume one retry, saturating at zero
    pub fn consume(&self) {
        let _ = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                n.checked_sub(1)
            });
    }

    /// Restore the budget to its initial value
    pub fn reset(&self) {
        self.remaining.store(self.initial, Ordering::Relaxed);
    }
}

/// Counter of consecutive successful shard continuations across all shards
///
/// Gates a one-time informational transition only; not a correctness
/// invariant.
#[derive(Debug, Default)]
pub struct SuccessCounter {
    count: AtomicU32,
}

impl SuccessCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one success and return the new total
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Shared state bundle for a consumer instance
#[derive(Debug)]
pub struct ConsumerState {
    /// Shared retry budget for discovery and iterator failures
    pub budget: RetryBudget,
    /// Consecutive continuation successes across all shards
    pub successes: SuccessCounter,
    /// Shard ids that have been handed to a poller; append-only
    seen_shards: Mutex<HashSet<ShardId>>,
}

impl ConsumerState {
    pub fn new(retry_limit: u32) -> Self {
        Self {
            budget: RetryBudget::new(retry_limit),
            successes: SuccessCounter::new(),
            seen_shards: Mutex::new(HashSet::new()),
        }
    }

    /// Claim a shard for a new poller
    ///
    /// Check and insert happen under one lock so no two pollers can ever be
    /// started for the same shard. Returns false if the shard was already
    /// claimed.
    pub fn claim_shard(&self, shard: &ShardId) -> bool {
        let mut seen = self.seen_shards.lock().expect("seen-shard lock poisoned");
        seen.insert(shard.clone())
    }

    /// Number of shards ever handed to a poller
    pub fn seen_shard_count(&self) -> usize {
        self.seen_shards.lock().expect("seen-shard lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_consume_and_remaining() {
        let budget = RetryBudget::new(3);
        assert_eq!(budget.remaining(), 3);
        budget.consume();
        budget.consume();
        assert_eq!(budget.remaining(), 1);
    }

    #[test]
    fn test_budget_saturates_at_zero() {
        let budget = RetryBudget::new(1);
        budget.consume();
        budget.consume();
        budget.consume();
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_reset_restores_initial() {
        let budget = RetryBudget::new(3);
        budget.consume();
        budget.consume();
        budget.consume();
        assert_eq!(budget.remaining(), 0);
        budget.reset();
        assert_eq!(budget.remaining(), 3);
    }

    #[test]
    fn test_success_counter_increments() {
        let counter = SuccessCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_claim_shard_once() {
        let state = ConsumerState::new(3);
        let shard = ShardId::new("shard-1");
        assert!(state.claim_shard(&shard));
        assert!(!state.claim_shard(&shard));
        assert_eq!(state.seen_shard_count(), 1);
    }

    #[test]
    fn test_claim_distinct_shards() {
        let state = ConsumerState::new(3);
        assert!(state.claim_shard(&ShardId::new("shard-1")));
        assert!(state.claim_shard(&ShardId::new("shard-2")));
        assert_eq!(state.seen_shard_count(), 2);
    }
}
