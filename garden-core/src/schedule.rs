//! Delayed-effect queue.
//!
//! Transitions return `(delay, effect)` pairs; the orchestrator converts
//! them to absolute due times and parks them here. The queue is a min-heap
//! keyed on `(due, sequence)`, so effects due at the same instant fire in
//! the order they were scheduled.
//!
//! Scenario-bound effects carry the scenario epoch that was current when
//! they were queued. The orchestrator drops them on delivery if the epoch
//! has moved on.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::scenario::Effect;
use crate::types::SimTime;

/// An effect waiting for its due time.
#[derive(Debug, Clone)]
pub struct QueuedEffect {
    /// When to apply it.
    pub due: SimTime,
    /// Tie-breaker; lower fires first.
    pub sequence: u64,
    /// Scenario epoch the effect belongs to, if it is scenario-bound.
    pub epoch: Option<u64>,
    /// What to do.
    pub effect: Effect,
}

// Reversed so the max-heap yields the smallest (due, sequence) first.
impl PartialEq for QueuedEffect {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl Eq for QueuedEffect {}

impl PartialOrd for QueuedEffect {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEffect {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Pending delayed effects.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    heap: BinaryHeap<QueuedEffect>,
    next_sequence: u64,
}

impl EffectQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to fire at `due`.
    pub fn schedule(&mut self, due: SimTime, epoch: Option<u64>, effect: Effect) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedEffect {
            due,
            sequence,
            epoch,
            effect,
        });
    }

    /// Due time of the next effect.
    #[must_use]
    pub fn peek_due(&self) -> Option<SimTime> {
        self.heap.peek().map(|e| e.due)
    }

    /// Pop the next effect if it is due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<QueuedEffect> {
        if self.heap.peek().is_some_and(|e| e.due <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Drop everything that is pending.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Number of pending effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    #[test]
    fn pops_in_due_then_sequence_order() {
        let mut queue = EffectQueue::new();
        queue.schedule(at(2.0), None, Effect::EndScenario);
        queue.schedule(at(1.0), None, Effect::Despawn);
        queue.schedule(at(1.0), Some(3), Effect::SetWind(0.5));

        let first = queue.pop_due(at(5.0)).expect("first");
        assert_eq!(first.effect, Effect::Despawn);
        let second = queue.pop_due(at(5.0)).expect("second");
        assert_eq!(second.effect, Effect::SetWind(0.5));
        assert_eq!(second.epoch, Some(3));
        let third = queue.pop_due(at(5.0)).expect("third");
        assert_eq!(third.effect, Effect::EndScenario);
        assert!(queue.pop_due(at(5.0)).is_none());
    }

    #[test]
    fn respects_due_time() {
        let mut queue = EffectQueue::new();
        queue.schedule(at(1.0), None, Effect::Despawn);
        assert!(queue.pop_due(at(0.999)).is_none());
        assert_eq!(queue.peek_due(), Some(at(1.0)));
        assert!(queue.pop_due(at(1.0)).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = EffectQueue::new();
        for i in 0..5 {
            queue.schedule(at(f64::from(i)), None, Effect::Despawn);
        }
        assert_eq!(queue.len(), 5);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_due(at(100.0)).is_none());
    }
}
