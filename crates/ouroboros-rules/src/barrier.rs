//! Completion barrier
//!
//! Fan-in point for one validation run. Every scheduled evaluation owns a
//! [`Slot`] (field group, rule index); completions may arrive in any order
//! and are stored by slot, so results come out in declaration order no
//! matter which evaluation finished first. The barrier finishes exactly once,
//! on the completion that brings the completed count up to the total.

use thiserror::Error;

/// Position of one evaluation: field group and rule index within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub group: usize,
    pub index: usize,
}

impl Slot {
    pub fn new(group: usize, index: usize) -> Self {
        Self { group, index }
    }
}

/// Result of reporting one completion
#[derive(Debug, PartialEq, Eq)]
pub enum Completion<T> {
    /// Other evaluations are still outstanding
    Pending { completed: usize, total: usize },
    /// Last completion: failures per group, in declaration order
    Finished(Vec<Vec<T>>),
}

/// Completions the barrier refuses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarrierError {
    #[error("No evaluation scheduled at {0:?}")]
    UnknownSlot(Slot),

    #[error("Evaluation at {0:?} already reported")]
    AlreadyCompleted(Slot),

    #[error("Barrier already finished")]
    Finished,
}

/// Counting fan-in over a fixed set of slots
///
/// `T` is the failure payload (an error message in the engine); passing
/// evaluations report `None`.
#[derive(Debug)]
pub struct CompletionBarrier<T> {
    // None: outstanding, Some(None): passed, Some(Some(_)): failed
    slots: Vec<Vec<Option<Option<T>>>>,
    completed: usize,
    total: usize,
    finished: bool,
}

impl<T> CompletionBarrier<T> {
    /// Create a barrier with one group per size
    pub fn new(group_sizes: impl IntoIterator<Item = usize>) -> Self {
        let slots: Vec<Vec<Option<Option<T>>>> = group_sizes
            .into_iter()
            .map(|size| std::iter::repeat_with(|| None).take(size).collect())
            .collect();
        let total = slots.iter().map(Vec::len).sum();

        Self {
            slots,
            completed: 0,
            total,
            finished: false,
        }
    }

    /// Number of scheduled evaluations
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of reported evaluations
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Whether the final completion has been reported
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Report the completion of one evaluation
    pub fn complete(&mut self, slot: Slot, failure: Option<T>) -> Result<Completion<T>, BarrierError> {
        if self.finished {
            return Err(BarrierError::Finished);
        }

        let cell = self
            .slots
            .get_mut(slot.group)
            .and_then(|group| group.get_mut(slot.index))
            .ok_or(BarrierError::UnknownSlot(slot))?;

        if cell.is_some() {
            return Err(BarrierError::AlreadyCompleted(slot));
        }
        *cell = Some(failure);
        self.completed += 1;

        if self.completed < self.total {
            return Ok(Completion::Pending {
                completed: self.completed,
                total: self.total,
            });
        }

        Ok(Completion::Finished(self.take_failures()))
    }

    /// Finish early, returning the failures reported so far
    pub fn take_failures(&mut self) -> Vec<Vec<T>> {
        self.finished = true;
        std::mem::take(&mut self.slots)
            .into_iter()
            .map(|group| group.into_iter().flatten().flatten().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_completion_keeps_declaration_order() {
        let mut barrier = CompletionBarrier::new([3, 1]);
        assert_eq!(barrier.total(), 4);

        assert_eq!(
            barrier.complete(Slot::new(0, 2), Some("third")),
            Ok(Completion::Pending {
                completed: 1,
                total: 4
            })
        );
        assert!(barrier.complete(Slot::new(1, 0), None).is_ok());
        assert!(barrier.complete(Slot::new(0, 0), Some("first")).is_ok());

        let result = barrier.complete(Slot::new(0, 1), None).unwrap();
        assert_eq!(
            result,
            Completion::Finished(vec![vec!["first", "third"], vec![]])
        );
        assert!(barrier.is_finished());
    }

    #[test]
    fn test_finishes_exactly_once() {
        let mut barrier = CompletionBarrier::new([1]);
        assert!(matches!(
            barrier.complete(Slot::new(0, 0), Some(1)),
            Ok(Completion::Finished(_))
        ));
        assert_eq!(
            barrier.complete(Slot::new(0, 0), Some(1)),
            Err(BarrierError::Finished)
        );
    }

    #[test]
    fn test_take_failures_finishes_early() {
        let mut barrier = CompletionBarrier::new([2, 2]);
        barrier.complete(Slot::new(1, 1), Some('b')).unwrap();
        assert_eq!(barrier.take_failures(), vec![vec![], vec!['b']]);
        assert_eq!(
            barrier.complete(Slot::new(0, 0), None),
            Err(BarrierError::Finished)
        );
    }

    #[test]
    fn test_duplicate_and_unknown_slots() {
        let mut barrier: CompletionBarrier<()> = CompletionBarrier::new([2]);
        assert!(barrier.complete(Slot::new(0, 0), None).is_ok());
        assert_eq!(
            barrier.complete(Slot::new(0, 0), None),
            Err(BarrierError::AlreadyCompleted(Slot::new(0, 0)))
        );
        assert_eq!(
            barrier.complete(Slot::new(3, 0), None),
            Err(BarrierError::UnknownSlot(Slot::new(3, 0)))
        );
        assert_eq!(barrier.completed(), 1);
        assert!(!barrier.is_finished());
    }
}
