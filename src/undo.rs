use crate::models::{Task, Timestamp};

/// How long a destructive mutation stays reversible.
pub const UNDO_WINDOW_MS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    Delete(Task),
    BulkDelete(Vec<Task>),
}

/// Single-slot undo buffer. Expiry is deadline-based: the slot records when it
/// stops being reversible and every read checks the caller's clock, so a
/// pending expiry can never fire against state that has already moved on.
#[derive(Debug, Default)]
pub struct UndoSlot {
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    action: UndoAction,
    expires_at: Timestamp,
}

impl UndoSlot {
    /// Overwrites any pending action and restarts the expiry window.
    pub fn capture(&mut self, action: UndoAction, now: Timestamp) {
        self.pending = Some(Pending {
            action,
            expires_at: now + UNDO_WINDOW_MS,
        });
    }

    /// Takes the pending action if it is still inside its window. An absent or
    /// expired slot yields `None`; either way the slot ends up empty.
    pub fn take(&mut self, now: Timestamp) -> Option<UndoAction> {
        let pending = self.pending.take()?;
        if now > pending.expires_at {
            return None;
        }
        Some(pending.action)
    }

    /// Drops an expired action without reversing it. Called from the periodic
    /// refresh sweep.
    pub fn clear_expired(&mut self, now: Timestamp) {
        if let Some(pending) = &self.pending {
            if now > pending.expires_at {
                self.pending = None;
            }
        }
    }

    pub fn is_pending(&self, now: Timestamp) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| now <= pending.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskExtras};

    fn make_task(text: &str) -> Task {
        Task::new(text.into(), 1_000, TaskExtras::default())
    }

    #[test]
    fn take_within_window_returns_action_and_clears_slot() {
        let mut slot = UndoSlot::default();
        let task = make_task("a");
        slot.capture(UndoAction::Delete(task.clone()), 10_000);
        assert!(slot.is_pending(10_000 + UNDO_WINDOW_MS));
        assert_eq!(slot.take(12_000), Some(UndoAction::Delete(task)));
        assert!(slot.take(12_000).is_none());
    }

    #[test]
    fn take_after_window_is_a_no_op() {
        let mut slot = UndoSlot::default();
        slot.capture(UndoAction::Delete(make_task("a")), 10_000);
        assert!(slot.take(10_000 + UNDO_WINDOW_MS + 1).is_none());
        assert!(!slot.is_pending(10_000));
    }

    #[test]
    fn capture_overwrites_pending_action_and_restarts_window() {
        let mut slot = UndoSlot::default();
        slot.capture(UndoAction::Delete(make_task("first")), 10_000);
        let second = make_task("second");
        slot.capture(UndoAction::Delete(second.clone()), 14_000);
        // The first action is gone; the second is live past the first deadline.
        assert_eq!(slot.take(16_000), Some(UndoAction::Delete(second)));
    }

    #[test]
    fn clear_expired_only_drops_stale_actions() {
        let mut slot = UndoSlot::default();
        slot.capture(UndoAction::BulkDelete(vec![make_task("a")]), 10_000);
        slot.clear_expired(11_000);
        assert!(slot.is_pending(11_000));
        slot.clear_expired(10_000 + UNDO_WINDOW_MS + 1);
        assert!(!slot.is_pending(10_000));
    }
}
