use crate::models::{fresh_id, Task};

const DAY_MS: i64 = 86_400_000;

/// Builds the next instance of a recurring task that was just completed.
///
/// The clone is a full copy with a fresh id and `completed = false`; its due
/// date advances by the fixed interval when the source had one, otherwise it
/// stays absent. `created_at` carries over from the source. Returns `None` for
/// non-recurring tasks.
pub fn spawn_next(completed: &Task) -> Option<Task> {
    let days = completed.recurring.interval_days()?;
    let mut next = completed.clone();
    next.id = fresh_id();
    next.completed = false;
    next.due_at = completed.due_at.map(|due| due + days * DAY_MS);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recurring, Subtask, TaskExtras};

    fn recurring_task(recurring: Recurring, due_at: Option<i64>) -> Task {
        Task::new(
            "stand-up".into(),
            5_000,
            TaskExtras {
                recurring,
                due_at,
                ..TaskExtras::default()
            },
        )
    }

    #[test]
    fn non_recurring_task_spawns_nothing() {
        let task = recurring_task(Recurring::None, Some(1_000));
        assert!(spawn_next(&task).is_none());
    }

    #[test]
    fn daily_spawn_advances_due_by_one_day() {
        let mut task = recurring_task(Recurring::Daily, Some(1_000));
        task.completed = true;
        let next = spawn_next(&task).expect("daily task spawns");
        assert_eq!(next.due_at, Some(1_000 + DAY_MS));
        assert!(!next.completed);
        assert_ne!(next.id, task.id);
        // The clone keeps the source's creation time.
        assert_eq!(next.created_at, task.created_at);
    }

    #[test]
    fn weekly_and_monthly_use_fixed_day_counts() {
        let weekly = recurring_task(Recurring::Weekly, Some(0));
        assert_eq!(spawn_next(&weekly).unwrap().due_at, Some(7 * DAY_MS));
        let monthly = recurring_task(Recurring::Monthly, Some(0));
        assert_eq!(spawn_next(&monthly).unwrap().due_at, Some(30 * DAY_MS));
    }

    #[test]
    fn spawn_without_due_date_stays_without_one() {
        let task = recurring_task(Recurring::Weekly, None);
        let next = spawn_next(&task).expect("weekly task spawns");
        assert_eq!(next.due_at, None);
    }

    #[test]
    fn spawn_copies_subtasks_as_is() {
        let mut task = recurring_task(Recurring::Daily, None);
        task.subtasks.push(Subtask {
            id: "s1".into(),
            text: "warm up".into(),
            completed: true,
        });
        let next = spawn_next(&task).expect("daily task spawns");
        assert_eq!(next.subtasks, task.subtasks);
    }
}
