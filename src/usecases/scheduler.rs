//! Named periodic tasks for the polling loops.
//!
//! Each loop is registered under `(LoopName, chat_id)`; enabling or disabling a
//! loop is a single registration call. Time is passed in by the caller, so the
//! scheduler itself never sleeps.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoopName {
    ForegroundSync,
    BackgroundSync,
    Heartbeat,
    PresencePoll,
}

impl LoopName {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::ForegroundSync => "foreground_sync",
            Self::BackgroundSync => "background_sync",
            Self::Heartbeat => "heartbeat",
            Self::PresencePoll => "presence_poll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey {
    pub loop_name: LoopName,
    pub chat_id: i64,
}

impl TaskKey {
    pub fn new(loop_name: LoopName, chat_id: i64) -> Self {
        Self { loop_name, chat_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PeriodicTask {
    period: Duration,
    next_due: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: BTreeMap<TaskKey, PeriodicTask>,
}

impl Scheduler {
    /// Registers a task whose first firing is one period after `now`.
    ///
    /// Returns false when the key was already registered; the existing deadline
    /// is kept.
    pub fn register(&mut self, key: TaskKey, period: Duration, now: Instant) -> bool {
        if self.is_registered(key) {
            return false;
        }

        let period = period.max(Duration::from_millis(1));
        self.tasks.insert(
            key,
            PeriodicTask {
                period,
                next_due: now + period,
            },
        );
        tracing::debug!(
            loop_name = key.loop_name.as_label(),
            chat_id = key.chat_id,
            period_ms = period.as_millis() as u64,
            "periodic task registered"
        );
        true
    }

    pub fn deregister(&mut self, key: TaskKey) -> bool {
        let removed = self.tasks.remove(&key).is_some();
        if removed {
            tracing::debug!(
                loop_name = key.loop_name.as_label(),
                chat_id = key.chat_id,
                "periodic task deregistered"
            );
        }
        removed
    }

    /// Removes every task matching `predicate`, returning how many were removed.
    pub fn deregister_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&TaskKey) -> bool,
    {
        let before = self.tasks.len();
        self.tasks.retain(|key, _| !predicate(key));
        before - self.tasks.len()
    }

    pub fn is_registered(&self, key: TaskKey) -> bool {
        self.tasks.contains_key(&key)
    }

    /// Tasks whose deadline has passed, in key order.
    ///
    /// Deadlines advance by whole periods past `now`, so a task that missed several
    /// periods fires once.
    pub fn due(&mut self, now: Instant) -> Vec<TaskKey> {
        let mut due = Vec::new();

        for (key, task) in self.tasks.iter_mut() {
            if task.next_due > now {
                continue;
            }

            let overdue = now.duration_since(task.next_due);
            task.next_due = u32::try_from(overdue.as_nanos() / task.period.as_nanos())
                .ok()
                .and_then(|skipped| skipped.checked_add(1))
                .and_then(|periods| task.period.checked_mul(periods))
                .and_then(|step| task.next_due.checked_add(step))
                .unwrap_or(now + task.period);
            due.push(*key);
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn task_fires_after_each_period() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let key = TaskKey::new(LoopName::ForegroundSync, 1);
        scheduler.register(key, secs(5), start);

        assert!(scheduler.due(start + secs(4)).is_empty());
        assert_eq!(scheduler.due(start + secs(5)), vec![key]);
        assert!(scheduler.due(start + secs(9)).is_empty());
        assert_eq!(scheduler.due(start + secs(10)), vec![key]);
    }

    #[test]
    fn missed_periods_collapse_into_one_firing() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let key = TaskKey::new(LoopName::BackgroundSync, 1);
        scheduler.register(key, secs(10), start);

        assert_eq!(scheduler.due(start + secs(35)), vec![key]);
        assert!(scheduler.due(start + secs(39)).is_empty());
        assert_eq!(scheduler.due(start + secs(40)), vec![key]);
    }

    #[test]
    fn very_long_gap_restarts_from_now() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let key = TaskKey::new(LoopName::Heartbeat, 1);
        scheduler.register(key, Duration::from_millis(1), start);
        let resumed = start + secs(60 * 24 * 60 * 60);

        assert_eq!(scheduler.due(resumed), vec![key]);
        assert!(scheduler.due(resumed).is_empty());
        assert_eq!(scheduler.due(resumed + Duration::from_millis(1)), vec![key]);
    }

    #[test]
    fn reregistering_keeps_existing_deadline() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let key = TaskKey::new(LoopName::Heartbeat, 7);

        assert!(scheduler.register(key, secs(30), start));
        assert!(!scheduler.register(key, secs(30), start + secs(20)));

        assert_eq!(scheduler.due(start + secs(30)), vec![key]);
    }

    #[test]
    fn deregistered_task_never_fires() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let key = TaskKey::new(LoopName::PresencePoll, 2);
        scheduler.register(key, secs(30), start);

        assert!(scheduler.deregister(key));

        assert!(scheduler.due(start + secs(60)).is_empty());
        assert!(!scheduler.deregister(key));
    }

    #[test]
    fn deregister_where_removes_matching_session_only() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        scheduler.register(TaskKey::new(LoopName::ForegroundSync, 1), secs(5), start);
        scheduler.register(TaskKey::new(LoopName::BackgroundSync, 1), secs(10), start);
        scheduler.register(TaskKey::new(LoopName::BackgroundSync, 2), secs(10), start);

        let removed = scheduler.deregister_where(|key| key.chat_id == 1);

        assert_eq!(removed, 2);
        assert!(scheduler.is_registered(TaskKey::new(LoopName::BackgroundSync, 2)));
    }

    #[test]
    fn due_tasks_come_back_in_key_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::default();
        let background = TaskKey::new(LoopName::BackgroundSync, 1);
        let foreground = TaskKey::new(LoopName::ForegroundSync, 1);
        scheduler.register(background, secs(10), start);
        scheduler.register(foreground, secs(5), start);

        assert_eq!(
            scheduler.due(start + secs(10)),
            vec![foreground, background]
        );
    }
}
