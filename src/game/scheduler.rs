//! One-shot and repeating callbacks on a single cooperative event loop.
//!
//! Everything runs on the thread that owns the loop, so tasks are plain
//! `'static` closures without `Send`. The GTK front end implements this over
//! glib timeouts.

use std::ops::ControlFlow;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

pub trait Scheduler {
    /// Runs `task` once after `delay`.
    fn once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId;

    /// Runs `task` every `period` until it returns `ControlFlow::Break`
    /// or is cancelled.
    fn every(&self, period: Duration, task: Box<dyn FnMut() -> ControlFlow<()>>) -> TaskId;

    /// Drops a pending task. Unknown or already finished ids are ignored.
    fn cancel(&self, id: TaskId);
}

#[cfg(test)]
pub(crate) mod manual {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    use super::*;

    enum Task {
        Once(Box<dyn FnOnce()>),
        Every(Duration, Box<dyn FnMut() -> ControlFlow<()>>),
    }

    struct Entry {
        due: Duration,
        task: Task,
    }

    /// Scheduler driven by hand from tests through [`ManualScheduler::advance`].
    #[derive(Default)]
    pub(crate) struct ManualScheduler {
        now: Cell<Duration>,
        next_id: Cell<u64>,
        tasks: RefCell<BTreeMap<TaskId, Entry>>,
    }

    impl ManualScheduler {
        pub(crate) fn pending(&self) -> usize {
            self.tasks.borrow().len()
        }

        fn insert(&self, due: Duration, task: Task) -> TaskId {
            let id = TaskId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            self.tasks.borrow_mut().insert(id, Entry { due, task });
            id
        }

        fn pop_due(&self, until: Duration) -> Option<(TaskId, Entry)> {
            let mut tasks = self.tasks.borrow_mut();
            let id = tasks
                .iter()
                .filter(|(_, entry)| entry.due <= until)
                .min_by_key(|(id, entry)| (entry.due, **id))
                .map(|(id, _)| *id)?;
            tasks.remove(&id).map(|entry| (id, entry))
        }

        /// Moves the clock forward, running every task that falls due in order.
        pub(crate) fn advance(&self, by: Duration) {
            let until = self.now.get() + by;
            while let Some((id, entry)) = self.pop_due(until) {
                self.now.set(entry.due);
                match entry.task {
                    Task::Once(task) => task(),
                    Task::Every(period, mut task) => {
                        if task().is_continue() {
                            self.tasks.borrow_mut().insert(
                                id,
                                Entry {
                                    due: entry.due + period,
                                    task: Task::Every(period, task),
                                },
                            );
                        }
                    }
                }
            }
            self.now.set(until);
        }
    }

    impl Scheduler for ManualScheduler {
        fn once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
            self.insert(self.now.get() + delay, Task::Once(task))
        }

        fn every(&self, period: Duration, task: Box<dyn FnMut() -> ControlFlow<()>>) -> TaskId {
            self.insert(self.now.get() + period, Task::Every(period, task))
        }

        fn cancel(&self, id: TaskId) {
            self.tasks.borrow_mut().remove(&id);
        }
    }

    #[test]
    fn runs_tasks_in_due_order() {
        use std::rc::Rc;

        let scheduler = ManualScheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let ticks = Rc::new(Cell::new(0));

        let l = log.clone();
        scheduler.once(Duration::from_millis(1500), Box::new(move || l.borrow_mut().push("late")));
        let l = log.clone();
        scheduler.once(Duration::from_millis(500), Box::new(move || l.borrow_mut().push("early")));
        let t = ticks.clone();
        scheduler.every(
            Duration::from_secs(1),
            Box::new(move || {
                t.set(t.get() + 1);
                if t.get() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
            }),
        );

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(ticks.get(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelled_tasks_never_run() {
        use std::rc::Rc;

        let scheduler = ManualScheduler::default();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = scheduler.once(Duration::from_millis(10), Box::new(move || f.set(true)));
        scheduler.cancel(id);
        scheduler.cancel(id);
        scheduler.advance(Duration::from_secs(1));
        assert!(!fired.get());
    }
}
