//! Cancellable one-shot and repeating tasks for a single-threaded loop.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

pub trait Scheduler {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle;
    /// First run after `period`, then every `period` until cancelled.
    fn schedule_repeating(&self, period: Duration, task: Box<dyn FnMut()>) -> TaskHandle;
    /// Cancelling an unknown or finished task is a no-op.
    fn cancel(&self, handle: TaskHandle);
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Repeating {
        period: Duration,
        task: Box<dyn FnMut()>,
    },
}

struct Entry {
    due: Duration,
    job: Job,
}

/// Virtual clock: nothing runs until [`ManualScheduler::advance`] moves time
/// forward. Tasks fire in due order, ties in scheduling order.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_handle: Cell<u64>,
    entries: RefCell<BTreeMap<TaskHandle, Entry>>,
    running: Cell<Option<TaskHandle>>,
    running_cancelled: Cell<bool>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Runs every task due within the next `by`, including tasks scheduled
    /// by tasks that run along the way.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(handle) = self.next_due(target) {
            let Some(entry) = self.entries.borrow_mut().remove(&handle) else {
                continue;
            };
            self.now.set(entry.due);
            trace!(?handle, due = ?entry.due, "running scheduled task");
            match entry.job {
                Job::Once(task) => task(),
                Job::Repeating { period, mut task } => {
                    self.running.set(Some(handle));
                    self.running_cancelled.set(false);
                    task();
                    self.running.set(None);
                    if !self.running_cancelled.get() {
                        self.entries.borrow_mut().insert(
                            handle,
                            Entry {
                                due: entry.due + period,
                                job: Job::Repeating { period, task },
                            },
                        );
                    }
                }
            }
        }
        self.now.set(target);
    }

    fn next_due(&self, target: Duration) -> Option<TaskHandle> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.due <= target)
            .min_by_key(|(handle, entry)| (entry.due, **handle))
            .map(|(handle, _)| *handle)
    }

    fn insert(&self, delay: Duration, job: Job) -> TaskHandle {
        let handle = TaskHandle(self.next_handle.get() + 1);
        self.next_handle.set(handle.0);
        let due = self.now.get() + delay;
        self.entries.borrow_mut().insert(handle, Entry { due, job });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle {
        self.insert(delay, Job::Once(task))
    }

    fn schedule_repeating(&self, period: Duration, task: Box<dyn FnMut()>) -> TaskHandle {
        // a zero period would spin forever inside `advance`
        let period = period.max(Duration::from_millis(1));
        self.insert(period, Job::Repeating { period, task })
    }

    fn cancel(&self, handle: TaskHandle) {
        if self.entries.borrow_mut().remove(&handle).is_none() && self.running.get() == Some(handle) {
            self.running_cancelled.set(true);
        }
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(feature = "tokio")]
pub use tokio_scheduler::TokioScheduler;

#[cfg(feature = "tokio")]
mod tokio_scheduler {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    use tokio::task::{AbortHandle, spawn_local};
    use tokio::time::{Instant, interval_at, sleep};

    use super::{Scheduler, TaskHandle};

    /// Runs tasks on the current `tokio::task::LocalSet`.
    ///
    /// Must be used from inside a `LocalSet`; tasks are aborted on cancel
    /// and when the scheduler is dropped.
    #[derive(Debug, Default)]
    pub struct TokioScheduler {
        next_handle: Cell<u64>,
        tasks: Rc<RefCell<HashMap<TaskHandle, AbortHandle>>>,
    }

    impl TokioScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        fn next(&self) -> TaskHandle {
            let handle = TaskHandle(self.next_handle.get() + 1);
            self.next_handle.set(handle.0);
            handle
        }
    }

    impl Scheduler for TokioScheduler {
        fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle {
            let handle = self.next();
            let tasks = Rc::clone(&self.tasks);
            let join = spawn_local(async move {
                sleep(delay).await;
                tasks.borrow_mut().remove(&handle);
                task();
            });
            self.tasks.borrow_mut().insert(handle, join.abort_handle());
            handle
        }

        fn schedule_repeating(&self, period: Duration, mut task: Box<dyn FnMut()>) -> TaskHandle {
            let handle = self.next();
            let period = period.max(Duration::from_millis(1));
            let join = spawn_local(async move {
                let mut ticks = interval_at(Instant::now() + period, period);
                loop {
                    ticks.tick().await;
                    task();
                }
            });
            self.tasks.borrow_mut().insert(handle, join.abort_handle());
            handle
        }

        fn cancel(&self, handle: TaskHandle) {
            let aborted = self.tasks.borrow_mut().remove(&handle);
            if let Some(abort) = aborted {
                abort.abort();
            }
        }
    }

    impl Drop for TokioScheduler {
        fn drop(&mut self) {
            for (_, abort) in self.tasks.borrow_mut().drain() {
                abort.abort();
            }
        }
    }
}
