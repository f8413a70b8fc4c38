use std::collections::VecDeque;
use std::future::Future;
use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};

/// Upper bound of the default worker count.
const MAX_DEFAULT_WORKERS: usize = 32;

/// A unit of work plus the payload used to correlate its result.
///
/// The job is not started until the runner schedules it.
pub struct Task<'a, T, E> {
    pub userdata: T,
    job: LocalBoxFuture<'a, Result<(), E>>,
}

impl<'a, T, E> Task<'a, T, E> {
    pub fn new(userdata: T, job: impl Future<Output = Result<(), E>> + 'a) -> Self {
        Self {
            userdata,
            job: Box::pin(job),
        }
    }
}

/// Every error captured during one [`TaskRun`].
#[derive(Debug, thiserror::Error)]
#[error("failed to run {} task(s)", errors.len())]
pub struct TaskErrors<E> {
    errors: Vec<E>,
}

impl<E> TaskErrors<E> {
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Default number of tasks in flight: available parallelism plus four,
/// capped at 32.
pub fn default_workers() -> usize {
    // arch-lint: allow(no-error-swallowing) reason="unknown parallelism falls back to a single core"
    let cores = available_parallelism().map_or(1, NonZeroUsize::get);
    (cores + 4).min(MAX_DEFAULT_WORKERS)
}

/// Runs tasks with at most `workers` of them in flight.
#[derive(Debug, Clone, Copy)]
pub struct TaskRunner {
    workers: usize,
}

impl TaskRunner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Schedule `tasks` in submission order.
    ///
    /// Nothing runs until the returned [`TaskRun`] is polled.
    pub fn run<'a, T, E>(
        &self,
        tasks: impl IntoIterator<Item = Task<'a, T, E>>,
        fast_fail: bool,
    ) -> TaskRun<'a, T, E> {
        let pending: VecDeque<_> = tasks.into_iter().collect();
        tracing::debug!(
            tasks = pending.len(),
            workers = self.workers,
            fast_fail,
            "scheduling tasks"
        );
        TaskRun {
            pending,
            running: FuturesUnordered::new(),
            workers: self.workers,
            fast_fail,
            stopped: false,
            errors: Vec::new(),
        }
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

/// Run `tasks` with the default worker count.
pub fn run_tasks<'a, T, E>(
    tasks: impl IntoIterator<Item = Task<'a, T, E>>,
    fast_fail: bool,
) -> TaskRun<'a, T, E> {
    TaskRunner::default().run(tasks, fast_fail)
}

type Running<'a, T, E> = LocalBoxFuture<'a, (T, Result<(), E>)>;

/// An in-progress set of tasks.
///
/// Pull results with [`next`](Self::next), then call
/// [`finish`](Self::finish) to wait for tasks still in flight and collect
/// the errors.
#[must_use = "tasks only run while the TaskRun is polled; call finish() to collect errors"]
pub struct TaskRun<'a, T, E> {
    pending: VecDeque<Task<'a, T, E>>,
    running: FuturesUnordered<Running<'a, T, E>>,
    workers: usize,
    fast_fail: bool,
    stopped: bool,
    errors: Vec<E>,
}

impl<'a, T: 'a, E: 'a> TaskRun<'a, T, E> {
    /// Next result in completion order, as `(success, userdata)`.
    ///
    /// Returns `None` once every task has finished, or right after the
    /// first failure when fast-fail is enabled.
    pub async fn next(&mut self) -> Option<(bool, T)> {
        if self.stopped {
            return None;
        }
        self.start_pending();

        let (userdata, result) = self.running.next().await?;
        match result {
            Ok(()) => Some((true, userdata)),
            Err(e) => {
                self.record_failure(e);
                if self.fast_fail {
                    self.stopped = true;
                }
                Some((false, userdata))
            }
        }
    }

    /// Wait for every started task and return all captured errors.
    ///
    /// Tasks that were not pulled through [`next`](Self::next) still run,
    /// unless a failure already cancelled them.
    pub async fn finish(mut self) -> Result<(), TaskErrors<E>> {
        loop {
            self.start_pending();
            let Some((_, result)) = self.running.next().await else {
                break;
            };
            if let Err(e) = result {
                self.record_failure(e);
            }
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(TaskErrors {
                errors: self.errors,
            })
        }
    }

    fn start_pending(&mut self) {
        while self.running.len() < self.workers {
            let Some(Task { userdata, job }) = self.pending.pop_front() else {
                break;
            };
            self.running.push(Box::pin(async move { (userdata, job.await) }));
        }
    }

    fn record_failure(&mut self, error: E) {
        self.errors.push(error);
        if self.fast_fail && !self.pending.is_empty() {
            tracing::debug!(
                cancelled = self.pending.len(),
                "task failed; cancelling tasks not yet started"
            );
            self.pending.clear();
        }
    }
}
