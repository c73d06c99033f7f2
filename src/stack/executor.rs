use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;

/// A unit of work handed to an [`Executor`].
pub type Job<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Worker pool capability injected into a stack at construction.
pub trait Executor: Send + Sync {
    /// Number of jobs the work should be split into.
    fn parallelism(&self) -> usize;

    /// Runs all jobs and returns once every one of them has finished.
    fn execute<'a>(&self, jobs: Vec<Job<'a>>);
}

/// Runs jobs one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Executor for Sequential {
    fn parallelism(&self) -> usize {
        1
    }
    fn execute<'a>(&self, jobs: Vec<Job<'a>>) {
        for job in jobs {
            job();
        }
    }
}

impl Executor for ThreadPool {
    fn parallelism(&self) -> usize {
        self.current_num_threads()
    }
    fn execute<'a>(&self, jobs: Vec<Job<'a>>) {
        self.scope(|s| {
            for job in jobs {
                s.spawn(move |_| job());
            }
        });
    }
}

/// Builds a rayon pool with `threads` workers, or one per core when `threads` is 0.
pub fn thread_pool(threads: usize) -> Result<ThreadPool> {
    let threads = if threads == 0 { num_cpus::get() } else { threads };
    Ok(ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("stack-render-{}", i))
        .build()?)
}
