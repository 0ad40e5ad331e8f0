//! Execution of independent slice tasks.
//!
//! Slices of one solve share no mutable state, so they can be run on any
//! number of workers. Results always come back in submission order, which
//! keeps the scatter into the output field deterministic.

use crate::error::{EllipticError, Result};

/// Runs a batch of independent tasks and returns results in input order.
///
/// A panic inside a task propagates to the caller.
pub trait SliceExecutor: Sync {
    /// Apply `f` to every task, preserving order.
    fn map_ordered<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send;

    /// Number of workers, for logging.
    fn workers(&self) -> usize;
}

/// Runs every task on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl SliceExecutor for SequentialExecutor {
    fn map_ordered<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        tasks.into_iter().map(f).collect()
    }

    fn workers(&self) -> usize {
        1
    }
}

/// Work-stealing execution on a dedicated Rayon pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    pool: std::sync::Arc<rayon::ThreadPool>,
}

#[cfg(feature = "parallel")]
impl RayonExecutor {
    /// Build a pool with `n_threads` workers.
    pub fn new(n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(EllipticError::InvalidThreadCount(n_threads));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("elliptic-slice-{i}"))
            .build()
            .map_err(|e| EllipticError::Executor(e.to_string()))?;
        Ok(Self {
            pool: std::sync::Arc::new(pool),
        })
    }

    /// Pool sized to the available parallelism.
    pub fn with_available_parallelism() -> Result<Self> {
        let n = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(n)
    }
}

#[cfg(feature = "parallel")]
impl SliceExecutor for RayonExecutor {
    fn map_ordered<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        use rayon::prelude::*;

        self.pool.install(|| tasks.into_par_iter().map(f).collect())
    }

    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Executor chosen at run time.
#[derive(Debug, Clone, Default)]
pub enum Executor {
    #[default]
    Sequential,
    #[cfg(feature = "parallel")]
    Rayon(RayonExecutor),
}

impl Executor {
    /// Sequential for one thread, a Rayon pool otherwise.
    ///
    /// Without the `parallel` feature every count runs sequentially.
    pub fn with_threads(n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(EllipticError::InvalidThreadCount(n_threads));
        }
        #[cfg(feature = "parallel")]
        let exec = if n_threads > 1 {
            Self::Rayon(RayonExecutor::new(n_threads)?)
        } else {
            Self::Sequential
        };
        #[cfg(not(feature = "parallel"))]
        let exec = Self::Sequential;
        Ok(exec)
    }
}

impl SliceExecutor for Executor {
    fn map_ordered<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        match self {
            Self::Sequential => SequentialExecutor.map_ordered(tasks, f),
            #[cfg(feature = "parallel")]
            Self::Rayon(pool) => pool.map_ordered(tasks, f),
        }
    }

    fn workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            #[cfg(feature = "parallel")]
            Self::Rayon(pool) => pool.workers(),
        }
    }
}
