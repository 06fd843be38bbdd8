use std::env;
use std::sync::OnceLock;

/// A wrapper around the Rayon thread pool used by the reference kernels.
///
/// If the pool cannot be constructed, work runs directly on the calling
/// thread.
pub struct ThreadPool {
    /// The wrapped thread pool, or None if we failed to construct one.
    pool: Option<rayon::ThreadPool>,
}

impl ThreadPool {
    /// Run a function in the thread pool.
    ///
    /// This corresponds to [`rayon::ThreadPool::install`].
    pub fn run<R: Send, Op: FnOnce() -> R + Send>(&self, op: Op) -> R {
        if let Some(pool) = self.pool.as_ref() {
            pool.install(op)
        } else {
            op()
        }
    }

    /// Create a thread pool with a given number of threads.
    pub fn with_num_threads(num_threads: usize) -> ThreadPool {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("tessera-{}", index))
            .build();

        if let Err(err) = &pool {
            tracing::warn!(%err, "failed to create thread pool");
        }
        ThreadPool { pool: pool.ok() }
    }

    /// Return the number of threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |pool| pool.current_num_threads())
    }
}

/// Parse a `TESSERA_NUM_THREADS` value, clamping it to `[1, max_threads]`.
fn parse_thread_count(value: &str, max_threads: usize) -> Option<usize> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .map(|n| n.clamp(1, max_threads.max(1)))
}

/// Return the [Rayon][rayon] thread pool used to evaluate reference kernels.
///
/// The default thread count is the number of physical cores. It can be
/// overridden by setting the `TESSERA_NUM_THREADS` environment variable, whose
/// value must be a number between 1 and the logical core count.
///
/// [rayon]: https://github.com/rayon-rs/rayon
pub fn thread_pool() -> &'static ThreadPool {
    static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();
    THREAD_POOL.get_or_init(|| {
        let physical_cpus = num_cpus::get_physical().max(1);

        let num_threads = match env::var("TESSERA_NUM_THREADS") {
            Ok(value) => parse_thread_count(&value, num_cpus::get()).unwrap_or_else(|| {
                tracing::warn!(value = %value, "invalid TESSERA_NUM_THREADS value");
                physical_cpus
            }),
            Err(_) => physical_cpus,
        };
        tracing::debug!(num_threads, "creating thread pool");

        ThreadPool::with_num_threads(num_threads)
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_thread_count, thread_pool, ThreadPool};

    #[test]
    fn test_parse_thread_count() {
        assert_eq!(parse_thread_count("4", 8), Some(4));
        assert_eq!(parse_thread_count(" 2 ", 8), Some(2));
        assert_eq!(parse_thread_count("0", 8), Some(1));
        assert_eq!(parse_thread_count("64", 8), Some(8));
        assert_eq!(parse_thread_count("many", 8), None);
    }

    #[test]
    fn test_thread_pool_run() {
        let pool = ThreadPool::with_num_threads(2);
        assert_eq!(pool.num_threads(), 2);
        let name = pool.run(|| std::thread::current().name().map(|s| s.to_string()));
        assert!(name.unwrap().starts_with("tessera-"));

        assert!(thread_pool().num_threads() >= 1);
    }
}
