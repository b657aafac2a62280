use rayon::prelude::*;

use crate::error::Result;

/// Bounded pool of hashing workers, created once per fingerprint run and threaded through
/// every recursive resolution.
///
/// Fan-out is dispatch-and-steal: a worker waiting on child tasks keeps executing queued work
/// from the same pool instead of parking on its slot, so deep directory trees cannot starve
/// the pool even with a single worker.
pub struct Limiter {
    pool: rayon::ThreadPool,
}

impl Limiter {
    pub fn new(concurrency: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|index| format!("fingerprint-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on the pool.
    pub fn run<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(op)
    }

    /// Apply `f` to every item on the pool, keeping input order in the output.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn depth_sum(limiter: &Limiter, depth: usize, visited: &AtomicUsize) -> usize {
        visited.fetch_add(1, Ordering::Relaxed);
        if depth == 0 {
            return 1;
        }
        let children: Vec<usize> = (0..3).collect();
        limiter
            .map(&children, |_| depth_sum(limiter, depth - 1, visited))
            .into_iter()
            .sum()
    }

    #[test]
    fn test_recursive_fan_out_with_single_worker() {
        let limiter = Limiter::new(1).unwrap();
        let visited = AtomicUsize::new(0);
        let leaves = limiter.run(|| depth_sum(&limiter, 5, &visited));
        assert_eq!(leaves, 3usize.pow(5));
        assert_eq!(visited.load(Ordering::Relaxed), (3usize.pow(6) - 1) / 2);
    }

    #[test]
    fn test_map_preserves_order() {
        let limiter = Limiter::new(4).unwrap();
        let items: Vec<u32> = (0..100).collect();
        let doubled = limiter.map(&items, |n| n * 2);
        assert_eq!(doubled, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let limiter = Limiter::new(3).unwrap();
        assert_eq!(limiter.concurrency(), 3);

        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<u32> = (0..64).collect();
        limiter.map(&items, |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(1));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
