//! Thread-count configuration and data-parallel loop utilities
//!
//! The front scheduler manages its own worker threads; everything else that
//! parallelizes (level walks in the solve engine, bulk loops) goes through
//! rayon via the helpers here.

use rayon::prelude::*;

/// Loops shorter than this run sequentially; spawning tasks costs more than
/// the work saved.
const PARALLEL_GRAIN: usize = 64;

/// Number of threads in the rayon pool used for data-parallel loops.
pub fn num_threads() -> usize {
    rayon::current_num_threads()
}

/// Number of worker threads the front scheduler uses by default.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Apply `func` to every index in `start..end`, in parallel when the range
/// is large enough to amortize task dispatch.
pub fn parallel_for<F>(start: usize, end: usize, func: F)
where
    F: Fn(usize) + Send + Sync,
{
    if start >= end {
        return;
    }

    if end - start < PARALLEL_GRAIN {
        for i in start..end {
            func(i);
        }
    } else {
        (start..end).into_par_iter().for_each(func);
    }
}
