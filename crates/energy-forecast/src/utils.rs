//! Thread handling for batch inference.

use rayon::prelude::*;

/// Whether a component may use rayon parallel iterators.
///
/// The thread pool itself is set up once, at the API boundary, by
/// [`run_with_threads`]; components only receive this flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// - 0 = auto (parallel if the global pool has more than one thread)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over `iter`, in order, in parallel when allowed.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

/// Run `f` under a thread pool sized by `n_threads`.
///
/// - `0` = the global rayon pool
/// - `1` = sequential, no pool
/// - `n > 1` = a dedicated pool of exactly `n` threads
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T, rayon::ThreadPoolBuildError> {
    let parallelism = Parallelism::from_threads(n_threads);

    match (parallelism, n_threads) {
        (Parallelism::Sequential, _) => Ok(f(Parallelism::Sequential)),
        (Parallelism::Parallel, 0) => Ok(f(Parallelism::Parallel)),
        (Parallelism::Parallel, n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
    }
}
