use jiff::{SignedDuration, Timestamp};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

#[derive(Clone, Debug)]
pub struct SolverParams {
    pub termination: Termination,
    pub threads: Threads,
}

/// Budget of a single route generation call.
#[derive(Clone, Debug)]
pub struct Termination {
    pub max_duration: SignedDuration,
    pub max_iterations: usize,
}

#[derive(Clone, Debug)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            termination: Termination {
                max_duration: SignedDuration::from_secs(5),
                max_iterations: 10_000,
            },
            threads: Threads::Auto,
        }
    }
}

impl SolverParams {
    pub fn build_thread_pool(&self) -> Result<ThreadPool, ThreadPoolBuildError> {
        ThreadPoolBuilder::new()
            .num_threads(self.threads.number_of_threads())
            .thread_name(|index| format!("courier-solver-{index}"))
            .build()
    }
}

/// Tracks elapsed time and local search iterations against a [`Termination`].
pub struct SearchBudget {
    started: Timestamp,
    iterations: usize,
    termination: Termination,
}

impl SearchBudget {
    pub fn start(termination: &Termination) -> Self {
        SearchBudget {
            started: Timestamp::now(),
            iterations: 0,
            termination: termination.clone(),
        }
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_time_exhausted(&self) -> bool {
        Timestamp::now().duration_since(self.started) > self.termination.max_duration
    }

    pub fn is_exhausted(&self) -> bool {
        self.iterations >= self.termination.max_iterations || self.is_time_exhausted()
    }
}
