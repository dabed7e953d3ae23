/// Default guard against unexpectedly deep or cyclic input.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Settings for a reconstruction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionConfig {
    /// Fail once this many rounds have run without reaching the fixed point
    pub max_rounds: usize,
    /// Reconstruct connected components concurrently
    pub parallel: bool,
    /// Worker threads used in parallel mode
    pub worker_threads: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            parallel: false,
            worker_threads: num_cpus::get(),
        }
    }
}

impl ReconstructionConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn parallel(mut self, worker_threads: usize) -> Self {
        self.parallel = true;
        self.worker_threads = worker_threads.max(1);
        self
    }
}
