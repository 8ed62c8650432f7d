//! Evaluation limits and switches.

/// Where session diagnostics are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PrintTarget {
    /// Write every message to stdout.
    #[default]
    Stdout,
    /// Capture messages in memory (tests, embedding).
    Buffer,
    /// Drop messages; they are still emitted as tracing events.
    Silent,
}

/// Configuration for one evaluation session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// How many call levels an unwinding error reports.
    pub trace_depth: u32,
    /// Maximum number of function bodies the tail-call loop may enter
    /// within one call expression.
    pub recursion_limit: usize,
    /// Maximum number of iterations of a C-style `for` comprehension.
    pub loop_limit: usize,
    /// Maximum number of elements a `for` or `each` clause iterates.
    pub range_limit: u32,
    /// Bytes of native stack that must remain before recursing.
    pub stack_red_zone: usize,
    /// Heap size that triggers the first collection pass.
    pub gc_initial_threshold: usize,
    /// Turn the first warning into an evaluation error.
    pub stop_on_first_warning: bool,
    /// Resolve builtins flagged experimental.
    pub experimental_features: bool,
    /// Seed of the session's random number generator; drawn from the OS
    /// when unset.
    pub random_seed: Option<u64>,
    pub print_target: PrintTarget,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            trace_depth: 12,
            recursion_limit: 1_000_000,
            loop_limit: 1_000_000,
            range_limit: 1_000_000,
            stack_red_zone: scad_stack::DEFAULT_RED_ZONE,
            gc_initial_threshold: 1_000,
            stop_on_first_warning: false,
            experimental_features: false,
            random_seed: None,
            print_target: PrintTarget::Stdout,
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_trace_depth(mut self, depth: u32) -> Self {
        self.trace_depth = depth;
        self
    }

    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_loop_limit(mut self, limit: usize) -> Self {
        self.loop_limit = limit;
        self
    }

    #[must_use]
    pub fn with_range_limit(mut self, limit: u32) -> Self {
        self.range_limit = limit;
        self
    }

    #[must_use]
    pub fn with_stack_red_zone(mut self, bytes: usize) -> Self {
        self.stack_red_zone = bytes;
        self
    }

    #[must_use]
    pub fn with_gc_initial_threshold(mut self, size: usize) -> Self {
        self.gc_initial_threshold = size;
        self
    }

    #[must_use]
    pub fn with_stop_on_first_warning(mut self, enabled: bool) -> Self {
        self.stop_on_first_warning = enabled;
        self
    }

    #[must_use]
    pub fn with_experimental_features(mut self, enabled: bool) -> Self {
        self.experimental_features = enabled;
        self
    }

    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_print_target(mut self, target: PrintTarget) -> Self {
        self.print_target = target;
        self
    }
}
