//! Resolution limits
//!
//! Limits bound the work a single resolution request may do, so that
//! pathological registrations fail fast with an error instead of
//! exhausting the stack or spinning on a huge graph.
//!
//! ```rust
//! use bindery::{Registry, Limits};
//!
//! let registry = Registry::new()
//!     .with_limits(Limits::new().with_max_producers(4));
//! ```

const DEFAULT_MAX_PRODUCERS: usize = 8;
const DEFAULT_MAX_PARAMETERS: usize = crate::producer::factory::MAX_ARITY;
const DEFAULT_MAX_RESOLVE_STEPS: usize = 4096;
const DEFAULT_MAX_WALK: usize = 131_072;

/// Represents the resolution limits of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum number of producers an implementation may declare
    ///
    /// Default: `8`
    max_producers: usize,

    /// Maximum number of parameters of a producer,
    /// and of children of a resolution node
    ///
    /// Default: `8`
    max_parameters: usize,

    /// Maximum number of resolution steps per request
    ///
    /// Default: `4096`
    max_resolve_steps: usize,

    /// Maximum number of nodes visited by one ancestor walk
    ///
    /// Default: `131072`
    max_walk: usize,
}

impl Default for Limits {
    #[inline]
    fn default() -> Self {
        Self {
            max_producers: DEFAULT_MAX_PRODUCERS,
            max_parameters: DEFAULT_MAX_PARAMETERS,
            max_resolve_steps: DEFAULT_MAX_RESOLVE_STEPS,
            max_walk: DEFAULT_MAX_WALK,
        }
    }
}

impl Limits {
    /// Creates the default limits
    ///
    /// Defaults:
    /// - max_producers: `8`
    /// - max_parameters: `8`
    /// - max_resolve_steps: `4096`
    /// - max_walk: `131072`
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of producers per implementation
    pub fn with_max_producers(mut self, max: usize) -> Self {
        self.max_producers = max;
        self
    }

    /// Sets the maximum number of parameters per producer
    pub fn with_max_parameters(mut self, max: usize) -> Self {
        self.max_parameters = max;
        self
    }

    /// Sets the maximum number of resolution steps per request
    pub fn with_max_resolve_steps(mut self, max: usize) -> Self {
        self.max_resolve_steps = max;
        self
    }

    /// Sets the maximum number of nodes visited by one ancestor walk
    pub fn with_max_walk(mut self, max: usize) -> Self {
        self.max_walk = max;
        self
    }

    /// Returns the maximum number of producers per implementation
    #[inline]
    pub fn max_producers(&self) -> usize {
        self.max_producers
    }

    /// Returns the maximum number of parameters per producer
    #[inline]
    pub fn max_parameters(&self) -> usize {
        self.max_parameters
    }

    /// Returns the maximum number of resolution steps per request
    #[inline]
    pub fn max_resolve_steps(&self) -> usize {
        self.max_resolve_steps
    }

    /// Returns the maximum number of nodes visited by one ancestor walk
    #[inline]
    pub fn max_walk(&self) -> usize {
        self.max_walk
    }
}
