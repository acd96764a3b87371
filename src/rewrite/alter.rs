//! File URL alteration hooks.
//!
//! Host code registers hooks that may adjust a candidate asset path (for
//! example to point at a derivative image) before it is resolved to a CDN
//! domain. Hooks run in registration order; each sees the previous output.

use std::fmt;
use std::sync::Arc;

/// A path-altering hook. Returning the input unchanged means "no opinion".
pub trait PathAlter: Send + Sync {
    fn alter(&self, path: &str) -> String;
}

impl<F> PathAlter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn alter(&self, path: &str) -> String {
        self(path)
    }
}

/// Ordered chain of hooks.
#[derive(Clone, Default)]
pub struct AlterChain {
    hooks: Vec<Arc<dyn PathAlter>>,
}

impl AlterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; builder style.
    pub fn with(mut self, hook: impl PathAlter + 'static) -> Self {
        self.push(hook);
        self
    }

    pub fn push(&mut self, hook: impl PathAlter + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook in order.
    pub fn apply(&self, path: &str) -> String {
        self.hooks
            .iter()
            .fold(path.to_string(), |current, hook| hook.alter(&current))
    }
}

impl fmt::Debug for AlterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlterChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
