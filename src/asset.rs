//! Assets: a single observable piece of state and its readiness predicate.
//!
//! An [`Asset`] is the `(ref, ready)` pair of §3. `ref` is stored type-erased
//! (the engine never needs to inspect its concrete type — only `ready`
//! matters for scheduling) behind typed accessors, following the same
//! type-erasure idiom as `node-engine`'s `ExecutorExtensions`.

use std::any::Any;
use std::sync::Arc;

/// A zero-argument readiness predicate.
///
/// Must be safely callable more than once; the engine treats any two
/// calls as independent queries and never caches an asset's own result
/// across invocations (§3's readiness invariant).
pub type ReadyFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// A single observable piece of state, addressed by an opaque `ref` and
/// queried for readiness through [`Asset::ready`].
#[derive(Clone)]
pub struct Asset {
    value: Arc<dyn Any + Send + Sync>,
    ready: ReadyFn,
}

impl Asset {
    /// Builds an asset from an owned `ref` value and a readiness closure.
    pub fn new<T, F>(value: T, ready: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            ready: Arc::new(ready),
        }
    }

    /// Builds an asset whose readiness is "the given path exists" — the
    /// common case for on-disk assets (§8 scenarios 2/3).
    pub fn path(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), move || path.exists())
    }

    /// Evaluates the readiness predicate. Callable repeatedly; never
    /// cached by the `Asset` itself.
    pub fn ready(&self) -> bool {
        (self.ready)()
    }

    /// Downcasts the `ref` to a concrete type, returning `None` on
    /// mismatch.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset").field("ready", &self.ready()).finish_non_exhaustive()
    }
}
