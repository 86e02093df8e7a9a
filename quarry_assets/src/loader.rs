use crate::handle::LoadHandle;
use crate::key::AssetKey;
use std::any::Any;
use std::fmt;
use std::fmt::{Debug, Formatter};

/// Opaque placement payload for instantiated resources
///
/// The cache passes it through untouched; only the loader interprets it.
pub struct Placement(Box<dyn Any + Send + Sync>);

impl Placement {
    pub fn new<T: Any + Send + Sync>(placement: T) -> Self {
        Self(Box::new(placement))
    }

    pub fn downcast<T: Any + Send + Sync>(self) -> Option<T> {
        self.0.downcast::<T>().ok().map(|placement| *placement)
    }
}

impl Debug for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Placement(..)")
    }
}

/// External collaborator performing the actual resource work
///
/// Start and release callbacks run while the cache holds its internal lock;
/// they must return promptly and must not call back into the cache.
pub trait ResourceLoader: Send + Sync {
    /// Begin loading the resource named by `key`
    fn start_load(&self, key: &AssetKey) -> LoadHandle;

    /// Begin loading `key` and placing an instance into the caller's context
    fn start_instantiate(&self, key: &AssetKey, placement: Placement) -> LoadHandle;

    /// Begin loading every resource tagged with `label`
    ///
    /// The returned handle settles with a `Vec<ResourceValue>` payload.
    fn start_load_by_label(&self, label: &AssetKey) -> LoadHandle;

    /// Release engine-level resources tied to `handle`
    ///
    /// Idempotent, safe to call on an already-invalid handle.
    fn release_underlying(&self, handle: &LoadHandle);
}
