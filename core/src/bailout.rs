//! Bailout predicates and the state lookup they read.
//!
//! The middleware evaluates a descriptor's bailout against live state right
//! before issuing the request, and skips the request when it returns `true`.
//! The default policy gives at-most-one-in-flight plus cache reuse: skip
//! while the resource is loading, and skip once a payload is cached unless
//! the caller forced a refresh.

use crate::lifecycle::ResourceState;
use crate::resource::Resource;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

/// Read access to resource slices keyed by store node.
pub trait ResourceLookup {
    /// The slice mounted under `store_node`, if any.
    fn resource(&self, store_node: &str) -> Option<&ResourceState>;
}

impl<H: BuildHasher> ResourceLookup for HashMap<String, ResourceState, H> {
    fn resource(&self, store_node: &str) -> Option<&ResourceState> {
        self.get(store_node)
    }
}

impl<H: BuildHasher> ResourceLookup for HashMap<String, Arc<ResourceState>, H> {
    fn resource(&self, store_node: &str) -> Option<&ResourceState> {
        self.get(store_node).map(Arc::as_ref)
    }
}

impl ResourceLookup for BTreeMap<String, ResourceState> {
    fn resource(&self, store_node: &str) -> Option<&ResourceState> {
        self.get(store_node)
    }
}

impl ResourceLookup for BTreeMap<String, Arc<ResourceState>> {
    fn resource(&self, store_node: &str) -> Option<&ResourceState> {
        self.get(store_node).map(Arc::as_ref)
    }
}

/// Signature of a caller-supplied bailout predicate.
///
/// The predicate reads resource slices by store node and nothing else; state
/// owned outside the fetch slices has to be captured by the closure.
pub type BailoutFn = Arc<dyn Fn(&dyn ResourceLookup) -> bool + Send + Sync>;

/// Decides whether a fetch should be skipped.
#[derive(Clone)]
pub enum Bailout {
    /// Skip while loading, or while a payload is cached and `force` is off
    Cached {
        /// Where the resource's slice is mounted
        store_node: String,
        /// Ignore a cached payload
        force: bool,
    },
    /// Caller-supplied predicate
    Custom(BailoutFn),
}

impl Bailout {
    /// The default policy for `resource`.
    #[must_use]
    pub fn cached(resource: &Resource, force: bool) -> Self {
        Self::Cached {
            store_node: resource.store_node().to_owned(),
            force,
        }
    }

    /// Wrap a custom predicate
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&dyn ResourceLookup) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// A predicate that never skips
    #[must_use]
    pub fn never() -> Self {
        Self::from_fn(|_| false)
    }

    /// Evaluate against the current state.
    #[must_use]
    pub fn should_bail_out(&self, state: &dyn ResourceLookup) -> bool {
        match self {
            Self::Cached { store_node, force } => {
                state.resource(store_node).is_some_and(|slice| {
                    slice.loading || (!force && slice.payload.as_ref().is_some_and(is_truthy))
                })
            },
            Self::Custom(predicate) => predicate(state),
        }
    }
}

impl fmt::Debug for Bailout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached { store_node, force } => f
                .debug_struct("Bailout::Cached")
                .field("store_node", store_node)
                .field("force", force)
                .finish(),
            Self::Custom(_) => write!(f, "Bailout::Custom(<fn>)"),
        }
    }
}

/// Truthiness of a dynamic payload.
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; every array and object,
/// empty or not, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
