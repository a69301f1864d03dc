//! Keyed store of resource slices.
//!
//! [`ResourceStore`] is the dynamic counterpart of a combined reducer map:
//! each registered [`Resource`] gets a slice mounted under its store node,
//! owned by that resource's [`FetchReducer`]. Because the mount key and the
//! bailout lookup key both come from the same `Resource`, a descriptor's
//! default bailout always reads the slice its reducer writes.

use crate::bailout::ResourceLookup;
use crate::lifecycle::{FetchAction, FetchReducer, ResourceState};
use crate::reducer::{Reducer, Transition};
use crate::resource::Resource;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Slice {
    reducer: FetchReducer,
    state: Arc<ResourceState>,
}

/// Resource slices keyed by store node.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    slices: BTreeMap<String, Slice>,
}

impl ResourceStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `resource` with default state.
    ///
    /// Returns `false` and keeps the existing slices if the store node or the
    /// action type prefix is already taken. Identifiers such as `straße` and
    /// `strasse` mount apart but share a prefix, so their reducers would both
    /// claim the same actions.
    pub fn register(&mut self, resource: &Resource) -> bool {
        let store_node = resource.store_node();
        if self.slices.contains_key(store_node) {
            tracing::debug!(resource = %resource, store_node, "Resource already registered");
            return false;
        }
        if self
            .slices
            .values()
            .any(|slice| slice.reducer.resource().prefix() == resource.prefix())
        {
            tracing::debug!(
                resource = %resource,
                prefix = resource.prefix(),
                "Action type prefix already registered"
            );
            return false;
        }

        tracing::debug!(resource = %resource, store_node, "Registering resource");
        self.slices.insert(
            store_node.to_owned(),
            Slice {
                reducer: resource.reducer(),
                state: Arc::default(),
            },
        );
        true
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_resource(mut self, resource: &Resource) -> Self {
        self.register(resource);
        self
    }

    /// Route `action` to every slice's reducer.
    pub fn dispatch(&mut self, action: &FetchAction) -> Transition {
        self.slices
            .values_mut()
            .fold(Transition::Unchanged, |transition, slice| {
                transition.merge(slice.reducer.reduce(&mut slice.state, action))
            })
    }

    /// Shared handle to the slice under `store_node`.
    #[must_use]
    pub fn state(&self, store_node: &str) -> Option<Arc<ResourceState>> {
        self.slices.get(store_node).map(|slice| Arc::clone(&slice.state))
    }

    /// The slice owned by `resource`.
    #[must_use]
    pub fn get(&self, resource: &Resource) -> Option<&ResourceState> {
        self.resource(resource.store_node())
    }

    /// Handles to every slice.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Arc<ResourceState>> {
        self.slices
            .iter()
            .map(|(store_node, slice)| (store_node.clone(), Arc::clone(&slice.state)))
            .collect()
    }

    /// Registered store nodes, in order.
    pub fn store_nodes(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    /// Number of registered resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether no resource is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl ResourceLookup for ResourceStore {
    fn resource(&self, store_node: &str) -> Option<&ResourceState> {
        self.slices.get(store_node).map(|slice| slice.state.as_ref())
    }
}

impl Serialize for ResourceStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.slices
                .iter()
                .map(|(store_node, slice)| (store_node, slice.state.as_ref())),
        )
    }
}
