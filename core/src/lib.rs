//! # Fetch Lifecycle Core
//!
//! Declarative HTTP fetches for a predictable-state container.
//!
//! This crate provides the two halves of the fetch convention:
//!
//! - **Action descriptors**: [`build`] turns a resource identifier, a URL and
//!   [`FetchOptions`] into an [`ApiCall`] that an HTTP middleware interprets.
//!   The descriptor carries a bailout predicate and three lifecycle types
//!   (pending, success, failure), each with a metadata producer.
//! - **Lifecycle reducers**: [`make_reducer`] returns a [`FetchReducer`] that
//!   folds the `<ID>_FETCH_{PENDING,SUCCESS,FAILURE}` actions dispatched by the
//!   middleware into a uniform [`ResourceState`].
//!
//! ## Core Concepts
//!
//! - **Resource**: Validated identifier shared by builder, reducer and store
//! - **Descriptor**: Request description handed to the middleware (not executed here)
//! - **Bailout**: Predicate that suppresses a fetch when data is loading or cached
//! - **Lifecycle action**: One of the three actions dispatched over a fetch's lifetime
//! - **Resource state**: The per-resource slice a [`FetchReducer`] owns
//!
//! ## Example
//!
//! ```
//! use fetch_lifecycle_core::{FetchAction, FetchOptions, Resource, ResourceStore};
//! use serde_json::json;
//!
//! # fn main() -> fetch_lifecycle_core::Result<()> {
//! let users = Resource::new("users")?;
//! let call = users.fetch_action("https://api.example.com/users", FetchOptions::default())?;
//!
//! let mut store = ResourceStore::new();
//! store.register(&users);
//!
//! // Nothing cached yet, so the middleware would issue the request.
//! assert!(!call.descriptor().should_bail_out(&store));
//!
//! store.dispatch(&FetchAction::new("USERS_FETCH_SUCCESS").with_payload(json!(["ada"])));
//! assert!(call.descriptor().should_bail_out(&store));
//! # Ok(())
//! # }
//! ```

/// Bailout predicates and the state lookup they read
pub mod bailout;

/// Reducer composition utilities
pub mod composition;

/// Action descriptors handed to the HTTP middleware
pub mod descriptor;

/// Error types
pub mod error;

/// Lifecycle actions, resource state and the fetch reducer
pub mod lifecycle;

/// Metadata producers attached to lifecycle types
pub mod meta;

/// Caller-supplied fetch options
pub mod options;

/// Resource identifiers and the lifecycle naming convention
pub mod resource;

/// Keyed store of resource slices
pub mod store;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// They are deterministic and own no resources; the state container that
/// calls them decides when and where state lives.
pub mod reducer {
    /// Outcome of applying an action to a reducer
    ///
    /// State containers use this to short-circuit change detection: an
    /// `Unchanged` result guarantees the state was not touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Transition {
        /// The action did not concern this reducer
        #[default]
        Unchanged,
        /// The reducer replaced its state
        Changed,
    }

    impl Transition {
        /// Whether the state was replaced
        #[must_use]
        pub const fn is_changed(self) -> bool {
            matches!(self, Self::Changed)
        }

        /// Combine two outcomes; changed if either changed
        #[must_use]
        pub const fn merge(self, other: Self) -> Self {
            if self.is_changed() || other.is_changed() {
                Self::Changed
            } else {
                Self::Unchanged
            }
        }
    }

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    ///
    /// # Example
    ///
    /// ```
    /// use fetch_lifecycle_core::reducer::{Reducer, Transition};
    ///
    /// struct CounterReducer;
    ///
    /// impl Reducer for CounterReducer {
    ///     type State = i64;
    ///     type Action = i64;
    ///
    ///     fn reduce(&self, state: &mut i64, action: &i64) -> Transition {
    ///         if *action == 0 {
    ///             return Transition::Unchanged;
    ///         }
    ///         *state += action;
    ///         Transition::Changed
    ///     }
    /// }
    ///
    /// let mut count = 0;
    /// assert!(CounterReducer.reduce(&mut count, &2).is_changed());
    /// assert_eq!(count, 2);
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Reduce an action into a state change
        ///
        /// Implementations must leave `state` untouched when they return
        /// [`Transition::Unchanged`].
        fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Transition;
    }
}

pub use bailout::{Bailout, ResourceLookup};
pub use descriptor::{ActionDescriptor, ApiCall, CALL_API, LifecycleType, build};
pub use error::{FetchError, Result};
pub use lifecycle::{FetchAction, FetchReducer, ResourceState, make_reducer};
pub use meta::{LifecycleMeta, MetaInput, MetaMap, MetaSpec, ResponseInfo, ResponseType};
pub use options::{Credentials, FetchOptions, RequestBody};
pub use reducer::{Reducer, Transition};
pub use resource::{Lifecycle, Resource};
pub use store::ResourceStore;
