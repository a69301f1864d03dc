//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on a subset of state
//!
//! Together they let a typed application state host one [`FetchReducer`]
//! per resource field, the static counterpart of
//! [`ResourceStore`](crate::store::ResourceStore).
//!
//! # Examples
//!
//! ```
//! use fetch_lifecycle_core::composition::{combine_reducers, scope_reducer};
//! use fetch_lifecycle_core::{FetchAction, Reducer, Resource, ResourceState};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct AppState {
//!     users: Arc<ResourceState>,
//!     posts: Arc<ResourceState>,
//! }
//!
//! # fn main() -> fetch_lifecycle_core::Result<()> {
//! let app = combine_reducers(vec![
//!     Box::new(scope_reducer(
//!         Resource::new("users")?.reducer(),
//!         |app: &AppState| &app.users,
//!         |app: &mut AppState, users| app.users = users,
//!     )),
//!     Box::new(scope_reducer(
//!         Resource::new("posts")?.reducer(),
//!         |app: &AppState| &app.posts,
//!         |app: &mut AppState, posts| app.posts = posts,
//!     )),
//! ]);
//!
//! let mut state = AppState::default();
//! app.reduce(&mut state, &FetchAction::new("POSTS_FETCH_PENDING"));
//! assert!(state.posts.loading);
//! assert!(!state.users.loading);
//! # Ok(())
//! # }
//! ```
//!
//! [`FetchReducer`]: crate::lifecycle::FetchReducer

use crate::reducer::{Reducer, Transition};

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence; the combined transition is `Changed` if
/// any of them changed the state.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
#[must_use]
pub fn combine_reducers<S, A>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A> + Send + Sync>>,
) -> CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    reducers: Vec<Box<dyn Reducer<State = S, Action = A> + Send + Sync>>,
}

impl<S, A> Reducer for CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Transition {
        self.reducers
            .iter()
            .fold(Transition::Unchanged, |transition, reducer| {
                transition.merge(reducer.reduce(state, action))
            })
    }
}

/// Scopes a reducer to operate on a subset of a larger state.
///
/// The sub-state is cloned out, reduced, and written back only when the
/// inner reducer reports a change, so pass-through actions leave the parent
/// untouched.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The child state type (subset of `S`)
/// - `A`: The action type
pub fn scope_reducer<S, SubS, A, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, R>
where
    SubS: Clone,
    R: Reducer<State = SubS, Action = A>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, R>
where
    SubS: Clone,
    R: Reducer<State = SubS, Action = A>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<fn(&A)>,
}

impl<S, SubS, A, R> Reducer for ScopedReducer<S, SubS, A, R>
where
    SubS: Clone,
    R: Reducer<State = SubS, Action = A>,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Transition {
        let mut sub_state = (self.get_state)(state).clone();

        let transition = self.reducer.reduce(&mut sub_state, action);
        if transition.is_changed() {
            (self.set_state)(state, sub_state);
        }

        transition
    }
}
