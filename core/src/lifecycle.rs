//! Lifecycle actions, resource state and the fetch reducer.
//!
//! The middleware dispatches flux-standard actions whose `type` follows
//! `<PREFIX>_FETCH_{PENDING,SUCCESS,FAILURE}`. A [`FetchReducer`] built for
//! the same [`Resource`] folds them into a [`ResourceState`]:
//!
//! | incoming type | new state |
//! |---|---|
//! | `PENDING` | `{ loading: true,  error: false, payload, meta }` |
//! | `SUCCESS` | `{ loading: false, error: false, payload, meta }` |
//! | `FAILURE` | `{ loading: false, error: true,  payload, meta }` |
//! | anything else | unchanged, same `Arc` |
//!
//! Payload and meta are taken from the action verbatim; they were already
//! built by the descriptor's metadata producers.

use crate::error::{FetchError, Result};
use crate::meta::{MetaMap, ResponseInfo};
use crate::reducer::{Reducer, Transition};
use crate::resource::{Lifecycle, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// An action as dispatched by the middleware.
///
/// A missing `type` is tolerated; such actions pass through every reducer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchAction {
    /// Action type string
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    /// Response body on success, error detail on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Output of the lifecycle type's metadata producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaMap>,

    /// Flux-standard error flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl FetchAction {
    /// Action of the given type with no payload or meta
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: Some(action_type.into()),
            ..Self::default()
        }
    }

    /// The lifecycle action of `resource` for `lifecycle`
    #[must_use]
    pub fn lifecycle(resource: &Resource, lifecycle: Lifecycle) -> Self {
        Self::new(resource.type_name(lifecycle))
    }

    /// Set the payload
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the metadata
    #[must_use]
    pub fn with_meta(mut self, meta: MetaMap) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Mark as an error action
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.error = true;
        self
    }

    /// The type string, if present
    #[must_use]
    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref()
    }
}

/// Per-resource state owned by a [`FetchReducer`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceState {
    /// A request is in flight
    pub loading: bool,

    /// The last request failed
    pub error: bool,

    /// Last payload: data after success, error detail after failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Metadata of the last lifecycle action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaMap>,
}

impl ResourceState {
    /// State after a lifecycle action of the given phase.
    #[must_use]
    pub const fn after(lifecycle: Lifecycle, payload: Option<Value>, meta: Option<MetaMap>) -> Self {
        Self {
            loading: matches!(lifecycle, Lifecycle::Pending),
            error: matches!(lifecycle, Lifecycle::Failure),
            payload,
            meta,
        }
    }

    /// No request in flight.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.loading
    }

    /// Endpoint recorded by the last lifecycle action.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.meta.as_ref()?.get("endpoint")?.as_str()
    }

    /// Response recorded by the last lifecycle action.
    #[must_use]
    pub fn response(&self) -> Option<ResponseInfo> {
        let response = self.meta.as_ref()?.get("response")?;
        serde_json::from_value(response.clone()).ok()
    }

    /// Human-readable description of the last failure.
    ///
    /// Error payloads shaped `{ name, message }` render as `"name: message"`;
    /// a bare string payload is returned as is. `None` when not failed or
    /// when the payload carries no message.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        if !self.error {
            return None;
        }

        match self.payload.as_ref()? {
            Value::String(message) => Some(message.clone()),
            Value::Object(detail) => {
                let message = detail.get("message").and_then(Value::as_str)?;
                match detail.get("name").and_then(Value::as_str) {
                    Some(name) => Some(format!("{name}: {message}")),
                    None => Some(message.to_owned()),
                }
            },
            _ => None,
        }
    }
}

/// Reducer folding one resource's lifecycle actions into its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReducer {
    resource: Resource,
}

impl FetchReducer {
    /// Reducer for `resource`
    #[must_use]
    pub const fn new(resource: Resource) -> Self {
        Self { resource }
    }

    /// The resource this reducer owns
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The state `action` leads to, or `None` if the action is not one of
    /// this resource's lifecycle actions.
    #[must_use]
    pub fn transition(&self, action: &FetchAction) -> Option<ResourceState> {
        let lifecycle = self.resource.classify(action.action_type()?)?;

        tracing::debug!(
            resource = %self.resource,
            phase = %lifecycle,
            endpoint = action.meta.as_ref().and_then(|m| m.get("endpoint")).and_then(serde_json::Value::as_str),
            "Applying fetch lifecycle action"
        );

        Some(ResourceState::after(
            lifecycle,
            action.payload.clone(),
            action.meta.clone(),
        ))
    }

    /// Apply `action` to `state`, returning the same `Arc` when the action
    /// does not concern this resource.
    #[must_use]
    pub fn apply(&self, state: &Arc<ResourceState>, action: &FetchAction) -> Arc<ResourceState> {
        match self.transition(action) {
            Some(next) => Arc::new(next),
            None => Arc::clone(state),
        }
    }
}

impl Reducer for FetchReducer {
    type State = Arc<ResourceState>;
    type Action = FetchAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Transition {
        match self.transition(action) {
            Some(next) => {
                *state = Arc::new(next);
                Transition::Changed
            },
            None => {
                tracing::trace!(
                    resource = %self.resource,
                    action_type = action.action_type(),
                    "Passing through unrelated action"
                );
                Transition::Unchanged
            },
        }
    }
}

/// Create the reducer for resource `id`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidArgument`] if `id` is empty.
pub fn make_reducer(id: &str) -> Result<FetchReducer> {
    if id.is_empty() {
        return Err(FetchError::InvalidArgument(
            "Must provide action identifier for reducer",
        ));
    }

    Resource::new(id).map(FetchReducer::new)
}
