//! Synchronous stand-in for the HTTP middleware
//!
//! [`MockMiddleware`] interprets [`ApiCall`]s against a [`ResourceStore`]
//! the way the real middleware would, minus the network: the caller decides
//! each request's [`MockOutcome`]. Every dispatched action is recorded so
//! tests can assert on the exact lifecycle sequence.

use fetch_lifecycle_core::{
    ActionDescriptor, ApiCall, FetchAction, Lifecycle, MetaInput, ResourceStore, ResponseInfo,
    ResponseType, Transition,
};
use http::StatusCode;
use serde_json::{Map, Value};

/// What the transport returns for a request
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// The server answered
    Response {
        /// Status and classification
        response: ResponseInfo,
        /// Parsed response body
        body: Option<Value>,
    },
    /// The request never produced a response
    NetworkError(String),
}

impl MockOutcome {
    /// A `200` CORS response carrying `body`
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::status(200, Some(body))
    }

    /// A CORS response with an arbitrary status
    #[must_use]
    pub const fn status(status: u16, body: Option<Value>) -> Self {
        Self::Response {
            response: ResponseInfo::new(status, ResponseType::Cors),
            body,
        }
    }

    /// A transport failure such as a refused connection
    #[must_use]
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError(message.into())
    }
}

/// A request that passed its bailout and is awaiting an outcome
#[derive(Debug, Clone)]
pub struct InFlight {
    descriptor: ActionDescriptor,
}

impl InFlight {
    /// The descriptor being executed
    #[must_use]
    pub const fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }
}

/// Middleware double that owns the store it dispatches into
#[derive(Debug, Default)]
pub struct MockMiddleware {
    store: ResourceStore,
    history: Vec<FetchAction>,
    skipped: Vec<String>,
}

impl MockMiddleware {
    /// Wrap `store`
    #[must_use]
    pub fn new(store: ResourceStore) -> Self {
        Self {
            store,
            history: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// The store as it stands now
    #[must_use]
    pub const fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Every action dispatched so far, oldest first
    #[must_use]
    pub fn history(&self) -> &[FetchAction] {
        &self.history
    }

    /// Dispatched action types, oldest first
    #[must_use]
    pub fn history_types(&self) -> Vec<&str> {
        self.history
            .iter()
            .filter_map(FetchAction::action_type)
            .collect()
    }

    /// Endpoints of calls suppressed by their bailout
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Forget recorded history and skips; the store is kept
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.skipped.clear();
    }

    /// Release the store
    #[must_use]
    pub fn into_store(self) -> ResourceStore {
        self.store
    }

    /// Dispatch any action into the store and record it
    pub fn dispatch(&mut self, action: FetchAction) -> Transition {
        let transition = self.store.dispatch(&action);
        self.history.push(action);
        transition
    }

    /// Start a call: evaluate its bailout, then dispatch PENDING.
    ///
    /// Returns `None` when the bailout suppressed the request.
    pub fn begin(&mut self, call: &ApiCall) -> Option<InFlight> {
        let descriptor = call.descriptor();
        if descriptor.should_bail_out(&self.store) {
            tracing::debug!(endpoint = %descriptor.endpoint, "Request bailed out");
            self.skipped.push(descriptor.endpoint.clone());
            return None;
        }

        let pending = descriptor.lifecycle_type(Lifecycle::Pending).action(
            None,
            &MetaInput::new()
                .with_action(descriptor)
                .with_state(&self.store),
        );
        tracing::debug!(endpoint = %descriptor.endpoint, method = %descriptor.method, "Request started");
        self.dispatch(pending);

        Some(InFlight {
            descriptor: descriptor.clone(),
        })
    }

    /// Finish a call with `outcome`, dispatching SUCCESS or FAILURE.
    ///
    /// Returns a copy of the dispatched action.
    pub fn complete(&mut self, in_flight: InFlight, outcome: MockOutcome) -> FetchAction {
        let descriptor = &in_flight.descriptor;
        let action = match outcome {
            MockOutcome::Response { response, body } if response.is_success() => {
                descriptor.lifecycle_type(Lifecycle::Success).action(
                    body,
                    &MetaInput::new()
                        .with_action(descriptor)
                        .with_state(&self.store)
                        .with_response(&response),
                )
            },
            MockOutcome::Response { response, body } => {
                tracing::debug!(endpoint = %descriptor.endpoint, status = response.status, "Request failed");
                descriptor.lifecycle_type(Lifecycle::Failure).action(
                    Some(api_error(response.status, body)),
                    &MetaInput::new()
                        .with_action(descriptor)
                        .with_state(&self.store)
                        .with_response(&response),
                )
            },
            MockOutcome::NetworkError(message) => {
                tracing::debug!(endpoint = %descriptor.endpoint, %message, "Request errored");
                let mut payload = Map::new();
                payload.insert("name".to_owned(), Value::from("RequestError"));
                payload.insert("message".to_owned(), Value::from(message));
                descriptor.lifecycle_type(Lifecycle::Failure).action(
                    Some(Value::Object(payload)),
                    &MetaInput::new()
                        .with_action(descriptor)
                        .with_state(&self.store),
                )
            },
        };

        self.dispatch(action.clone());
        action
    }

    /// [`begin`](Self::begin) followed immediately by [`complete`](Self::complete)
    pub fn fetch(&mut self, call: &ApiCall, outcome: MockOutcome) -> Option<FetchAction> {
        let in_flight = self.begin(call)?;
        Some(self.complete(in_flight, outcome))
    }
}

/// Error payload for a non-2xx response: `{name, message, status, response?}`
fn api_error(status: u16, body: Option<Value>) -> Value {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default();

    let mut payload = Map::new();
    payload.insert("name".to_owned(), Value::from("ApiError"));
    payload.insert(
        "message".to_owned(),
        Value::from(format!("{status} - {reason}")),
    );
    payload.insert("status".to_owned(), Value::from(status));
    if let Some(body) = body {
        payload.insert("response".to_owned(), body);
    }
    Value::Object(payload)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use fetch_lifecycle_core::{FetchOptions, Resource};
    use serde_json::json;

    fn setup() -> (Resource, MockMiddleware) {
        let data = Resource::new("data").unwrap();
        let middleware = MockMiddleware::new(ResourceStore::new().with_resource(&data));
        (data, middleware)
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error(404, None),
            json!({ "name": "ApiError", "message": "404 - Not Found", "status": 404 })
        );
        assert_eq!(api_error(599, Some(json!("x")))["message"], json!("599 - "));
        assert_eq!(api_error(599, Some(json!("x")))["response"], json!("x"));
    }

    #[test]
    fn test_begin_dispatches_pending_with_endpoint() {
        let (data, mut middleware) = setup();
        let call = data.fetch_action("/data", FetchOptions::default()).unwrap();

        let in_flight = middleware.begin(&call).unwrap();

        assert_eq!(in_flight.descriptor().endpoint, "/data");
        assert_eq!(middleware.history_types(), ["DATA_FETCH_PENDING"]);
        let state = middleware.store().get(&data).unwrap();
        assert!(state.loading);
        assert_eq!(state.endpoint(), Some("/data"));
    }

    #[test]
    fn test_network_error_has_no_response() {
        let (data, mut middleware) = setup();
        let call = data.fetch_action("/data", FetchOptions::default()).unwrap();

        let action = middleware
            .fetch(&call, MockOutcome::network_error("Network request failed"))
            .unwrap();

        assert!(action.error);
        assert!(!action.meta.as_ref().unwrap().contains_key("response"));
        assert_eq!(
            middleware.store().get(&data).unwrap().error_message().as_deref(),
            Some("RequestError: Network request failed")
        );
    }
}
