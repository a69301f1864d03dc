//! Metadata producers attached to lifecycle types.
//!
//! The middleware calls a lifecycle type's producer with the original
//! descriptor, the current state and (after the request settles) the raw
//! response. The result becomes the dispatched action's `meta`.
//!
//! | phase   | metadata                                             |
//! |---------|------------------------------------------------------|
//! | pending | `{ endpoint, ...extra }`                             |
//! | success | `{ endpoint, response: { status, type }, ...extra }` |
//! | failure | as success, or `{ endpoint, ...extra }` without a response |
//!
//! `extra` comes from the caller's [`MetaSpec`] and is resolved on every
//! call, never cached.

use crate::bailout::ResourceLookup;
use crate::descriptor::ActionDescriptor;
use crate::resource::Lifecycle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Metadata object type.
pub type MetaMap = Map<String, Value>;

/// Signature of a caller-supplied metadata function.
pub type MetaFn = Arc<dyn Fn(&MetaInput<'_>) -> MetaMap + Send + Sync>;

/// Response classification as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Valid cross-origin response
    Cors,
    /// Not produced by a network request
    Default,
    /// Network error
    Error,
    /// Opaque cross-origin response
    Opaque,
    /// Opaque redirect
    OpaqueRedirect,
}

/// The parts of a raw response that end up in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// HTTP status code
    pub status: u16,
    /// Response classification
    #[serde(rename = "type")]
    pub kind: ResponseType,
}

impl ResponseInfo {
    /// Create response info
    #[must_use]
    pub const fn new(status: u16, kind: ResponseType) -> Self {
        Self { status, kind }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// `{ status, type }` as it appears under `meta.response`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "status": self.status, "type": self.kind })
    }
}

/// Arguments the middleware passes to a metadata producer.
///
/// Every field is optional: pending producers run before any response
/// exists, and network-level failures never produce one.
#[derive(Clone, Copy, Default)]
pub struct MetaInput<'a> {
    /// The descriptor that triggered the fetch
    pub action: Option<&'a ActionDescriptor>,
    /// Current state at the time of the call
    pub state: Option<&'a dyn ResourceLookup>,
    /// Raw response, once there is one
    pub response: Option<&'a ResponseInfo>,
}

impl<'a> MetaInput<'a> {
    /// Input with nothing available.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the originating descriptor
    #[must_use]
    pub const fn with_action(mut self, action: &'a ActionDescriptor) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach the current state
    #[must_use]
    pub const fn with_state(mut self, state: &'a dyn ResourceLookup) -> Self {
        self.state = Some(state);
        self
    }

    /// Attach the raw response
    #[must_use]
    pub const fn with_response(mut self, response: &'a ResponseInfo) -> Self {
        self.response = Some(response);
        self
    }
}

impl fmt::Debug for MetaInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaInput")
            .field("action", &self.action.map(|action| action.endpoint.as_str()))
            .field("state", &self.state.map(|_| "<state>"))
            .field("response", &self.response)
            .finish()
    }
}

/// Caller-supplied extra metadata.
#[derive(Clone)]
pub enum MetaSpec {
    /// The same object on every call
    Static(MetaMap),
    /// Computed from the call's arguments
    Computed(MetaFn),
}

impl MetaSpec {
    /// No extra metadata
    #[must_use]
    pub fn none() -> Self {
        Self::Static(MetaMap::new())
    }

    /// Extra metadata computed per call
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&MetaInput<'_>) -> MetaMap + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Resolve the extra metadata for one call.
    #[must_use]
    pub fn resolve(&self, input: &MetaInput<'_>) -> MetaMap {
        match self {
            Self::Static(meta) => meta.clone(),
            Self::Computed(f) => f(input),
        }
    }
}

impl Default for MetaSpec {
    fn default() -> Self {
        Self::none()
    }
}

impl From<MetaMap> for MetaSpec {
    fn from(meta: MetaMap) -> Self {
        Self::Static(meta)
    }
}

impl fmt::Debug for MetaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(meta) => f.debug_tuple("MetaSpec::Static").field(meta).finish(),
            Self::Computed(_) => write!(f, "MetaSpec::Computed(<fn>)"),
        }
    }
}

/// Metadata producer for one lifecycle phase.
///
/// Holds what the producer captured when the descriptor was built: the
/// endpoint and the caller's extra metadata.
#[derive(Debug, Clone)]
pub struct LifecycleMeta {
    lifecycle: Lifecycle,
    endpoint: String,
    extra: MetaSpec,
}

impl LifecycleMeta {
    /// Create a producer for `lifecycle`
    #[must_use]
    pub const fn new(lifecycle: Lifecycle, endpoint: String, extra: MetaSpec) -> Self {
        Self {
            lifecycle,
            endpoint,
            extra,
        }
    }

    /// Compute the metadata for one dispatch.
    ///
    /// Keys produced by the caller's extra metadata win over the built-in
    /// `endpoint` and `response` keys.
    #[must_use]
    pub fn compute(&self, input: &MetaInput<'_>) -> MetaMap {
        let mut meta = MetaMap::new();
        meta.insert("endpoint".to_owned(), Value::from(self.endpoint.as_str()));

        if self.lifecycle != Lifecycle::Pending {
            if let Some(response) = input.response {
                meta.insert("response".to_owned(), response.to_value());
            }
        }

        meta.extend(self.extra.resolve(input));
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn object(value: Value) -> MetaMap {
        match value {
            Value::Object(map) => map,
            _ => MetaMap::new(),
        }
    }

    const URL: &str = "http://localhost/api";

    #[test]
    fn test_pending_meta_has_endpoint_only() {
        let producer = LifecycleMeta::new(Lifecycle::Pending, URL.to_owned(), MetaSpec::none());
        let response = ResponseInfo::new(200, ResponseType::Cors);

        // Pending ignores any response it is handed.
        let meta = producer.compute(&MetaInput::new().with_response(&response));
        assert_eq!(Value::Object(meta), json!({ "endpoint": URL }));
    }

    #[test]
    fn test_success_meta_carries_response() {
        let producer = LifecycleMeta::new(Lifecycle::Success, URL.to_owned(), MetaSpec::none());
        let response = ResponseInfo::new(200, ResponseType::Cors);

        let meta = producer.compute(&MetaInput::new().with_response(&response));
        assert_eq!(
            Value::Object(meta),
            json!({ "endpoint": URL, "response": { "status": 200, "type": "cors" } })
        );
    }

    #[test]
    fn test_failure_meta_without_response() {
        let producer = LifecycleMeta::new(Lifecycle::Failure, URL.to_owned(), MetaSpec::none());

        let meta = producer.compute(&MetaInput::new());
        assert_eq!(Value::Object(meta.clone()), json!({ "endpoint": URL }));
        assert!(!meta.contains_key("response"));
    }

    #[test]
    fn test_failure_meta_with_response() {
        let producer = LifecycleMeta::new(Lifecycle::Failure, URL.to_owned(), MetaSpec::none());
        let response = ResponseInfo::new(500, ResponseType::Cors);

        let meta = producer.compute(&MetaInput::new().with_response(&response));
        assert_eq!(meta["response"], json!({ "status": 500, "type": "cors" }));
    }

    #[test]
    fn test_static_extra_meta_is_merged() {
        let extra = MetaSpec::from(object(json!({ "page": 2 })));
        let producer = LifecycleMeta::new(Lifecycle::Pending, URL.to_owned(), extra);

        let meta = producer.compute(&MetaInput::new());
        assert_eq!(Value::Object(meta), json!({ "endpoint": URL, "page": 2 }));
    }

    #[test]
    fn test_extra_meta_overrides_builtin_keys() {
        let extra = MetaSpec::from(object(json!({ "endpoint": "masked" })));
        let producer = LifecycleMeta::new(Lifecycle::Success, URL.to_owned(), extra);

        let meta = producer.compute(&MetaInput::new());
        assert_eq!(meta["endpoint"], json!("masked"));
    }

    #[test]
    fn test_computed_extra_meta_runs_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let extra = MetaSpec::from_fn(move |input| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            let mut meta = MetaMap::new();
            meta.insert("call".to_owned(), Value::from(call));
            meta.insert(
                "status".to_owned(),
                input.response.map_or(Value::Null, |r| Value::from(r.status)),
            );
            meta
        });
        let producer = LifecycleMeta::new(Lifecycle::Failure, URL.to_owned(), extra);
        let response = ResponseInfo::new(404, ResponseType::Basic);

        let first = producer.compute(&MetaInput::new().with_response(&response));
        let second = producer.compute(&MetaInput::new());

        assert_eq!(first["call"], json!(0));
        assert_eq!(first["status"], json!(404));
        assert_eq!(second["call"], json!(1));
        assert_eq!(second["status"], Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_response_info_serde_shape() {
        let response: ResponseInfo =
            serde_json::from_value(json!({ "status": 302, "type": "opaqueredirect" }))
                .unwrap_or(ResponseInfo::new(0, ResponseType::Error));
        assert_eq!(response, ResponseInfo::new(302, ResponseType::OpaqueRedirect));
        assert!(!response.is_success());
        assert_eq!(response.to_value(), json!({ "status": 302, "type": "opaqueredirect" }));
    }

    #[test]
    fn test_response_value_matches_serde_form() {
        let kinds = [
            (ResponseType::Basic, "basic"),
            (ResponseType::Cors, "cors"),
            (ResponseType::Default, "default"),
            (ResponseType::Error, "error"),
            (ResponseType::Opaque, "opaque"),
            (ResponseType::OpaqueRedirect, "opaqueredirect"),
        ];

        for (kind, wire) in kinds {
            let response = ResponseInfo::new(200, kind);
            assert_eq!(response.to_value(), json!({ "status": 200, "type": wire }));
            assert_eq!(Some(response.to_value()), serde_json::to_value(response).ok());
        }
    }
}
