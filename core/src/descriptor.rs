//! Action descriptors handed to the HTTP middleware.
//!
//! [`build`] does not perform a request. It describes one: endpoint, method,
//! optional headers/credentials/body, a bailout predicate and the three
//! lifecycle types the middleware dispatches as the request progresses.
//!
//! # Example
//!
//! ```
//! use fetch_lifecycle_core::{build, FetchOptions, MetaInput, ResponseInfo, ResponseType};
//! use http::Method;
//!
//! # fn main() -> fetch_lifecycle_core::Result<()> {
//! let call = build(
//!     "data",
//!     "http://localhost/api",
//!     FetchOptions::new().with_method(Method::POST).with_body("{}"),
//! )?;
//! let descriptor = call.descriptor();
//!
//! assert_eq!(descriptor.types[1].type_name(), "DATA_FETCH_SUCCESS");
//! assert!(descriptor.body.is_some());
//!
//! let response = ResponseInfo::new(200, ResponseType::Cors);
//! let meta = descriptor.types[1].meta(&MetaInput::new().with_response(&response));
//! assert_eq!(meta["response"]["status"], 200);
//! # Ok(())
//! # }
//! ```

use crate::bailout::{Bailout, ResourceLookup};
use crate::error::{FetchError, Result};
use crate::lifecycle::FetchAction;
use crate::meta::{LifecycleMeta, MetaInput, MetaMap, MetaSpec};
use crate::options::{Credentials, FetchOptions, RequestBody, method_allows_body};
use crate::resource::{Lifecycle, Resource};
use http::Method;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker key under which the middleware looks for a descriptor.
pub const CALL_API: &str = "Call API";

/// One lifecycle phase of a descriptor: its type string and metadata producer.
#[derive(Debug, Clone)]
pub struct LifecycleType {
    lifecycle: Lifecycle,
    type_name: String,
    meta: LifecycleMeta,
}

impl LifecycleType {
    /// The `lifecycle` phase of `resource` fetched from `endpoint`.
    #[must_use]
    pub fn new(resource: &Resource, lifecycle: Lifecycle, endpoint: String, extra: MetaSpec) -> Self {
        Self {
            lifecycle,
            type_name: resource.type_name(lifecycle),
            meta: LifecycleMeta::new(lifecycle, endpoint, extra),
        }
    }

    /// The phase this entry describes
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `<PREFIX>_FETCH_<SUFFIX>`
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Run the metadata producer.
    #[must_use]
    pub fn meta(&self, input: &MetaInput<'_>) -> MetaMap {
        self.meta.compute(input)
    }

    /// The action the middleware dispatches for this phase.
    ///
    /// Failure actions carry the flux-standard `error` flag.
    #[must_use]
    pub fn action(&self, payload: Option<Value>, input: &MetaInput<'_>) -> FetchAction {
        FetchAction {
            action_type: Some(self.type_name.clone()),
            payload,
            meta: Some(self.meta(input)),
            error: self.lifecycle == Lifecycle::Failure,
        }
    }
}

impl Serialize for LifecycleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.type_name)
    }
}

/// Request description consumed by the middleware.
///
/// Serializes without the bailout and metadata producers; those are
/// behaviour, not data.
#[derive(Debug, Clone, Serialize)]
pub struct ActionDescriptor {
    /// URL to fetch
    pub endpoint: String,

    /// HTTP method
    #[serde(serialize_with = "crate::options::method_serde::serialize")]
    pub method: Method,

    /// Decides whether the request is skipped
    #[serde(skip)]
    pub bailout: Bailout,

    /// Pending, success and failure, in that order
    pub types: [LifecycleType; 3],

    /// Request headers, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Cookie policy, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Request body; absent for `GET` and `HEAD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

impl ActionDescriptor {
    /// The lifecycle type for `lifecycle`.
    #[must_use]
    pub const fn lifecycle_type(&self, lifecycle: Lifecycle) -> &LifecycleType {
        match lifecycle {
            Lifecycle::Pending => &self.types[0],
            Lifecycle::Success => &self.types[1],
            Lifecycle::Failure => &self.types[2],
        }
    }

    /// Evaluate the bailout against live state.
    #[must_use]
    pub fn should_bail_out(&self, state: &dyn ResourceLookup) -> bool {
        let bail = self.bailout.should_bail_out(state);
        tracing::trace!(endpoint = %self.endpoint, bail, "Evaluated bailout");
        bail
    }
}

/// A descriptor wrapped under [`CALL_API`].
#[derive(Debug, Clone, Serialize)]
pub struct ApiCall {
    #[serde(rename = "Call API")]
    descriptor: ActionDescriptor,
}

impl ApiCall {
    /// The wrapped descriptor
    #[must_use]
    pub const fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    /// Unwrap the descriptor
    #[must_use]
    pub fn into_descriptor(self) -> ActionDescriptor {
        self.descriptor
    }
}

/// Build the middleware call fetching resource `id` from `url`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidArgument`] if `id` or `url` is empty.
pub fn build(id: &str, url: &str, options: FetchOptions) -> Result<ApiCall> {
    if id.is_empty() || url.is_empty() {
        return Err(missing_target());
    }

    let resource = Resource::new(id)?;
    build_for(&resource, url.to_owned(), options)
}

pub(crate) fn build_for(resource: &Resource, url: String, options: FetchOptions) -> Result<ApiCall> {
    if url.is_empty() {
        return Err(missing_target());
    }

    let FetchOptions {
        force,
        method,
        body,
        headers,
        credentials,
        bailout,
        meta,
    } = options;

    let bailout = bailout.unwrap_or_else(|| Bailout::cached(resource, force));
    let types = Lifecycle::ALL
        .map(|lifecycle| LifecycleType::new(resource, lifecycle, url.clone(), meta.clone()));
    let body = method_allows_body(&method).then_some(body);

    tracing::debug!(
        resource = %resource,
        method = %method,
        endpoint = %url,
        force,
        has_body = body.is_some(),
        "Built fetch descriptor"
    );

    Ok(ApiCall {
        descriptor: ActionDescriptor {
            endpoint: url,
            method,
            bailout,
            types,
            headers,
            credentials,
            body,
        },
    })
}

const fn missing_target() -> FetchError {
    FetchError::InvalidArgument("Must provide action identifier and url")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::lifecycle::ResourceState;
    use crate::meta::{ResponseInfo, ResponseType};
    use serde_json::json;
    use std::collections::HashMap;

    const URL: &str = "http://localhost/api";

    fn valid_descriptor() -> ActionDescriptor {
        build("data", URL, FetchOptions::default())
            .unwrap()
            .into_descriptor()
    }

    #[test]
    fn test_requires_identifier_and_url() {
        let expected = Err(FetchError::InvalidArgument(
            "Must provide action identifier and url",
        ));
        assert_eq!(build("", "", FetchOptions::default()).map(|_| ()), expected);
        assert_eq!(build("testid", "", FetchOptions::default()).map(|_| ()), expected);
        assert_eq!(build("", URL, FetchOptions::default()).map(|_| ()), expected);
    }

    #[test]
    fn test_endpoint_and_default_method() {
        let descriptor = valid_descriptor();
        assert_eq!(descriptor.endpoint, URL);
        assert_eq!(descriptor.method, Method::GET);
        assert!(descriptor.headers.is_none());
        assert!(descriptor.credentials.is_none());
        assert!(descriptor.body.is_none());
    }

    #[test]
    fn test_three_types_in_order() {
        let descriptor = valid_descriptor();
        let names: Vec<&str> = descriptor.types.iter().map(LifecycleType::type_name).collect();
        assert_eq!(
            names,
            ["DATA_FETCH_PENDING", "DATA_FETCH_SUCCESS", "DATA_FETCH_FAILURE"]
        );
        for (entry, lifecycle) in descriptor.types.iter().zip(Lifecycle::ALL) {
            assert_eq!(entry.lifecycle(), lifecycle);
            assert_eq!(descriptor.lifecycle_type(lifecycle).type_name(), entry.type_name());
        }
    }

    #[test]
    fn test_pending_meta() {
        let descriptor = valid_descriptor();
        let meta = descriptor.types[0].meta(&MetaInput::new());
        assert_eq!(Value::Object(meta), json!({ "endpoint": URL }));
    }

    #[test]
    fn test_success_meta_round_trip() {
        let descriptor = valid_descriptor();
        let response = ResponseInfo::new(200, ResponseType::Cors);
        let meta = descriptor.types[1].meta(&MetaInput::new().with_response(&response));
        assert_eq!(
            Value::Object(meta),
            json!({ "endpoint": URL, "response": { "status": 200, "type": "cors" } })
        );
    }

    #[test]
    fn test_failure_meta_on_network_failure() {
        let descriptor = valid_descriptor();
        let meta = descriptor.types[2].meta(&MetaInput::new());
        assert_eq!(Value::Object(meta), json!({ "endpoint": URL }));
    }

    #[test]
    fn test_failure_meta_with_error_response() {
        let descriptor = valid_descriptor();
        let response = ResponseInfo::new(500, ResponseType::Cors);
        let meta = descriptor.types[2].meta(&MetaInput::new().with_response(&response));
        assert_eq!(meta["endpoint"], json!(URL));
        assert_eq!(meta["response"], json!({ "status": 500, "type": "cors" }));
    }

    #[test]
    fn test_default_bailout() {
        let descriptor = valid_descriptor();
        let slice = |loading: bool, payload: Option<Value>| {
            HashMap::from([(
                "data".to_owned(),
                ResourceState {
                    loading,
                    payload,
                    ..ResourceState::default()
                },
            )])
        };

        assert!(descriptor.should_bail_out(&slice(true, None)));
        assert!(descriptor.should_bail_out(&slice(false, Some(json!("dataalreadyhere")))));
        assert!(!descriptor.should_bail_out(&slice(false, None)));
        assert!(!descriptor.should_bail_out(&HashMap::<String, ResourceState>::new()));
    }

    #[test]
    fn test_forced_bailout_ignores_cache() {
        let descriptor = build("data", URL, FetchOptions::new().with_force(true))
            .unwrap()
            .into_descriptor();
        let cached = HashMap::from([(
            "data".to_owned(),
            ResourceState {
                payload: Some(json!("x")),
                ..ResourceState::default()
            },
        )]);
        assert!(!descriptor.should_bail_out(&cached));
    }

    #[test]
    fn test_custom_bailout_replaces_default() {
        let options = FetchOptions::new().with_bailout(Bailout::from_fn(|_| true));
        let descriptor = build("data", URL, options).unwrap().into_descriptor();
        assert!(descriptor.should_bail_out(&HashMap::<String, ResourceState>::new()));
    }

    #[test]
    fn test_body_only_for_methods_that_allow_it() {
        let post = build(
            "data",
            URL,
            FetchOptions::new().with_method(Method::POST).with_body("{}"),
        )
        .unwrap();
        assert_eq!(post.descriptor().method, Method::POST);
        assert_eq!(post.descriptor().body, Some(RequestBody::from("{}")));

        for method in [Method::GET, Method::HEAD] {
            let call = build(
                "data",
                URL,
                FetchOptions::new().with_method(method).with_body("{}"),
            )
            .unwrap();
            assert!(call.descriptor().body.is_none());
        }
    }

    #[test]
    fn test_default_body_is_empty_string_for_post() {
        let call = build("data", URL, FetchOptions::new().with_method(Method::POST)).unwrap();
        assert_eq!(call.descriptor().body, Some(RequestBody::Text(String::new())));
    }

    #[test]
    fn test_headers_and_credentials_pass_through() {
        let call = build(
            "data",
            URL,
            FetchOptions::new()
                .with_header("X-I-LOVE-VG", "ohyes")
                .with_credentials(Credentials::Include),
        )
        .unwrap();
        let descriptor = call.descriptor();
        assert_eq!(descriptor.headers.as_ref().unwrap()["X-I-LOVE-VG"], "ohyes");
        assert_eq!(descriptor.credentials, Some(Credentials::Include));
    }

    #[test]
    fn test_extra_meta_reaches_every_type() {
        let options = FetchOptions::new().with_meta(MetaSpec::from_fn(|input| {
            let mut meta = MetaMap::new();
            meta.insert("had_response".to_owned(), Value::from(input.response.is_some()));
            meta
        }));
        let descriptor = build("data", URL, options).unwrap().into_descriptor();
        let response = ResponseInfo::new(204, ResponseType::Basic);

        let pending = descriptor.types[0].meta(&MetaInput::new());
        let success = descriptor.types[1].meta(&MetaInput::new().with_response(&response));

        assert_eq!(pending["had_response"], json!(false));
        assert_eq!(success["had_response"], json!(true));
        assert_eq!(success["endpoint"], json!(URL));
    }

    #[test]
    fn test_lifecycle_action_shape() {
        let descriptor = valid_descriptor();

        let failure = descriptor.types[2].action(Some(json!({ "message": "offline" })), &MetaInput::new());
        assert_eq!(failure.action_type(), Some("DATA_FETCH_FAILURE"));
        assert!(failure.error);
        assert_eq!(failure.meta, Some(descriptor.types[2].meta(&MetaInput::new())));

        let pending = descriptor.types[0].action(None, &MetaInput::new().with_action(&descriptor));
        assert!(!pending.error);
        assert_eq!(pending.payload, None);
    }

    #[test]
    fn test_serializes_under_marker_key() {
        let call = build(
            "data",
            URL,
            FetchOptions::new()
                .with_method(Method::POST)
                .with_body(json!({ "q": 1 }))
                .with_credentials(Credentials::SameOrigin),
        )
        .unwrap();

        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value,
            json!({
                CALL_API: {
                    "endpoint": URL,
                    "method": "POST",
                    "types": ["DATA_FETCH_PENDING", "DATA_FETCH_SUCCESS", "DATA_FETCH_FAILURE"],
                    "credentials": "same-origin",
                    "body": { "q": 1 }
                }
            })
        );
    }
}
