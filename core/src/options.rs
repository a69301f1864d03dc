//! Caller-supplied fetch options.
//!
//! Every field has a convention default, so `FetchOptions::default()` is a
//! plain cached `GET`. The data fields can be loaded from configuration:
//!
//! ```
//! use fetch_lifecycle_core::{Credentials, FetchOptions};
//! use http::Method;
//!
//! let options: FetchOptions = serde_json::from_str(
//!     r#"{ "method": "post", "body": { "name": "ada" }, "credentials": "same-origin" }"#,
//! ).unwrap_or_default();
//!
//! assert_eq!(options.method, Method::POST);
//! assert_eq!(options.credentials, Some(Credentials::SameOrigin));
//! assert!(!options.force);
//! ```
//!
//! The behaviour fields (`bailout`, `meta`) are programmatic only.

use crate::bailout::Bailout;
use crate::meta::MetaSpec;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Cookie policy forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    /// Never send cookies
    Omit,
    /// Send cookies to the same origin only
    SameOrigin,
    /// Always send cookies
    Include,
}

/// Request body: a pre-encoded string or a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Already encoded, sent verbatim
    Text(String),
    /// Structured body, encoded by the middleware
    Json(Value),
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Options controlling a single fetch descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Refetch even when a payload is already cached
    pub force: bool,

    /// HTTP method, `GET` by default
    #[serde(with = "method_serde")]
    pub method: Method,

    /// Body, dropped for `GET` and `HEAD`
    pub body: RequestBody,

    /// Extra request headers
    pub headers: Option<BTreeMap<String, String>>,

    /// Cookie policy
    pub credentials: Option<Credentials>,

    /// Replaces the default bailout predicate
    #[serde(skip)]
    pub bailout: Option<Bailout>,

    /// Extra metadata merged into every lifecycle action
    #[serde(skip)]
    pub meta: MetaSpec,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            force: false,
            method: Method::GET,
            body: RequestBody::default(),
            headers: None,
            credentials: None,
            bailout: None,
            meta: MetaSpec::default(),
        }
    }
}

impl FetchOptions {
    /// Options for a plain `GET`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the cache check in the default bailout
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a single request header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all request headers
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the cookie policy
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace the default bailout predicate
    ///
    /// The predicate sees resource slices only, through [`ResourceLookup`]
    /// keyed by store node. Application state outside the fetch slices is
    /// not visible to it; capture what it needs in the closure instead.
    ///
    /// ```
    /// use fetch_lifecycle_core::{Bailout, FetchOptions, Resource, ResourceStore};
    ///
    /// # fn main() -> fetch_lifecycle_core::Result<()> {
    /// let session = Resource::new("session")?;
    /// let store = ResourceStore::new().with_resource(&session);
    ///
    /// // Wait for the session before fetching anything else.
    /// let options = FetchOptions::new().with_bailout(Bailout::from_fn(|state| {
    ///     state.resource("session").is_none_or(|slice| slice.payload.is_none())
    /// }));
    /// let call = Resource::new("profile")?.fetch_action("/profile", options)?;
    ///
    /// assert!(call.descriptor().should_bail_out(&store));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// [`ResourceLookup`]: crate::bailout::ResourceLookup
    #[must_use]
    pub fn with_bailout(mut self, bailout: Bailout) -> Self {
        self.bailout = Some(bailout);
        self
    }

    /// Attach extra metadata to every lifecycle action
    ///
    /// Like the bailout, a metadata function reads state through
    /// [`ResourceLookup`](crate::bailout::ResourceLookup) only.
    #[must_use]
    pub fn with_meta(mut self, meta: MetaSpec) -> Self {
        self.meta = meta;
        self
    }
}

/// Whether a request with this method may carry a body.
#[must_use]
pub fn method_allows_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// String adapter for [`http::Method`].
pub(crate) mod method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(crate) fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Method::from_bytes(raw.to_uppercase().as_bytes()).map_err(D::Error::custom)
    }
}
