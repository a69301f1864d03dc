//! # Fetch Lifecycle Testing
//!
//! Testing utilities and helpers for fetch descriptors and lifecycle reducers.
//!
//! This crate provides:
//! - [`MockMiddleware`]: a synchronous stand-in for the HTTP middleware
//! - [`ReducerTest`]: Given-When-Then assertions for reducers
//! - Fixtures and proptest strategies for resources and responses
//!
//! ## Example
//!
//! ```
//! use fetch_lifecycle_core::{FetchOptions, Resource, ResourceStore};
//! use fetch_lifecycle_testing::{MockMiddleware, MockOutcome};
//! use serde_json::json;
//!
//! # fn main() -> fetch_lifecycle_core::Result<()> {
//! let users = Resource::new("users")?;
//! let mut middleware = MockMiddleware::new(ResourceStore::new().with_resource(&users));
//! let call = users.fetch_action("/users", FetchOptions::default())?;
//!
//! middleware.fetch(&call, MockOutcome::ok(json!(["ada"])));
//! assert_eq!(middleware.store().get(&users).and_then(|s| s.payload.clone()), Some(json!(["ada"])));
//!
//! // Cached now, so the second fetch never reaches the transport.
//! assert!(middleware.fetch(&call, MockOutcome::ok(json!([]))).is_none());
//! # Ok(())
//! # }
//! ```

mod middleware_mock;

pub use middleware_mock::{InFlight, MockMiddleware, MockOutcome};
pub use reducer_test::{ReducerTest, assertions};

/// Fixtures shared across test suites
pub mod fixtures {
    use fetch_lifecycle_core::{Resource, ResponseInfo, ResponseType};
    use serde_json::{Value, json};

    /// Endpoint used by fixtures
    pub const TEST_URL: &str = "http://localhost/api";

    /// Resource for `id`, which must be non-empty
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty.
    #[must_use]
    #[allow(clippy::expect_used)] // Test fixture
    pub fn resource(id: &str) -> Resource {
        Resource::new(id).expect("fixture identifiers are non-empty")
    }

    /// A CORS response with the given status
    #[must_use]
    pub const fn cors_response(status: u16) -> ResponseInfo {
        ResponseInfo::new(status, ResponseType::Cors)
    }

    /// Error payload shaped like the middleware's errors
    #[must_use]
    pub fn error_payload(name: &str, message: &str) -> Value {
        json!({ "name": name, "message": message })
    }

    /// Install a test-friendly tracing subscriber once per process.
    ///
    /// Honors `RUST_LOG`; defaults to debug output for the fetch crates.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "fetch_lifecycle_core=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities
///
/// proptest strategies for the domain types.
pub mod properties {
    use fetch_lifecycle_core::{Lifecycle, ResponseInfo, ResponseType};
    use proptest::prelude::*;

    /// Non-empty resource identifiers
    pub fn identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,15}"
    }

    /// Absolute http(s) URLs
    pub fn url() -> impl Strategy<Value = String> {
        "https?://[a-z]{1,10}(\\.[a-z]{2,3})?(/[a-z0-9]{0,8}){0,3}"
    }

    /// Any lifecycle phase
    pub fn lifecycle() -> impl Strategy<Value = Lifecycle> {
        prop::sample::select(Lifecycle::ALL.to_vec())
    }

    /// Responses with any status from 100 to 599
    pub fn response() -> impl Strategy<Value = ResponseInfo> {
        (
            100u16..600,
            prop::sample::select(vec![
                ResponseType::Basic,
                ResponseType::Cors,
                ResponseType::Opaque,
            ]),
        )
            .prop_map(|(status, kind)| ResponseInfo::new(status, kind))
    }
}
