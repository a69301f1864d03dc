//! Resource identifiers and the lifecycle naming convention.
//!
//! A [`Resource`] is the single source of truth for everything derived from
//! an identifier:
//!
//! - the **prefix** (`uppercase(id)`) used to build lifecycle type names
//! - the **store node** (`lowercase(id)`) under which the resource's state is
//!   mounted and where the default bailout looks for it
//!
//! Building the descriptor, the reducer and the store mount point from the
//! same `Resource` keeps the three in agreement.
//!
//! # Example
//!
//! ```
//! use fetch_lifecycle_core::{Lifecycle, Resource};
//!
//! # fn main() -> fetch_lifecycle_core::Result<()> {
//! let resource = Resource::new("Data")?;
//! assert_eq!(resource.prefix(), "DATA");
//! assert_eq!(resource.store_node(), "data");
//! assert_eq!(resource.type_name(Lifecycle::Success), "DATA_FETCH_SUCCESS");
//! assert_eq!(resource.classify("DATA_FETCH_FAILURE"), Some(Lifecycle::Failure));
//! assert_eq!(resource.classify("OTHER_FETCH_FAILURE"), None);
//! # Ok(())
//! # }
//! ```

use crate::descriptor::{self, ApiCall};
use crate::error::{FetchError, Result};
use crate::lifecycle::FetchReducer;
use crate::options::FetchOptions;
use std::fmt;

/// Infix between the resource prefix and the lifecycle suffix.
pub const FETCH_INFIX: &str = "_FETCH_";

/// The three phases of a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Request issued, response outstanding
    Pending,
    /// Response received with a success status
    Success,
    /// Error status or network-level failure
    Failure,
}

impl Lifecycle {
    /// All phases in descriptor order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Success, Self::Failure];

    /// Suffix appended to `<PREFIX>_FETCH_`.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    /// Parse a suffix back into a phase.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.suffix() == suffix)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A validated resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    id: String,
    prefix: String,
    store_node: String,
}

impl Resource {
    /// Create a resource from a non-empty identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidArgument`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(FetchError::InvalidArgument("Must provide action identifier"));
        }

        Ok(Self {
            prefix: id.to_uppercase(),
            store_node: id.to_lowercase(),
            id,
        })
    }

    /// The identifier as supplied.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Uppercased identifier used for lifecycle type names.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lowercased identifier used as the state key.
    #[must_use]
    pub fn store_node(&self) -> &str {
        &self.store_node
    }

    /// `<PREFIX>_FETCH_<SUFFIX>` for the given phase.
    #[must_use]
    pub fn type_name(&self, lifecycle: Lifecycle) -> String {
        format!("{}{FETCH_INFIX}{}", self.prefix, lifecycle.suffix())
    }

    /// Resolve an action type string to one of this resource's phases.
    ///
    /// Returns `None` for types belonging to other resources or following
    /// some other convention.
    #[must_use]
    pub fn classify(&self, action_type: &str) -> Option<Lifecycle> {
        let suffix = action_type
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(FETCH_INFIX)?;
        Lifecycle::from_suffix(suffix)
    }

    /// Build the middleware call fetching this resource from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidArgument`] if `url` is empty.
    pub fn fetch_action(&self, url: impl Into<String>, options: FetchOptions) -> Result<ApiCall> {
        descriptor::build_for(self, url.into(), options)
    }

    /// The reducer owning this resource's state.
    #[must_use]
    pub fn reducer(&self) -> FetchReducer {
        FetchReducer::new(self.clone())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert!(matches!(
            Resource::new(""),
            Err(FetchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_prefix_and_store_node() {
        let resource = Resource::new("userProfile").unwrap();
        assert_eq!(resource.id(), "userProfile");
        assert_eq!(resource.prefix(), "USERPROFILE");
        assert_eq!(resource.store_node(), "userprofile");
    }

    #[test]
    fn test_type_names_in_order() {
        let resource = Resource::new("data").unwrap();
        let names: Vec<String> = Lifecycle::ALL
            .into_iter()
            .map(|phase| resource.type_name(phase))
            .collect();
        assert_eq!(
            names,
            ["DATA_FETCH_PENDING", "DATA_FETCH_SUCCESS", "DATA_FETCH_FAILURE"]
        );
    }

    #[test]
    fn test_classify_rejects_foreign_types() {
        let resource = Resource::new("data").unwrap();
        assert_eq!(resource.classify("DATA_FETCH_PENDING"), Some(Lifecycle::Pending));
        assert_eq!(resource.classify("OTHERDATA_FETCH_SUCCESS"), None);
        assert_eq!(resource.classify("DATA_FETCH_SUCCEEDED"), None);
        assert_eq!(resource.classify("DATA_FETCH"), None);
        assert_eq!(resource.classify("data_fetch_success"), None);
        assert_eq!(resource.classify(""), None);
    }

    #[test]
    fn test_classify_does_not_match_longer_prefix() {
        // "DATA_X" shares the "DATA" prefix but is a different resource.
        let resource = Resource::new("data").unwrap();
        assert_eq!(resource.classify("DATA_X_FETCH_SUCCESS"), None);
    }
}
