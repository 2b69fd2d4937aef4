pub mod descriptor;
pub mod engine;
pub mod errors;
pub mod host;
pub mod loader;
pub mod resolver;
pub mod types;

use std::collections::HashMap;

pub use errors::DescriptorError;
pub use host::{ContainerRequest, DescriptorLocator, DescriptorSource, PrincipalSet, ResourceResolver};
pub use resolver::ConstraintResolver;
pub use types::{Constraint, Role, RoleSet, UrlPattern};

/// Fully compiled constraint state for one descriptor load.
/// Immutable after construction; a reload builds and publishes a new one.
#[derive(Debug, Default)]
pub struct ConstraintIndex {
    /// Constraints in document order. A constraint's identity is its position.
    pub constraints: Vec<Constraint>,
    /// Constraint roles followed by declared roles, deduplicated.
    pub roles: RoleSet,
    /// exact url-pattern -> constraint positions
    pub exact: HashMap<String, Vec<usize>>,
    /// `/x/*` prefix (without the `/*`) -> constraint positions
    pub prefixes: HashMap<String, Vec<usize>>,
    /// `*.ext` extension (without the `*.`) -> constraint positions
    pub extensions: HashMap<String, Vec<usize>>,
    /// `/` and `/*`: match every path
    pub catch_all: Vec<usize>,
    /// empty pattern: matches `/` only
    pub context_root: Vec<usize>,
    /// role name -> positions of constraints requiring it (pre-computed)
    pub role_constraints: HashMap<String, Vec<usize>>,
    /// Cached result of probing the sentinel paths under `Role::ALL`.
    pub container_authorized: bool,
}

impl ConstraintIndex {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The two paths whose protection signals that the container manages
/// authentication for the whole application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelPaths {
    pub delete: String,
    pub login: String,
}

impl Default for SentinelPaths {
    fn default() -> Self {
        Self {
            delete: "/Delete.jsp".to_string(),
            login: "/Login.jsp".to_string(),
        }
    }
}
