use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

use crate::authz::engine;
use crate::authz::errors::DescriptorError;
use crate::authz::host::{ContainerRequest, DescriptorSource, PrincipalSet};
use crate::authz::loader::load_descriptor;
use crate::authz::types::Role;
use crate::authz::{ConstraintIndex, SentinelPaths};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers "is this path protected for this role" from the deployment
/// descriptor, and whether the container manages authorization at all.
///
/// Queries read the currently published [`ConstraintIndex`]; `initialize`
/// builds a complete replacement and swaps it in, so concurrent readers never
/// observe a half-built index.
pub struct ConstraintResolver {
    index: ArcSwap<ConstraintIndex>,
    sentinels: SentinelPaths,
    fetch_timeout: Duration,
    client: reqwest::Client,
}

impl Default for ConstraintResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintResolver {
    pub fn new() -> Self {
        Self {
            index: ArcSwap::from_pointee(ConstraintIndex::empty()),
            sentinels: SentinelPaths::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_sentinels(mut self, sentinels: SentinelPaths) -> Self {
        self.sentinels = sentinels;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn sentinels(&self) -> &SentinelPaths {
        &self.sentinels
    }

    /// Load the descriptor and publish a fresh index.
    ///
    /// On failure an empty index is published instead, so every path reports
    /// unconstrained and the host falls back to its own authorization. The
    /// error is still returned for the caller to inspect.
    pub async fn initialize(
        &self,
        source: &DescriptorSource,
        cancel: &CancellationToken,
    ) -> Result<(), DescriptorError> {
        let loaded = load_descriptor(
            source,
            &self.client,
            self.fetch_timeout,
            cancel,
            &self.sentinels,
        )
        .await;

        match loaded {
            Ok(index) => {
                report(&index);
                self.index.store(Arc::new(index));
                Ok(())
            }
            Err(err) => {
                match &err {
                    DescriptorError::Unavailable { .. } => {
                        tracing::info!(error = %err, "No usable deployment descriptor; using custom authentication")
                    }
                    DescriptorError::Malformed(_) => {
                        tracing::warn!(error = %err, "Malformed deployment descriptor; using custom authentication")
                    }
                }
                self.index.store(Arc::new(ConstraintIndex::empty()));
                Err(err)
            }
        }
    }

    pub fn is_constrained(&self, path: &str, role: &Role) -> bool {
        engine::is_constrained(&self.index.load(), path, role)
    }

    /// Case-sensitive lookup among the roles the descriptor knows about.
    pub fn find_role(&self, name: &str) -> Option<Role> {
        self.index.load().roles.get(name).cloned()
    }

    /// Snapshot of the known roles in discovery order.
    pub fn roles(&self) -> Vec<Role> {
        self.index.load().roles.iter().cloned().collect()
    }

    /// Whether both sentinel paths were protected when the descriptor was
    /// last loaded.
    pub fn is_container_authorized(&self) -> bool {
        self.index.load().container_authorized
    }

    /// Delegate role membership to the container's view of the request.
    pub fn is_user_in_role_request(&self, request: &dyn ContainerRequest, role: &Role) -> bool {
        request.is_user_in_role(role.name())
    }

    /// Role membership for an already authenticated session. Login modules
    /// are expected to have copied the container roles into the session.
    pub fn is_user_in_role(&self, session: Option<&dyn PrincipalSet>, role: Option<&Role>) -> bool {
        match (session, role) {
            (Some(session), Some(role)) => session.has_principal(role),
            _ => false,
        }
    }

    /// The currently published index.
    pub fn snapshot(&self) -> Arc<ConstraintIndex> {
        self.index.load_full()
    }
}

fn report(index: &ConstraintIndex) {
    if index.container_authorized {
        tracing::info!("Using container-managed authentication");
    } else {
        tracing::info!("Using custom authentication");
    }

    if !index.roles.is_empty() {
        let roles: Vec<&str> = index.roles.iter().map(Role::name).collect();
        tracing::info!(roles = %roles.join(" "), "Web container manages these roles");
    }
}

impl std::fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.index.load();
        f.debug_struct("ConstraintResolver")
            .field("constraints", &index.constraints.len())
            .field("roles", &index.roles.len())
            .field("container_authorized", &index.container_authorized)
            .field("sentinels", &self.sentinels)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
