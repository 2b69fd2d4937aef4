pub mod capability;
pub mod configurator;
pub mod errors;
pub mod provider;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

pub use capability::{ExecutionContext, SecurityPermission};
pub use configurator::SecurityConfigurator;
pub use errors::SecurityError;
pub use provider::{AuthorizationPolicy, LoginConfiguration, ProviderRegistry};

/// Property naming the login configuration file.
pub const LOGIN_CONFIG_PROPERTY: &str = "security.auth.login.config";
/// Property naming the authorization policy file.
pub const POLICY_PROPERTY: &str = "security.policy";

/// Security state shared by everything in the process.
///
/// There is one of these per process and every holder of the `Arc` sees every
/// change. Writes are last-writer-wins: two components configuring different
/// providers will silently overwrite each other, so multi-application hosts
/// must configure the process once, up front. The locks only keep individual
/// reads and writes whole; no sequence of calls is atomic.
#[derive(Default)]
pub struct GlobalSecurityState {
    login_config: RwLock<Option<Arc<dyn LoginConfiguration>>>,
    policy: RwLock<Option<Arc<dyn AuthorizationPolicy>>>,
    properties: RwLock<HashMap<String, String>>,
}

impl GlobalSecurityState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// State whose properties are pre-set, as if passed on the command line.
    pub fn with_properties<I, K, V>(properties: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let state = Self::default();
        state.properties.write().extend(
            properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into())),
        );
        Arc::new(state)
    }

    pub fn login_configuration(&self) -> Option<Arc<dyn LoginConfiguration>> {
        self.login_config.read().clone()
    }

    pub fn policy(&self) -> Option<Arc<dyn AuthorizationPolicy>> {
        self.policy.read().clone()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.read().get(name).cloned()
    }

    pub(crate) fn install_login_configuration(&self, config: Option<Arc<dyn LoginConfiguration>>) {
        *self.login_config.write() = config;
    }

    pub(crate) fn install_policy(&self, policy: Option<Arc<dyn AuthorizationPolicy>>) {
        *self.policy.write() = policy;
    }

    pub(crate) fn set_property(&self, name: &str, value: impl Into<String>) {
        self.properties.write().insert(name.to_string(), value.into());
    }
}

impl std::fmt::Debug for GlobalSecurityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalSecurityState")
            .field("login_config", &*self.login_config.read())
            .field("policy", &*self.policy.read())
            .field("properties", &*self.properties.read())
            .finish()
    }
}
