//! Pluggable login-configuration and authorization-policy providers.
//!
//! Providers are looked up by name in a [`ProviderRegistry`] and built from
//! the locator of their configuration file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

/// Built-in login configuration backed by a file.
pub const DEFAULT_LOGIN_CONFIG_PROVIDER: &str = "file-login-config";
/// Built-in authorization policy backed by a file.
pub const DEFAULT_POLICY_PROVIDER: &str = "file-policy";

pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// An installed authentication configuration.
pub trait LoginConfiguration: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> &str;
    fn locator(&self) -> &str;
}

/// An installed authorization policy.
pub trait AuthorizationPolicy: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> &str;
    fn locator(&self) -> &str;
}

pub type LoginConfigFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn LoginConfiguration>, ProviderError> + Send + Sync>;
pub type PolicyFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn AuthorizationPolicy>, ProviderError> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
#[error("no {kind} provider registered under `{name}`")]
pub struct UnknownProvider {
    pub kind: &'static str,
    pub name: String,
}

/// Name -> factory tables for both provider kinds.
#[derive(Clone)]
pub struct ProviderRegistry {
    login_configs: HashMap<String, LoginConfigFactory>,
    policies: HashMap<String, PolicyFactory>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProviderRegistry {
    /// An empty registry; nothing can be instantiated until registered.
    pub fn empty() -> Self {
        Self {
            login_configs: HashMap::new(),
            policies: HashMap::new(),
        }
    }

    /// Registry holding the two built-in file providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_login_config(DEFAULT_LOGIN_CONFIG_PROVIDER, |locator| {
            Ok(Arc::new(FileLoginConfiguration::load(locator)?) as Arc<dyn LoginConfiguration>)
        });
        registry.register_policy(DEFAULT_POLICY_PROVIDER, |locator| {
            Ok(Arc::new(FilePolicy::load(locator)?) as Arc<dyn AuthorizationPolicy>)
        });
        registry
    }

    pub fn register_login_config<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str) -> Result<Arc<dyn LoginConfiguration>, ProviderError> + Send + Sync + 'static,
    {
        self.login_configs.insert(name.into(), Arc::new(factory));
    }

    pub fn register_policy<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str) -> Result<Arc<dyn AuthorizationPolicy>, ProviderError> + Send + Sync + 'static,
    {
        self.policies.insert(name.into(), Arc::new(factory));
    }

    pub fn instantiate_login_config(
        &self,
        name: &str,
        locator: &str,
    ) -> Result<Arc<dyn LoginConfiguration>, ProviderError> {
        let factory = self.login_configs.get(name).ok_or_else(|| UnknownProvider {
            kind: "login configuration",
            name: name.to_string(),
        })?;
        factory(locator)
    }

    pub fn instantiate_policy(
        &self,
        name: &str,
        locator: &str,
    ) -> Result<Arc<dyn AuthorizationPolicy>, ProviderError> {
        let factory = self.policies.get(name).ok_or_else(|| UnknownProvider {
            kind: "authorization policy",
            name: name.to_string(),
        })?;
        factory(locator)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut login: Vec<&String> = self.login_configs.keys().collect();
        let mut policy: Vec<&String> = self.policies.keys().collect();
        login.sort();
        policy.sort();
        f.debug_struct("ProviderRegistry")
            .field("login_configs", &login)
            .field("policies", &policy)
            .finish()
    }
}

/// Turn a `file:` URL or plain path into a filesystem path.
pub fn locator_path(locator: &str) -> PathBuf {
    if let Ok(url) = Url::parse(locator) {
        if url.scheme() == "file" {
            if let Ok(path) = url.to_file_path() {
                return path;
            }
        }
    }
    PathBuf::from(locator.strip_prefix("file:").unwrap_or(locator))
}

/// Login configuration read from a file. The file must exist and be readable;
/// its contents are kept for the login modules that interpret them.
#[derive(Debug, Clone)]
pub struct FileLoginConfiguration {
    locator: String,
    pub contents: String,
}

impl FileLoginConfiguration {
    pub fn load(locator: &str) -> Result<Self, std::io::Error> {
        let contents = std::fs::read_to_string(locator_path(locator))?;
        Ok(Self {
            locator: locator.to_string(),
            contents,
        })
    }
}

impl LoginConfiguration for FileLoginConfiguration {
    fn provider(&self) -> &str {
        DEFAULT_LOGIN_CONFIG_PROVIDER
    }

    fn locator(&self) -> &str {
        &self.locator
    }
}

/// Authorization policy read from a file.
#[derive(Debug, Clone)]
pub struct FilePolicy {
    locator: String,
    pub contents: String,
}

impl FilePolicy {
    pub fn load(locator: &str) -> Result<Self, std::io::Error> {
        let contents = std::fs::read_to_string(locator_path(locator))?;
        Ok(Self {
            locator: locator.to_string(),
            contents,
        })
    }
}

impl AuthorizationPolicy for FilePolicy {
    fn provider(&self) -> &str {
        DEFAULT_POLICY_PROVIDER
    }

    fn locator(&self) -> &str {
        &self.locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_path_forms() {
        assert_eq!(locator_path("/etc/app/login.conf"), PathBuf::from("/etc/app/login.conf"));
        assert_eq!(locator_path("file:/etc/app/login.conf"), PathBuf::from("/etc/app/login.conf"));
        assert_eq!(
            locator_path("file:///etc/app/app.policy"),
            PathBuf::from("/etc/app/app.policy")
        );
        assert_eq!(locator_path("relative/app.policy"), PathBuf::from("relative/app.policy"));
    }

    #[test]
    fn test_default_providers_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login.conf");
        std::fs::write(&path, "Wiki { LoginModule required; };").unwrap();
        let locator = path.to_str().unwrap();

        let registry = ProviderRegistry::with_defaults();
        let config = registry
            .instantiate_login_config(DEFAULT_LOGIN_CONFIG_PROVIDER, locator)
            .unwrap();
        assert_eq!(config.provider(), DEFAULT_LOGIN_CONFIG_PROVIDER);
        assert_eq!(config.locator(), locator);

        assert!(registry
            .instantiate_policy(DEFAULT_POLICY_PROVIDER, "/nonexistent/app.policy")
            .is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::empty();
        let err = registry
            .instantiate_policy("com.example.MissingPolicy", "/tmp/x.policy")
            .unwrap_err();
        assert!(err.to_string().contains("com.example.MissingPolicy"));
    }

    #[test]
    fn test_custom_provider() {
        #[derive(Debug)]
        struct Static(String);

        impl AuthorizationPolicy for Static {
            fn provider(&self) -> &str {
                "static"
            }
            fn locator(&self) -> &str {
                &self.0
            }
        }

        let mut registry = ProviderRegistry::empty();
        registry.register_policy("static", |locator| {
            Ok(Arc::new(Static(locator.to_string())) as Arc<dyn AuthorizationPolicy>)
        });
        let policy = registry.instantiate_policy("static", "mem://policy").unwrap();
        assert_eq!(policy.locator(), "mem://policy");
    }
}
