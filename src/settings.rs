use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::authz::{DescriptorSource, SentinelPaths};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub descriptor: DescriptorSettings,
    #[serde(default)]
    pub security: SecuritySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorSettings {
    /// Web application root; the descriptor fallback is resolved against it.
    pub base_dir: PathBuf,
    /// Descriptor location under `base_dir`. Default: WEB-INF/web.xml
    pub relative_path: PathBuf,
    /// Upper bound for fetching a descriptor, including remote URLs.
    pub fetch_timeout_secs: u64,
    /// Protected when the container manages deletes
    pub sentinel_delete: String,
    /// Protected when the container manages logins
    pub sentinel_login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Overrides which login configuration provider gets instantiated.
    pub login_configuration_provider: Option<String>,
    /// Overrides which authorization policy provider gets instantiated.
    pub policy_provider: Option<String>,
    /// Login configuration installed at bootstrap unless one already is.
    pub login_config: Option<String>,
    /// Security policy installed at bootstrap unless one is already set.
    pub policy: Option<String>,
    /// Keystore expected next to the policy file
    #[serde(default = "default_keystore_name")]
    pub keystore_name: String,
}

fn default_keystore_name() -> String {
    "keystore.jks".to_string()
}

impl Default for DescriptorSettings {
    fn default() -> Self {
        let sentinels = SentinelPaths::default();
        Self {
            base_dir: PathBuf::from("."),
            relative_path: PathBuf::from("WEB-INF/web.xml"),
            fetch_timeout_secs: 10,
            sentinel_delete: sentinels.delete,
            sentinel_login: sentinels.login,
        }
    }
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            login_configuration_provider: None,
            policy_provider: None,
            login_config: None,
            policy: None,
            keystore_name: default_keystore_name(),
        }
    }
}

impl DescriptorSettings {
    pub fn sentinels(&self) -> SentinelPaths {
        SentinelPaths {
            delete: self.sentinel_delete.clone(),
            login: self.sentinel_login.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let descriptor = DescriptorSettings::default();
        let mut builder = config::Config::builder()
            .set_default(
                "descriptor.base_dir",
                descriptor.base_dir.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default(
                "descriptor.relative_path",
                descriptor.relative_path.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default("descriptor.fetch_timeout_secs", descriptor.fetch_timeout_secs)
            .into_diagnostic()?
            .set_default("descriptor.sentinel_delete", descriptor.sentinel_delete)
            .into_diagnostic()?
            .set_default("descriptor.sentinel_login", descriptor.sentinel_login)
            .into_diagnostic()?
            .set_default("security.keystore_name", default_keystore_name())
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: WARDEN__SECURITY__POLICY_PROVIDER=..., etc.
        builder = builder.add_source(config::Environment::with_prefix("WARDEN").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        // Normalize the web application root to be relative to current dir
        if s.descriptor.base_dir.is_relative() {
            s.descriptor.base_dir = std::env::current_dir()
                .into_diagnostic()?
                .join(&s.descriptor.base_dir);
        }

        Ok(s)
    }

    /// Descriptor source for this configuration without a host resolver.
    pub fn descriptor_source(&self) -> DescriptorSource {
        DescriptorSource::new(&self.descriptor.base_dir)
            .with_relative_path(&self.descriptor.relative_path)
    }
}
