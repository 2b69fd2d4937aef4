use std::path::Path;
use std::sync::Arc;

use crate::security::capability::{ExecutionContext, SecurityPermission};
use crate::security::errors::SecurityError;
use crate::security::provider::{
    locator_path, ProviderRegistry, DEFAULT_LOGIN_CONFIG_PROVIDER, DEFAULT_POLICY_PROVIDER,
};
use crate::security::{GlobalSecurityState, LOGIN_CONFIG_PROPERTY, POLICY_PROPERTY};
use crate::settings::SecuritySettings;

/// Installs login configuration and authorization policy providers into the
/// process-wide [`GlobalSecurityState`].
///
/// Every setter affects the whole process, including components unrelated to
/// the caller. Re-setting is always allowed and overwrites.
#[derive(Debug, Clone)]
pub struct SecurityConfigurator {
    state: Arc<GlobalSecurityState>,
    registry: ProviderRegistry,
    settings: SecuritySettings,
}

impl SecurityConfigurator {
    pub fn new(
        state: Arc<GlobalSecurityState>,
        registry: ProviderRegistry,
        settings: SecuritySettings,
    ) -> Self {
        Self {
            state,
            registry,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<GlobalSecurityState> {
        &self.state
    }

    /// Whether a login configuration is installed.
    pub fn is_auth_configured(&self, ctx: &ExecutionContext) -> Result<bool, SecurityError> {
        ctx.require(SecurityPermission::GetLoginConfiguration)?;
        Ok(self.state.login_configuration().is_some())
    }

    /// The policy locator, when one has been set.
    ///
    /// Also checks that the policy file and its keystore exist next to each
    /// other. Missing files are only reported in the log, since some
    /// containers resolve these paths themselves.
    pub fn is_policy_configured(
        &self,
        ctx: &ExecutionContext,
    ) -> Result<Option<String>, SecurityError> {
        ctx.require(SecurityPermission::ReadPolicyProperty)?;
        let Some(policy) = self.state.property(POLICY_PROPERTY) else {
            return Ok(None);
        };

        tracing::info!(%policy, "Security policy already set; leaving it alone");
        self.check_policy_companions(&policy);
        Ok(Some(policy))
    }

    fn check_policy_companions(&self, policy: &str) {
        let policy_file = locator_path(policy);
        if !policy_file.exists() {
            tracing::warn!(
                path = %policy_file.display(),
                "Security policy file does not seem to exist; continuing, since this may be specific to the container"
            );
        }

        let dir = policy_file.parent().unwrap_or_else(|| Path::new("."));
        let keystore = dir.join(&self.settings.keystore_name);
        if keystore.is_file() && std::fs::File::open(&keystore).is_ok() {
            tracing::info!(
                keystore = %keystore.display(),
                "Found keystore next to the security policy; make sure it matches the distributed one after upgrades"
            );
        } else {
            tracing::warn!(
                keystore = %keystore.display(),
                "Could not locate the keystore in the same directory as the security policy; many containers need it there"
            );
        }
    }

    /// Install a login configuration read from `locator`.
    ///
    /// The previous configuration is cleared before the new provider is
    /// built, so a failure here leaves the process with none installed.
    pub fn set_auth_configuration(
        &self,
        ctx: &ExecutionContext,
        locator: &str,
    ) -> Result<(), SecurityError> {
        let locator = require_locator(locator, "login configuration")?;
        ctx.require_all(&[
            SecurityPermission::ReadSecurityProperty,
            SecurityPermission::SetLoginConfiguration,
            SecurityPermission::WriteLoginConfigProperty,
        ])?;

        let provider = self
            .settings
            .login_configuration_provider
            .as_deref()
            .unwrap_or(DEFAULT_LOGIN_CONFIG_PROVIDER);

        self.state.install_login_configuration(None);
        self.state.set_property(LOGIN_CONFIG_PROPERTY, locator);
        let config = self
            .registry
            .instantiate_login_config(provider, locator)
            .map_err(|source| SecurityError::ConfigurationError {
                provider: provider.to_string(),
                source,
            })?;
        self.state.install_login_configuration(Some(config));

        tracing::info!(%provider, %locator, "Installed login configuration");
        Ok(())
    }

    /// Install an authorization policy read from `locator`. Same failure
    /// behaviour as [`set_auth_configuration`](Self::set_auth_configuration).
    pub fn set_policy(&self, ctx: &ExecutionContext, locator: &str) -> Result<(), SecurityError> {
        let locator = require_locator(locator, "security policy")?;
        ctx.require_all(&[
            SecurityPermission::ReadSecurityProperty,
            SecurityPermission::SetPolicy,
            SecurityPermission::WritePolicyProperty,
        ])?;

        let provider = self
            .settings
            .policy_provider
            .as_deref()
            .unwrap_or(DEFAULT_POLICY_PROVIDER);

        self.state.install_policy(None);
        self.state.set_property(POLICY_PROPERTY, locator);
        let policy = self
            .registry
            .instantiate_policy(provider, locator)
            .map_err(|source| SecurityError::ConfigurationError {
                provider: provider.to_string(),
                source,
            })?;
        self.state.install_policy(Some(policy));

        tracing::info!(%provider, %locator, "Installed security policy");
        Ok(())
    }
}

fn require_locator<'a>(locator: &'a str, what: &str) -> Result<&'a str, SecurityError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(SecurityError::InvalidArgument(format!(
            "locator for {what} cannot be empty"
        )));
    }
    Ok(locator)
}
