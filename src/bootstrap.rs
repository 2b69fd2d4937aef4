//! Process start-up: install the configured security providers, then load
//! the deployment descriptor.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::authz::{ConstraintResolver, DescriptorError, DescriptorSource};
use crate::errors::WardenError;
use crate::security::{ExecutionContext, GlobalSecurityState, ProviderRegistry, SecurityConfigurator};
use crate::settings::Settings;

/// Both halves of the engine, ready for request-time queries.
#[derive(Debug)]
pub struct SecurityEngine {
    pub configurator: SecurityConfigurator,
    pub resolver: Arc<ConstraintResolver>,
    /// Why the descriptor could not be used, if it could not. The resolver is
    /// running with an empty index in that case.
    pub descriptor_error: Option<DescriptorError>,
}

/// Install providers named in `settings` and initialize the resolver.
///
/// Provider failures abort start-up. Descriptor failures do not: the engine
/// comes up with nothing constrained and the host uses its own authorization.
pub async fn bootstrap(
    settings: &Settings,
    state: Arc<GlobalSecurityState>,
    registry: ProviderRegistry,
    source: &DescriptorSource,
    ctx: &ExecutionContext,
    cancel: &CancellationToken,
) -> Result<SecurityEngine, WardenError> {
    let configurator = SecurityConfigurator::new(state, registry, settings.security.clone());

    if let Some(login_config) = &settings.security.login_config {
        if configurator.is_auth_configured(ctx)? {
            tracing::info!("Login configuration already installed; leaving it alone");
        } else {
            configurator.set_auth_configuration(ctx, login_config)?;
        }
    }

    if let Some(policy) = &settings.security.policy {
        if configurator.is_policy_configured(ctx)?.is_none() {
            configurator.set_policy(ctx, policy)?;
        }
    }

    let client = reqwest::Client::builder()
        .timeout(settings.descriptor.fetch_timeout())
        .build()?;
    let resolver = ConstraintResolver::new()
        .with_sentinels(settings.descriptor.sentinels())
        .with_fetch_timeout(settings.descriptor.fetch_timeout())
        .with_http_client(client);

    let descriptor_error = resolver.initialize(source, cancel).await.err();

    tracing::info!(
        container_authorized = resolver.is_container_authorized(),
        degraded = descriptor_error.is_some(),
        "Authorizer initialized"
    );

    Ok(SecurityEngine {
        configurator,
        resolver: Arc::new(resolver),
        descriptor_error,
    })
}
