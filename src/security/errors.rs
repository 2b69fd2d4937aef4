use miette::Diagnostic;
use thiserror::Error;

use crate::security::capability::SecurityPermission;

/// Failures of the global security bootstrap. None of these are ever
/// swallowed: proceeding without the requested provider would silently
/// weaken the process's security.
#[derive(Debug, Error, Diagnostic)]
pub enum SecurityError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(warden::security::invalid_argument),
        help("Pass a non-empty `file:` URL or filesystem path")
    )]
    InvalidArgument(String),

    #[error("Permission denied: caller lacks `{0}`")]
    #[diagnostic(
        code(warden::security::permission_denied),
        help("Grant the permission to the calling execution context")
    )]
    PermissionDenied(SecurityPermission),

    #[error("Cannot install provider `{provider}`")]
    #[diagnostic(
        code(warden::security::configuration),
        help("Check that the provider is registered and that its configuration file is readable")
    )]
    ConfigurationError {
        provider: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
