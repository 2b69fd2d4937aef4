use miette::Diagnostic;
use thiserror::Error;

/// Failures while loading the deployment descriptor.
///
/// Neither variant is fatal to the process: the resolver publishes an empty
/// index and every path reports unconstrained until the next successful load.
#[derive(Debug, Error, Diagnostic)]
pub enum DescriptorError {
    #[error("Deployment descriptor unavailable: {reason}")]
    #[diagnostic(
        code(warden::authz::descriptor_unavailable),
        help("Place the descriptor at WEB-INF/web.xml under the configured base directory, or let the host resolver supply it")
    )]
    Unavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed deployment descriptor: {0}")]
    #[diagnostic(
        code(warden::authz::malformed_descriptor),
        help("The descriptor must be a `web-app` XML document or a KDL document of `constraint` and `role` nodes")
    )]
    Malformed(String),
}

impl DescriptorError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        DescriptorError::Unavailable {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn unavailable_with<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DescriptorError::Unavailable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}
