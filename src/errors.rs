use miette::Diagnostic;
use thiserror::Error;

use crate::security::SecurityError;

/// Errors that abort [`bootstrap`](crate::bootstrap::bootstrap). Descriptor
/// problems are not among them: the resolver degrades instead.
#[derive(Debug, Error, Diagnostic)]
pub enum WardenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Security(#[from] SecurityError),

    #[error("HTTP client error: {0}")]
    #[diagnostic(code(warden::http))]
    Http(#[from] reqwest::Error),
}
