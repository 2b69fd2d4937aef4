//! Warden - declarative access-control resolution engine
//!
//! Two independent parts:
//! - [`security`]: installs the process-wide login configuration and
//!   authorization policy providers. Failures always surface.
//! - [`authz`]: resolves from the deployment descriptor whether a path is
//!   constrained to a role and whether the container manages authorization.
//!   Descriptor failures degrade to "nothing constrained".
//!
//! [`bootstrap`] wires both from [`settings::Settings`].

pub mod authz;
pub mod bootstrap;
pub mod errors;
pub mod logging;
pub mod security;
pub mod settings;
