//! Capability checks guarding reads and writes of the global security state.
//!
//! Every configurator entry point names the permissions it needs and calls
//! [`ExecutionContext::require`] before touching shared state.

use std::collections::HashSet;

use crate::security::errors::SecurityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityPermission {
    /// Read the installed login configuration.
    GetLoginConfiguration,
    /// Install or clear the login configuration.
    SetLoginConfiguration,
    /// Publish the `security.auth.login.config` property.
    WriteLoginConfigProperty,
    /// Read the `security.policy` property.
    ReadPolicyProperty,
    /// Publish the `security.policy` property.
    WritePolicyProperty,
    /// Install or clear the authorization policy.
    SetPolicy,
    /// Read provider overrides from the security settings.
    ReadSecurityProperty,
}

impl std::fmt::Display for SecurityPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SecurityPermission::GetLoginConfiguration => "getLoginConfiguration",
            SecurityPermission::SetLoginConfiguration => "setLoginConfiguration",
            SecurityPermission::WriteLoginConfigProperty => "write:security.auth.login.config",
            SecurityPermission::ReadPolicyProperty => "read:security.policy",
            SecurityPermission::WritePolicyProperty => "write:security.policy",
            SecurityPermission::SetPolicy => "setPolicy",
            SecurityPermission::ReadSecurityProperty => "read:security.provider",
        };
        f.write_str(name)
    }
}

/// The rights of whoever is calling into the configurator.
#[derive(Debug, Clone)]
pub enum ExecutionContext {
    /// No security manager: everything is allowed.
    Unrestricted,
    /// Only the listed permissions are granted.
    Restricted(HashSet<SecurityPermission>),
}

impl ExecutionContext {
    pub fn unrestricted() -> Self {
        ExecutionContext::Unrestricted
    }

    pub fn restricted(granted: impl IntoIterator<Item = SecurityPermission>) -> Self {
        ExecutionContext::Restricted(granted.into_iter().collect())
    }

    pub fn allows(&self, permission: SecurityPermission) -> bool {
        match self {
            ExecutionContext::Unrestricted => true,
            ExecutionContext::Restricted(granted) => granted.contains(&permission),
        }
    }

    pub fn require(&self, permission: SecurityPermission) -> Result<(), SecurityError> {
        if self.allows(permission) {
            Ok(())
        } else {
            tracing::debug!(%permission, "denied security permission");
            Err(SecurityError::PermissionDenied(permission))
        }
    }

    pub fn require_all(&self, permissions: &[SecurityPermission]) -> Result<(), SecurityError> {
        permissions.iter().try_for_each(|p| self.require(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_allows_everything() {
        let ctx = ExecutionContext::unrestricted();
        assert!(ctx.require(SecurityPermission::SetPolicy).is_ok());
        assert!(ctx.require(SecurityPermission::GetLoginConfiguration).is_ok());
    }

    #[test]
    fn test_restricted_denies_missing_permission() {
        let ctx = ExecutionContext::restricted([SecurityPermission::ReadPolicyProperty]);
        assert!(ctx.require(SecurityPermission::ReadPolicyProperty).is_ok());
        let err = ctx
            .require_all(&[
                SecurityPermission::ReadPolicyProperty,
                SecurityPermission::SetPolicy,
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::PermissionDenied(SecurityPermission::SetPolicy)
        ));
    }
}
