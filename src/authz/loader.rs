use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::authz::descriptor::parse_descriptor;
use crate::authz::engine;
use crate::authz::errors::DescriptorError;
use crate::authz::host::{DescriptorLocator, DescriptorSource};
use crate::authz::types::*;
use crate::authz::{ConstraintIndex, SentinelPaths};

/// Locate, fetch and parse the descriptor, then compile it into an index.
pub async fn load_descriptor(
    source: &DescriptorSource,
    client: &reqwest::Client,
    timeout: Duration,
    cancel: &CancellationToken,
    sentinels: &SentinelPaths,
) -> Result<ConstraintIndex, DescriptorError> {
    let locator = source
        .locate()
        .ok_or_else(|| DescriptorError::unavailable("unable to find web.xml for processing"))?;

    tracing::info!(%locator, "Examining deployment descriptor");

    let text = fetch_descriptor(&locator, client, timeout, cancel).await?;
    let parsed = parse_descriptor(&text)?;
    let index = compile_descriptor(parsed, sentinels);

    tracing::info!(
        constraints = index.constraints.len(),
        roles = index.roles.len(),
        container_authorized = index.container_authorized,
        "Loaded deployment descriptor"
    );

    Ok(index)
}

/// Read the descriptor text behind `locator`, giving up after `timeout` or
/// when `cancel` fires. Both count as unavailable.
pub async fn fetch_descriptor(
    locator: &DescriptorLocator,
    client: &reqwest::Client,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String, DescriptorError> {
    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(DescriptorError::unavailable(format!("fetch of {locator} was cancelled")));
        }
        res = tokio::time::timeout(timeout, read_bytes(locator, client)) => match res {
            Ok(bytes) => bytes?,
            Err(elapsed) => {
                return Err(DescriptorError::unavailable_with(
                    format!("fetch of {locator} timed out after {timeout:?}"),
                    elapsed,
                ));
            }
        },
    };

    String::from_utf8(bytes)
        .map_err(|e| DescriptorError::Malformed(format!("descriptor is not valid UTF-8: {e}")))
}

async fn read_bytes(
    locator: &DescriptorLocator,
    client: &reqwest::Client,
) -> Result<Vec<u8>, DescriptorError> {
    match locator {
        DescriptorLocator::Inline(text) => Ok(text.clone().into_bytes()),
        DescriptorLocator::File(path) => tokio::fs::read(path).await.map_err(|source| {
            DescriptorError::unavailable_with(format!("cannot read {}", path.display()), source)
        }),
        DescriptorLocator::Url(url) => match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|_| {
                    DescriptorError::unavailable(format!("`{url}` is not a local file path"))
                })?;
                tokio::fs::read(&path).await.map_err(|source| {
                    DescriptorError::unavailable_with(format!("cannot read {}", path.display()), source)
                })
            }
            "http" | "https" => {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|source| {
                        DescriptorError::unavailable_with(format!("cannot fetch {url}"), source)
                    })?;
                let body = response.bytes().await.map_err(|source| {
                    DescriptorError::unavailable_with(format!("cannot read body of {url}"), source)
                })?;
                Ok(body.to_vec())
            }
            other => Err(DescriptorError::unavailable(format!(
                "unsupported descriptor URL scheme `{other}`"
            ))),
        },
    }
}

/// Compile parsed value objects into an immutable `ConstraintIndex`.
pub fn compile_descriptor(parsed: ParsedDescriptor, sentinels: &SentinelPaths) -> ConstraintIndex {
    let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
    let mut prefixes: HashMap<String, Vec<usize>> = HashMap::new();
    let mut extensions: HashMap<String, Vec<usize>> = HashMap::new();
    let mut catch_all: Vec<usize> = Vec::new();
    let mut context_root: Vec<usize> = Vec::new();
    let mut role_constraints: HashMap<String, Vec<usize>> = HashMap::new();
    let mut roles = RoleSet::new();

    for (id, constraint) in parsed.constraints.iter().enumerate() {
        for pattern in &constraint.patterns {
            let ids = match pattern {
                UrlPattern::Exact(path) => exact.entry(path.clone()).or_default(),
                UrlPattern::Prefix(prefix) if prefix.is_empty() => &mut catch_all,
                UrlPattern::Prefix(prefix) => prefixes.entry(prefix.clone()).or_default(),
                UrlPattern::Extension(ext) => extensions.entry(ext.clone()).or_default(),
                UrlPattern::Default => &mut catch_all,
                UrlPattern::ContextRoot => &mut context_root,
            };
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        for role in &constraint.roles {
            role_constraints
                .entry(role.name().to_string())
                .or_default()
                .push(id);
            roles.insert(role.clone());
        }
    }

    for role in parsed.declared_roles {
        roles.insert(role);
    }

    let mut index = ConstraintIndex {
        constraints: parsed.constraints,
        roles,
        exact,
        prefixes,
        extensions,
        catch_all,
        context_root,
        role_constraints,
        container_authorized: false,
    };

    index.container_authorized = engine::is_constrained(&index, &sentinels.delete, &Role::ALL)
        && engine::is_constrained(&index, &sentinels.login, &Role::ALL);

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(constraints: Vec<Constraint>, declared: &[&str]) -> ParsedDescriptor {
        ParsedDescriptor {
            constraints,
            declared_roles: declared.iter().map(|r| Role::new(*r)).collect(),
        }
    }

    fn constraint(pattern: &str, roles: &[&str]) -> Constraint {
        Constraint {
            patterns: vec![UrlPattern::parse(pattern)],
            roles: roles.iter().map(|r| Role::new(*r)).collect(),
        }
    }

    #[test]
    fn test_roles_are_union_without_duplicates() {
        let index = compile_descriptor(
            parsed(
                vec![
                    constraint("/a", &["Admin", "Editor"]),
                    constraint("/b", &["Editor"]),
                ],
                &["Guest", "Admin"],
            ),
            &SentinelPaths::default(),
        );
        let names: Vec<&str> = index.roles.iter().map(Role::name).collect();
        assert_eq!(names, vec!["Admin", "Editor", "Guest"]);
        assert_eq!(index.role_constraints["Editor"], vec![0, 1]);
    }

    #[test]
    fn test_container_authorized_requires_both_sentinels() {
        let only_delete = compile_descriptor(
            parsed(vec![constraint("/Delete.jsp", &["Authenticated"])], &[]),
            &SentinelPaths::default(),
        );
        assert!(!only_delete.container_authorized);

        let both = compile_descriptor(
            parsed(
                vec![
                    constraint("/Delete.jsp", &["Admin"]),
                    constraint("/Login.jsp", &[]),
                ],
                &[],
            ),
            &SentinelPaths::default(),
        );
        assert!(both.container_authorized);
    }

    #[test]
    fn test_custom_sentinels() {
        let sentinels = SentinelPaths {
            delete: "/remove".into(),
            login: "/signin".into(),
        };
        let index = compile_descriptor(parsed(vec![constraint("/*", &["User"])], &[]), &sentinels);
        assert!(index.container_authorized);
    }

    #[tokio::test]
    async fn test_fetch_inline_and_file() {
        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();
        let inline = DescriptorLocator::Inline("<web-app/>".into());
        let text = fetch_descriptor(&inline, &client, Duration::from_secs(1), &cancel)
            .await
            .unwrap();
        assert_eq!(text, "<web-app/>");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.xml");
        std::fs::write(&path, "role \"Admin\"").unwrap();
        let url = url::Url::from_file_path(&path).unwrap();
        let text = fetch_descriptor(&DescriptorLocator::Url(url), &client, Duration::from_secs(1), &cancel)
            .await
            .unwrap();
        assert_eq!(text, "role \"Admin\"");
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let err = fetch_descriptor(
            &DescriptorLocator::File("/nonexistent/WEB-INF/web.xml".into()),
            &reqwest::Client::new(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_is_unavailable() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fetch_descriptor(
            &DescriptorLocator::Inline("<web-app/>".into()),
            &reqwest::Client::new(),
            Duration::from_secs(1),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.xml");
        std::fs::write(&path, [0x3c, 0xff, 0xfe, 0x3e]).unwrap();
        let err = fetch_descriptor(
            &DescriptorLocator::File(path),
            &reqwest::Client::new(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_unavailable() {
        let url = url::Url::parse("ftp://example.com/web.xml").unwrap();
        let err = fetch_descriptor(
            &DescriptorLocator::Url(url),
            &reqwest::Client::new(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Unavailable { .. }));
    }
}
