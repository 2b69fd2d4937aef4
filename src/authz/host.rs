//! Seams to the hosting web container.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::authz::types::Role;

/// Conventional location of the deployment descriptor inside a web application.
pub const DESCRIPTOR_RESOURCE: &str = "/WEB-INF/web.xml";

/// Where descriptor bytes can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorLocator {
    File(PathBuf),
    /// `file:`, `http:` or `https:` URL.
    Url(Url),
    /// Descriptor text handed over directly by the host.
    Inline(String),
}

impl std::fmt::Display for DescriptorLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorLocator::File(path) => write!(f, "{}", path.display()),
            DescriptorLocator::Url(url) => write!(f, "{url}"),
            DescriptorLocator::Inline(_) => f.write_str("<inline descriptor>"),
        }
    }
}

/// Host-side resource lookup, e.g. the servlet context's `getResource`.
pub trait ResourceResolver: Send + Sync {
    /// Locate a web-application resource by its context-relative path.
    fn resolve(&self, resource: &str) -> Option<DescriptorLocator>;
}

/// Per-request role membership as answered by the container.
pub trait ContainerRequest {
    fn is_user_in_role(&self, role: &str) -> bool;
}

/// Principals held by an already logged-in session.
pub trait PrincipalSet {
    fn has_principal(&self, role: &Role) -> bool;
}

/// How to find the descriptor: ask the host resolver first, then fall back to
/// `relative_path` under `base_dir`.
#[derive(Clone)]
pub struct DescriptorSource {
    resolver: Option<Arc<dyn ResourceResolver>>,
    base_dir: PathBuf,
    relative_path: PathBuf,
}

impl DescriptorSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver: None,
            base_dir: base_dir.into(),
            relative_path: PathBuf::from(DESCRIPTOR_RESOURCE.trim_start_matches('/')),
        }
    }

    /// A source that always yields the given locator.
    pub fn from_locator(locator: DescriptorLocator) -> Self {
        struct Fixed(DescriptorLocator);

        impl ResourceResolver for Fixed {
            fn resolve(&self, _resource: &str) -> Option<DescriptorLocator> {
                Some(self.0.clone())
            }
        }

        Self::new(".").with_resolver(Arc::new(Fixed(locator)))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<PathBuf>) -> Self {
        self.relative_path = relative_path.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the locator to read from, or `None` when neither the host nor
    /// the conventional path has a descriptor.
    pub fn locate(&self) -> Option<DescriptorLocator> {
        if let Some(resolver) = &self.resolver {
            if let Some(locator) = resolver.resolve(DESCRIPTOR_RESOURCE) {
                return Some(locator);
            }
        }

        let fallback = self.base_dir.join(&self.relative_path);
        fallback.is_file().then_some(DescriptorLocator::File(fallback))
    }
}

impl std::fmt::Debug for DescriptorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorSource")
            .field("resolver", &self.resolver.as_ref().map(|_| "<host>"))
            .field("base_dir", &self.base_dir)
            .field("relative_path", &self.relative_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoResource;

    impl ResourceResolver for NoResource {
        fn resolve(&self, _resource: &str) -> Option<DescriptorLocator> {
            None
        }
    }

    #[test]
    fn test_host_resolver_wins() {
        let source = DescriptorSource::from_locator(DescriptorLocator::Inline("<web-app/>".into()));
        assert_eq!(
            source.locate(),
            Some(DescriptorLocator::Inline("<web-app/>".into()))
        );
    }

    #[test]
    fn test_falls_back_to_conventional_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("WEB-INF")).unwrap();
        std::fs::write(dir.path().join("WEB-INF/web.xml"), "<web-app/>").unwrap();

        let source = DescriptorSource::new(dir.path()).with_resolver(Arc::new(NoResource));
        assert_eq!(
            source.locate(),
            Some(DescriptorLocator::File(dir.path().join("WEB-INF/web.xml")))
        );
    }

    #[test]
    fn test_nothing_to_locate() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(DescriptorSource::new(dir.path()).locate(), None);
    }
}
