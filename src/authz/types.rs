use std::borrow::Cow;
use std::collections::HashSet;

/// A named permission group, e.g. `Admin` or `Authenticated`.
///
/// Names are case-sensitive; equality and hashing are by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    name: Cow<'static, str>,
}

impl Role {
    /// Wildcard: any constraint declared on a path satisfies it.
    pub const ALL: Role = Role {
        name: Cow::Borrowed("All"),
    };

    /// Any logged-in identity.
    ///
    /// The name is `Authenticated`. Matching is case-sensitive, so a
    /// descriptor that spells it `AUTHENTICATED` declares an unrelated role:
    /// `find_role("AUTHENTICATED")` finds it, but it never equals this
    /// constant.
    pub const AUTHENTICATED: Role = Role {
        name: Cow::Borrowed("Authenticated"),
    };

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Insertion-ordered set of roles.
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    ordered: Vec<Role>,
    seen: HashSet<Role>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the role was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        if self.seen.contains(&role) {
            return false;
        }
        self.seen.insert(role.clone());
        self.ordered.push(role);
        true
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.seen.contains(role)
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.ordered.iter().find(|r| r.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

/// Container-style URL pattern from a `url-pattern` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrlPattern {
    /// `/Delete.jsp` - that path only.
    Exact(String),
    /// `/admin/*` - `/admin` itself and everything below it. `/*` is stored as
    /// an empty prefix and matches every path.
    Prefix(String),
    /// `*.jsp` - any path whose last segment ends in `.jsp`.
    Extension(String),
    /// `/` - the default mapping, matches every path.
    Default,
    /// The empty pattern - the context root `/` only.
    ContextRoot,
}

impl UrlPattern {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return UrlPattern::ContextRoot;
        }
        if raw == "/" {
            return UrlPattern::Default;
        }
        if let Some(prefix) = raw.strip_suffix("/*") {
            if prefix.is_empty() || prefix.starts_with('/') {
                return UrlPattern::Prefix(prefix.to_string());
            }
        }
        if let Some(ext) = raw.strip_prefix("*.") {
            if !ext.is_empty() && !ext.contains('/') {
                return UrlPattern::Extension(ext.to_string());
            }
        }
        UrlPattern::Exact(raw.to_string())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            UrlPattern::Exact(p) => p == path,
            UrlPattern::Prefix(p) => {
                p.is_empty()
                    || path == p
                    || path
                        .strip_prefix(p.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            UrlPattern::Extension(ext) => {
                let last = path.rsplit('/').next().unwrap_or(path);
                last.strip_suffix(ext.as_str())
                    .is_some_and(|stem| stem.ends_with('.'))
            }
            UrlPattern::Default => true,
            UrlPattern::ContextRoot => path == "/",
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlPattern::Exact(p) => f.write_str(p),
            UrlPattern::Prefix(p) => write!(f, "{p}/*"),
            UrlPattern::Extension(ext) => write!(f, "*.{ext}"),
            UrlPattern::Default => f.write_str("/"),
            UrlPattern::ContextRoot => Ok(()),
        }
    }
}

/// One `security-constraint` declaration.
///
/// An empty `roles` set means no role restriction was declared, which is not
/// the same thing as [`Role::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub patterns: Vec<UrlPattern>,
    pub roles: Vec<Role>,
}

impl Constraint {
    pub fn matches_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn requires(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

/// Intermediate result of parsing one descriptor document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDescriptor {
    pub constraints: Vec<Constraint>,
    /// Names from `security-role` entries, independent of any constraint.
    pub declared_roles: Vec<Role>,
}
