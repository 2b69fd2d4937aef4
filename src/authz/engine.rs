use std::collections::BTreeSet;

use crate::authz::types::Role;
use crate::authz::ConstraintIndex;

/// Positions of every constraint with a url-pattern matching `path`.
///
/// Only the lookup tables built at compile time are consulted, so the cost
/// grows with the number of matching constraints and the depth of `path`,
/// never with the size of the descriptor.
pub fn matching_constraints(index: &ConstraintIndex, path: &str) -> BTreeSet<usize> {
    let mut found: BTreeSet<usize> = index.catch_all.iter().copied().collect();

    if let Some(ids) = index.exact.get(path) {
        found.extend(ids);
    }

    if path == "/" {
        found.extend(&index.context_root);
    }

    // `/a/b/*` covers `/a/b` itself and anything below it
    let boundaries = path
        .match_indices('/')
        .map(|(i, _)| &path[..i])
        .filter(|p| !p.is_empty())
        .chain(std::iter::once(path));
    for prefix in boundaries {
        if let Some(ids) = index.prefixes.get(prefix) {
            found.extend(ids);
        }
    }

    // `*.gz` and `*.tar.gz` both cover `/dist/app.tar.gz`
    let last = path.rsplit('/').next().unwrap_or(path);
    for (dot, _) in last.match_indices('.') {
        if let Some(ids) = index.extensions.get(&last[dot + 1..]) {
            found.extend(ids);
        }
    }

    found
}

/// Is `path` protected for `role`?
///
/// A path is constrained to a role only when one and the same constraint both
/// matches the path and requires the role. `Role::ALL` is satisfied by any
/// constraint on the path.
pub fn is_constrained(index: &ConstraintIndex, path: &str, role: &Role) -> bool {
    // 1. Constraints covering the path
    let by_path = matching_constraints(index, path);
    if by_path.is_empty() {
        return false;
    }

    // 2. Shortcut for the wildcard role
    if *role == Role::ALL {
        return true;
    }

    // 3. Constraints requiring the role
    let Some(by_role) = index.role_constraints.get(role.name()) else {
        return false;
    };

    // 4. Same constraint in both sets
    by_role.iter().any(|id| by_path.contains(id))
}
