use kdl::KdlDocument;
use roxmltree::{Document, Node, ParsingOptions};

use crate::authz::errors::DescriptorError;
use crate::authz::types::*;

/// Parse descriptor text into constraint and role value objects.
///
/// Text whose first non-blank character is `<` is read as a `web.xml`
/// document, anything else as KDL. Blank input yields an empty descriptor.
pub fn parse_descriptor(source: &str) -> Result<ParsedDescriptor, DescriptorError> {
    let trimmed = source.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Ok(ParsedDescriptor::default());
    }
    if trimmed.starts_with('<') {
        parse_web_xml(trimmed)
    } else {
        parse_kdl_document(source)
    }
}

/// Parse a servlet deployment descriptor.
///
/// Elements are matched by local name so that J2EE, Java EE and Jakarta
/// namespaces (or none at all) are treated the same.
pub fn parse_web_xml(source: &str) -> Result<ParsedDescriptor, DescriptorError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(source, options)
        .map_err(|e| DescriptorError::Malformed(e.to_string()))?;

    let root = doc.root_element();
    if root.tag_name().name() != "web-app" {
        return Err(DescriptorError::Malformed(format!(
            "root element is `{}` (expected `web-app`)",
            root.tag_name().name()
        )));
    }

    let mut descriptor = ParsedDescriptor::default();

    for node in child_elements(root) {
        match node.tag_name().name() {
            "security-constraint" => {
                let patterns: Vec<UrlPattern> = child_elements(node)
                    .filter(|n| n.tag_name().name() == "web-resource-collection")
                    .flat_map(|c| texts_of(c, "url-pattern"))
                    .map(|p| UrlPattern::parse(&p))
                    .collect();

                let mut roles: Vec<Role> = Vec::new();
                for name in child_elements(node)
                    .filter(|n| n.tag_name().name() == "auth-constraint")
                    .flat_map(|c| texts_of(c, "role-name"))
                {
                    let role = Role::new(name);
                    if !roles.contains(&role) {
                        roles.push(role);
                    }
                }

                if patterns.is_empty() {
                    tracing::warn!("security-constraint without any url-pattern never matches a path");
                }

                descriptor.constraints.push(Constraint { patterns, roles });
            }
            "security-role" => {
                descriptor
                    .declared_roles
                    .extend(texts_of(node, "role-name").into_iter().map(Role::new));
            }
            _ => {}
        }
    }

    Ok(descriptor)
}

fn child_elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Trimmed, non-empty text of every direct child element called `name`.
fn texts_of(node: Node<'_, '_>, name: &str) -> Vec<String> {
    child_elements(node)
        .filter(|n| n.tag_name().name() == name)
        .map(|n| {
            n.descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a KDL descriptor:
///
/// ```kdl
/// constraint {
///     url-patterns {
///         - "/Delete.jsp"
///     }
///     roles {
///         - "Authenticated"
///     }
/// }
/// role "Admin"
/// ```
pub fn parse_kdl_document(source: &str) -> Result<ParsedDescriptor, DescriptorError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| DescriptorError::Malformed(format!("KDL parse error: {e}")))?;

    let mut descriptor = ParsedDescriptor::default();

    for node in doc.nodes() {
        match node.name().value() {
            "constraint" => {
                let mut patterns = Vec::new();
                let mut roles: Vec<Role> = Vec::new();

                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "url-patterns" => {
                                patterns = dash_list(child)
                                    .iter()
                                    .map(|p| UrlPattern::parse(p))
                                    .collect();
                            }
                            "roles" => {
                                roles.clear();
                                for name in dash_list(child) {
                                    let role = Role::new(name);
                                    if !roles.contains(&role) {
                                        roles.push(role);
                                    }
                                }
                            }
                            other => {
                                return Err(DescriptorError::Malformed(format!(
                                    "unexpected child `{other}` in constraint (expected `url-patterns` or `roles`)"
                                )));
                            }
                        }
                    }
                }

                descriptor.constraints.push(Constraint { patterns, roles });
            }
            "role" => {
                let name = first_string_arg(node).ok_or_else(|| {
                    DescriptorError::Malformed(
                        "role node requires a string argument (e.g. role \"Admin\")".into(),
                    )
                })?;
                descriptor.declared_roles.push(Role::new(name));
            }
            other => {
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(descriptor)
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &kdl::KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Extract dash-list children: nodes named "-" whose first argument is a string.
fn dash_list(node: &kdl::KdlNode) -> Vec<String> {
    let Some(children) = node.children() else {
        return Vec::new();
    };
    children
        .nodes()
        .iter()
        .filter(|n| n.name().value() == "-")
        .filter_map(first_string_arg)
        .collect()
}
