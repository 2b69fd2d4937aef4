/// Builder for `web.xml` deployment descriptors
#[derive(Default)]
pub struct WebXmlBuilder {
    constraints: Vec<(Vec<String>, Vec<String>)>,
    roles: Vec<String>,
    namespace: Option<String>,
}

impl WebXmlBuilder {
    pub fn new() -> Self {
        Self {
            namespace: Some("http://java.sun.com/xml/ns/j2ee".to_string()),
            ..Default::default()
        }
    }

    pub fn without_namespace(mut self) -> Self {
        self.namespace = None;
        self
    }

    pub fn constraint(mut self, patterns: &[&str], roles: &[&str]) -> Self {
        self.constraints.push((
            patterns.iter().map(|p| p.to_string()).collect(),
            roles.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    pub fn role(mut self, name: &str) -> Self {
        self.roles.push(name.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        match &self.namespace {
            Some(ns) => xml.push_str(&format!("<web-app xmlns=\"{ns}\" version=\"2.4\">\n")),
            None => xml.push_str("<web-app>\n"),
        }

        for (patterns, roles) in &self.constraints {
            xml.push_str("  <security-constraint>\n    <web-resource-collection>\n");
            xml.push_str("      <web-resource-name>Protected</web-resource-name>\n");
            for p in patterns {
                xml.push_str(&format!("      <url-pattern>{p}</url-pattern>\n"));
            }
            xml.push_str("    </web-resource-collection>\n");
            if !roles.is_empty() {
                xml.push_str("    <auth-constraint>\n");
                for r in roles {
                    xml.push_str(&format!("      <role-name>{r}</role-name>\n"));
                }
                xml.push_str("    </auth-constraint>\n");
            }
            xml.push_str("  </security-constraint>\n");
        }

        for r in &self.roles {
            xml.push_str(&format!(
                "  <security-role>\n    <role-name>{r}</role-name>\n  </security-role>\n"
            ));
        }

        xml.push_str("</web-app>\n");
        xml
    }
}
