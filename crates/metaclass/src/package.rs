/// Root of the namespace generated proxies live under.
pub const PROXY_PACKAGE: &[&str] = &["org", "jace", "proxy"];

/// Root of the namespace generated peers live under.
pub const PEER_PACKAGE: &[&str] = &["org", "jace", "peer"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ClassPackage {
    components: Vec<String>,
}

impl ClassPackage {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) const fn empty() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Joins the components, e.g. `to_name("::", true)` gives `java::lang::`.
    pub fn to_name(&self, separator: &str, trailing_separator: bool) -> String {
        let mut name = self.components.join(separator);
        if trailing_separator && !self.components.is_empty() {
            name.push_str(separator);
        }
        name
    }

    pub fn is_proxied(&self) -> bool {
        self.starts_with(PROXY_PACKAGE)
    }

    pub(crate) fn starts_with(&self, root: &[&str]) -> bool {
        self.components.len() >= root.len()
            && self.components.iter().zip(root).all(|(a, b)| a == b)
    }

    pub(crate) fn prepend(&self, root: &[&str]) -> Self {
        Self {
            components: root
                .iter()
                .map(|s| s.to_string())
                .chain(self.components.iter().cloned())
                .collect(),
        }
    }

    pub(crate) fn strip_root(&self, root: &[&str]) -> Option<Self> {
        if !self.starts_with(root) {
            return None;
        }

        Some(Self {
            components: self.components[root.len()..].to_vec(),
        })
    }
}

impl std::fmt::Display for ClassPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_name(".", false))
    }
}
