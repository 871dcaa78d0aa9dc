//! Custom blocked-domain list

use serde::{Deserialize, Serialize};

/// Ordered list of user-supplied domains. A domain's position determines
/// the ids of the rules compiled for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainList(Vec<String>);

impl DomainList {
    pub fn new(domains: Vec<String>) -> Self {
        Self(domains)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        let wanted = normalize_domain(domain);
        self.0.iter().any(|d| normalize_domain(d) == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for DomainList {
    fn from(domains: Vec<String>) -> Self {
        Self(domains)
    }
}

impl<const N: usize> From<[&str; N]> for DomainList {
    fn from(domains: [&str; N]) -> Self {
        Self(domains.iter().map(|d| d.to_string()).collect())
    }
}

/// Reduce user input to a bare lower-case host name.
///
/// Accepts `example.com`, `WWW.Example.com`, `https://example.com/path` or
/// `example.com:8080`. Returns an empty string for blank input.
pub fn normalize_domain(input: &str) -> String {
    let mut host = input.trim();

    if let Some((_, rest)) = host.split_once("://") {
        host = rest;
    }
    if let Some(end) = host.find(['/', '?', '#']) {
        host = &host[..end];
    }
    if let Some((name, _port)) = host.rsplit_once(':') {
        host = name;
    }

    host.trim_end_matches('.').to_lowercase()
}

/// Whether a normalized host can be turned into a url filter.
///
/// Dot-separated labels, each non-empty and made of letters, digits, `-`
/// or `_`. Blank input is not a host.
pub fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_decoration() {
        assert_eq!(normalize_domain("Example.COM"), "example.com");
        assert_eq!(normalize_domain("  www.a.com  "), "www.a.com");
        assert_eq!(normalize_domain("https://shop.example.com/cart?x=1"), "shop.example.com");
        assert_eq!(normalize_domain("a.com:8080"), "a.com");
        assert_eq!(normalize_domain("a.com."), "a.com");
        assert_eq!(normalize_domain("   "), "");
    }

    #[test]
    fn host_validity() {
        assert!(is_valid_host("a.com"));
        assert!(is_valid_host("www.shop-1.example"));
        assert!(is_valid_host("localhost"));

        assert!(!is_valid_host(""));
        assert!(!is_valid_host("bad domain.com"));
        assert!(!is_valid_host("a..com"));
        assert!(!is_valid_host(".a.com"));
        assert!(!is_valid_host("*.a.com"));
        assert!(!is_valid_host("a.com\t"));
    }

    #[test]
    fn contains_compares_normalized() {
        let list = DomainList::from(["a.com", "WWW.b.com"]);
        assert!(list.contains("A.com"));
        assert!(list.contains("https://www.b.com/"));
        assert!(!list.contains("b.com"));
        assert_eq!(list.len(), 2);
    }
}
