//! Strongly-typed identifiers for focusgate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a redirect rule installed in the rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(u32);

impl RuleId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RuleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a statically declared ruleset (the baseline)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesetId(String);

impl RulesetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RulesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RulesetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RulesetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_ordering() {
        assert!(RuleId::new(1000) < RuleId::new(2000));
        assert_eq!(RuleId::from(1001).get(), 1001);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&RuleId::new(2003)).unwrap();
        assert_eq!(json, "2003");

        let parsed: RulesetId = serde_json::from_str("\"ruleset_1\"").unwrap();
        assert_eq!(parsed, RulesetId::new("ruleset_1"));
    }
}
