//! On-disk ruleset document

use focusgate_api::{EnforcementSnapshot, RuleDescriptor};
use focusgate_util::RulesetId;
use serde::{Deserialize, Serialize};

/// Current document format version
pub const RULES_DOCUMENT_VERSION: u32 = 1;

/// JSON document describing everything the enforcement layer should apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesDocument {
    pub version: u32,

    /// Rulesets currently enabled (empty or the baseline id)
    #[serde(default)]
    pub enabled_rulesets: Vec<RulesetId>,

    /// The baseline ruleset, written out so the consumer needs no other input
    pub baseline: BaselineRuleset,

    /// Dynamically installed rules
    #[serde(default)]
    pub dynamic_rules: Vec<RuleDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRuleset {
    pub id: RulesetId,
    #[serde(default)]
    pub rules: Vec<RuleDescriptor>,
}

impl RulesDocument {
    /// Empty document with the baseline ruleset disabled
    pub fn new(baseline: BaselineRuleset) -> Self {
        Self {
            version: RULES_DOCUMENT_VERSION,
            enabled_rulesets: Vec::new(),
            baseline,
            dynamic_rules: Vec::new(),
        }
    }

    pub fn baseline_enabled(&self) -> bool {
        self.enabled_rulesets.contains(&self.baseline.id)
    }

    pub fn snapshot(&self) -> EnforcementSnapshot {
        EnforcementSnapshot {
            baseline_enabled: self.baseline_enabled(),
            rules: self.dynamic_rules.clone(),
        }
    }

    /// Replace the enabled state and dynamic rules from a snapshot
    pub fn update_from(&mut self, snapshot: EnforcementSnapshot) {
        self.enabled_rulesets = if snapshot.baseline_enabled {
            vec![self.baseline.id.clone()]
        } else {
            Vec::new()
        };
        self.dynamic_rules = snapshot.rules;
    }
}
