//! Redirect rules, enforcement snapshots and reconcile plans

use focusgate_util::RuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// First id of the baseline band. Baseline ids stay below the custom bands.
pub const BASELINE_RULE_BASE: u32 = 1;

/// Number of ids available to each custom band
pub const CUSTOM_RULE_CAPACITY: u32 = 1000;

/// First id of the custom band holding wildcard-subdomain (or verbatim `www.`) rules
pub const CUSTOM_RULE_BASE_A: u32 = 1000;

/// First id of the custom band holding `www.`-stripped rules
pub const CUSTOM_RULE_BASE_B: u32 = CUSTOM_RULE_BASE_A + CUSTOM_RULE_CAPACITY;

/// Maximum baseline domains; each one takes two ids below `CUSTOM_RULE_BASE_A`
pub const MAX_BASELINE_DOMAINS: usize = ((CUSTOM_RULE_BASE_A - BASELINE_RULE_BASE) / 2) as usize;

/// Whether `id` falls in the band reserved for compiled custom-domain rules
pub fn is_custom_rule_id(id: RuleId) -> bool {
    (CUSTOM_RULE_BASE_A..CUSTOM_RULE_BASE_B + CUSTOM_RULE_CAPACITY).contains(&id.get())
}

/// Kind of request a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Top-level navigation
    MainFrame,
}

/// What happens to a matching request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    Redirect { target: String },
}

/// Request matching condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// URL filter such as `*://*.example.com/*`
    pub url_filter: String,
    pub resource_types: BTreeSet<ResourceType>,
}

/// A single declarative redirect rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub id: RuleId,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl RuleDescriptor {
    /// Redirect top-level navigations matching `url_filter` to `target`
    pub fn redirect_main_frame(
        id: RuleId,
        url_filter: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id,
            priority: 1,
            action: RuleAction::Redirect {
                target: target.into(),
            },
            condition: RuleCondition {
                url_filter: url_filter.into(),
                resource_types: BTreeSet::from([ResourceType::MainFrame]),
            },
        }
    }

    pub fn url_filter(&self) -> &str {
        &self.condition.url_filter
    }
}

/// What the rule engine currently has installed, read fresh every pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementSnapshot {
    /// Whether the baseline ruleset is enabled
    pub baseline_enabled: bool,

    /// Dynamically installed rules, in no particular order
    pub rules: Vec<RuleDescriptor>,
}

impl EnforcementSnapshot {
    pub fn rule(&self, id: RuleId) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rule_ids(&self) -> BTreeSet<RuleId> {
        self.rules.iter().map(|r| r.id).collect()
    }
}

/// Output of schedule evaluation and domain compilation for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub should_block: bool,
    pub custom_rules: Vec<RuleDescriptor>,
}

impl DesiredState {
    /// Desired state outside blocking windows (and on any evaluation failure)
    pub fn unblocked() -> Self {
        Self::default()
    }

    pub fn blocking(custom_rules: Vec<RuleDescriptor>) -> Self {
        Self {
            should_block: true,
            custom_rules,
        }
    }
}

/// A primitive rule engine operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReconcileOp {
    DisableBaseline,
    EnableBaseline,
    RemoveRules { ids: Vec<RuleId> },
    AddRules { rules: Vec<RuleDescriptor> },
}

impl fmt::Display for ReconcileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOp::DisableBaseline => write!(f, "disable baseline"),
            ReconcileOp::EnableBaseline => write!(f, "enable baseline"),
            ReconcileOp::RemoveRules { ids } => write!(f, "remove {} rule(s)", ids.len()),
            ReconcileOp::AddRules { rules } => write!(f, "add {} rule(s)", rules.len()),
        }
    }
}

/// Ordered list of operations converging the engine to a desired state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconcilePlan {
    pub ops: Vec<ReconcileOp>,
}

impl ReconcilePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: ReconcileOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReconcileOp> {
        self.ops.iter()
    }
}

impl<'a> IntoIterator for &'a ReconcilePlan {
    type Item = &'a ReconcileOp;
    type IntoIter = std::slice::Iter<'a, ReconcileOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_descriptor_serialization() {
        let rule = RuleDescriptor::redirect_main_frame(
            RuleId::new(1000),
            "*://*.example.com/*",
            "/block.html",
        );

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["id"], 1000);
        assert_eq!(json["priority"], 1);
        assert_eq!(json["action"]["type"], "redirect");
        assert_eq!(json["action"]["target"], "/block.html");
        assert_eq!(json["condition"]["resource_types"][0], "main_frame");

        let parsed: RuleDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn snapshot_lookup_by_id() {
        let snapshot = EnforcementSnapshot {
            baseline_enabled: true,
            rules: vec![
                RuleDescriptor::redirect_main_frame(RuleId::new(2000), "*://a.com/*", "/b"),
                RuleDescriptor::redirect_main_frame(RuleId::new(1000), "*://*.a.com/*", "/b"),
            ],
        };

        assert_eq!(snapshot.rule(RuleId::new(2000)).unwrap().url_filter(), "*://a.com/*");
        assert!(snapshot.rule(RuleId::new(3)).is_none());
        assert_eq!(
            snapshot.rule_ids().into_iter().collect::<Vec<_>>(),
            vec![RuleId::new(1000), RuleId::new(2000)]
        );
    }

    #[test]
    fn id_bands_are_disjoint() {
        assert!(!is_custom_rule_id(RuleId::new(999)));
        assert!(is_custom_rule_id(RuleId::new(CUSTOM_RULE_BASE_A)));
        assert!(is_custom_rule_id(RuleId::new(CUSTOM_RULE_BASE_B + CUSTOM_RULE_CAPACITY - 1)));
        assert!(!is_custom_rule_id(RuleId::new(CUSTOM_RULE_BASE_B + CUSTOM_RULE_CAPACITY)));

        let last_baseline = BASELINE_RULE_BASE + 2 * MAX_BASELINE_DOMAINS as u32 - 1;
        assert!(last_baseline < CUSTOM_RULE_BASE_A);
    }

    #[test]
    fn plan_op_display() {
        let op = ReconcileOp::RemoveRules {
            ids: vec![RuleId::new(1), RuleId::new(2)],
        };
        assert_eq!(op.to_string(), "remove 2 rule(s)");
        assert_eq!(ReconcileOp::EnableBaseline.to_string(), "enable baseline");
    }
}
