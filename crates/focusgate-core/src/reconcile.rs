//! Rule reconciliation

use focusgate_api::{
    DesiredState, EnforcementSnapshot, ReconcileOp, ReconcilePlan, RuleDescriptor,
    is_custom_rule_id,
};
use focusgate_util::RuleId;
use std::collections::BTreeMap;

/// Compute the operations that converge `snapshot` to `desired`.
///
/// Only rules in the reserved custom bands are diffed; anything else the
/// engine holds is left alone. Baseline toggles are emitted only when the
/// snapshot disagrees, so a converged snapshot yields an empty plan.
/// Removals always precede additions. A custom rule whose id is wanted but
/// whose content differs is removed and re-added.
pub fn reconcile(desired: &DesiredState, snapshot: &EnforcementSnapshot) -> ReconcilePlan {
    let mut plan = ReconcilePlan::new();
    let installed: BTreeMap<RuleId, &RuleDescriptor> = snapshot
        .rules
        .iter()
        .filter(|rule| is_custom_rule_id(rule.id))
        .map(|rule| (rule.id, rule))
        .collect();

    if !desired.should_block {
        if snapshot.baseline_enabled {
            plan.push(ReconcileOp::DisableBaseline);
        }
        if !installed.is_empty() {
            plan.push(ReconcileOp::RemoveRules {
                ids: installed.into_keys().collect(),
            });
        }
        return plan;
    }

    if !snapshot.baseline_enabled {
        plan.push(ReconcileOp::EnableBaseline);
    }

    let mut wanted: BTreeMap<RuleId, &RuleDescriptor> = BTreeMap::new();
    for rule in &desired.custom_rules {
        wanted.entry(rule.id).or_insert(rule);
    }

    let ids_to_remove: Vec<RuleId> = installed
        .iter()
        .filter(|&(id, rule)| wanted.get(id) != Some(rule))
        .map(|(id, _)| *id)
        .collect();

    let rules_to_add: Vec<RuleDescriptor> = wanted
        .iter()
        .filter(|&(id, rule)| installed.get(id) != Some(rule))
        .map(|(_, rule)| (*rule).clone())
        .collect();

    if !ids_to_remove.is_empty() {
        plan.push(ReconcileOp::RemoveRules { ids: ids_to_remove });
    }
    if !rules_to_add.is_empty() {
        plan.push(ReconcileOp::AddRules {
            rules: rules_to_add,
        });
    }

    plan
}
