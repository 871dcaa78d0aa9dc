//! Operation semantics shared by engine implementations

use focusgate_api::{EnforcementSnapshot, ReconcileOp, RuleDescriptor};

use crate::{EngineError, EngineResult};

/// Apply one operation to an in-memory snapshot.
///
/// `AddRules` is all-or-nothing: every descriptor is checked before any is
/// installed. Removing an id that is not installed is not an error.
pub fn apply_to_snapshot(snapshot: &mut EnforcementSnapshot, op: &ReconcileOp) -> EngineResult<()> {
    match op {
        ReconcileOp::DisableBaseline => snapshot.baseline_enabled = false,
        ReconcileOp::EnableBaseline => snapshot.baseline_enabled = true,
        ReconcileOp::RemoveRules { ids } => {
            snapshot.rules.retain(|rule| !ids.contains(&rule.id));
        }
        ReconcileOp::AddRules { rules } => {
            check_additions(snapshot, rules)?;
            snapshot.rules.extend(rules.iter().cloned());
        }
    }
    Ok(())
}

/// Reject additions that reuse an installed id, repeat an id within the
/// batch, or carry an unusable pattern.
pub fn check_additions(snapshot: &EnforcementSnapshot, rules: &[RuleDescriptor]) -> EngineResult<()> {
    let mut seen = snapshot.rule_ids();

    for rule in rules {
        if !seen.insert(rule.id) {
            return Err(EngineError::DuplicateRuleId(rule.id));
        }
        if !is_well_formed_filter(rule.url_filter()) {
            return Err(EngineError::MalformedPattern {
                id: rule.id,
                pattern: rule.url_filter().to_string(),
            });
        }
    }

    Ok(())
}

/// A usable url filter is non-empty, has no whitespace, and names a host
/// between `://` and the next `/`.
pub fn is_well_formed_filter(filter: &str) -> bool {
    if filter.is_empty() || filter.chars().any(char::is_whitespace) {
        return false;
    }

    match filter.split_once("://") {
        Some((_, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            !host.is_empty() && host != "*." && !host.ends_with('.')
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusgate_util::RuleId;
    use std::collections::BTreeSet;

    fn rule(id: u32, filter: &str) -> RuleDescriptor {
        RuleDescriptor::redirect_main_frame(RuleId::new(id), filter, "/block.html")
    }

    #[test]
    fn add_then_remove() {
        let mut snapshot = EnforcementSnapshot::default();

        apply_to_snapshot(
            &mut snapshot,
            &ReconcileOp::AddRules {
                rules: vec![rule(1000, "*://*.a.com/*"), rule(2000, "*://a.com/*")],
            },
        )
        .unwrap();
        assert_eq!(snapshot.rules.len(), 2);

        apply_to_snapshot(
            &mut snapshot,
            &ReconcileOp::RemoveRules {
                ids: vec![RuleId::new(1000), RuleId::new(1500)],
            },
        )
        .unwrap();
        assert_eq!(snapshot.rule_ids(), BTreeSet::from([RuleId::new(2000)]));
    }

    #[test]
    fn duplicate_id_rejected_atomically() {
        let mut snapshot = EnforcementSnapshot {
            baseline_enabled: true,
            rules: vec![rule(1000, "*://*.a.com/*")],
        };

        let err = apply_to_snapshot(
            &mut snapshot,
            &ReconcileOp::AddRules {
                rules: vec![rule(1001, "*://*.b.com/*"), rule(1000, "*://*.c.com/*")],
            },
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::DuplicateRuleId(id) if id == RuleId::new(1000)));
        assert_eq!(snapshot.rules.len(), 1);
    }

    #[test]
    fn duplicate_within_batch_rejected() {
        let snapshot = EnforcementSnapshot::default();
        let rules = vec![rule(1000, "*://*.a.com/*"), rule(1000, "*://*.b.com/*")];
        assert!(check_additions(&snapshot, &rules).is_err());
    }

    #[test]
    fn malformed_filters() {
        assert!(is_well_formed_filter("*://*.a.com/*"));
        assert!(is_well_formed_filter("*://www.a.com/*"));
        assert!(!is_well_formed_filter(""));
        assert!(!is_well_formed_filter("*:///*"));
        assert!(!is_well_formed_filter("*://*./*"));
        assert!(!is_well_formed_filter("*://a b.com/*"));
    }

    #[test]
    fn baseline_toggle() {
        let mut snapshot = EnforcementSnapshot::default();
        apply_to_snapshot(&mut snapshot, &ReconcileOp::EnableBaseline).unwrap();
        assert!(snapshot.baseline_enabled);
        apply_to_snapshot(&mut snapshot, &ReconcileOp::DisableBaseline).unwrap();
        assert!(!snapshot.baseline_enabled);
    }
}
