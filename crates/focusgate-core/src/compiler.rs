//! Domain rule compilation
//!
//! Each custom domain at position `i` compiles to two redirect rules:
//!
//! | id | filter |
//! |---|---|
//! | `CUSTOM_RULE_BASE_A + i` | `*://*.<domain>/*`, or `*://<domain>/*` when the domain starts with `www.` |
//! | `CUSTOM_RULE_BASE_B + i` | `*://<domain without www.>/*` |
//!
//! Ids depend only on position, so compiling the same list twice yields
//! identical descriptors and the reconciler can diff by id.

use focusgate_api::{
    BASELINE_RULE_BASE, CUSTOM_RULE_BASE_A, CUSTOM_RULE_BASE_B, CUSTOM_RULE_CAPACITY, DomainList,
    MAX_BASELINE_DOMAINS, RuleDescriptor, is_valid_host, normalize_domain,
};
use focusgate_util::RuleId;
use tracing::{debug, warn};

/// Compile the custom domain list into rules in the reserved custom bands.
///
/// Blank or unusable entries keep their position but produce no rules.
/// Entries past the band capacity are skipped.
pub fn compile(domains: &DomainList, target: &str) -> Vec<RuleDescriptor> {
    let capacity = CUSTOM_RULE_CAPACITY as usize;
    if domains.len() > capacity {
        warn!(
            domains = domains.len(),
            capacity, "Custom domain list exceeds rule capacity, extra domains not blocked"
        );
    }

    let mut rules = Vec::with_capacity(domains.len().min(capacity) * 2);
    for (index, domain) in domains.iter().take(capacity).enumerate() {
        let offset = index as u32;
        if let Some(pair) = domain_rules(
            domain,
            RuleId::new(CUSTOM_RULE_BASE_A + offset),
            RuleId::new(CUSTOM_RULE_BASE_B + offset),
            target,
        ) {
            rules.extend(pair);
        }
    }

    debug!(domains = domains.len(), rules = rules.len(), "Compiled custom domains");
    rules
}

/// Compile the fixed baseline list. Domain `i` takes ids
/// `BASELINE_RULE_BASE + 2i` and `BASELINE_RULE_BASE + 2i + 1`, all below
/// the custom bands.
pub fn compile_baseline(domains: &[String], target: &str) -> Vec<RuleDescriptor> {
    if domains.len() > MAX_BASELINE_DOMAINS {
        warn!(
            domains = domains.len(),
            max = MAX_BASELINE_DOMAINS,
            "Baseline list too long, extra domains not blocked"
        );
    }

    domains
        .iter()
        .take(MAX_BASELINE_DOMAINS)
        .enumerate()
        .filter_map(|(index, domain)| {
            let first = BASELINE_RULE_BASE + 2 * index as u32;
            domain_rules(domain, RuleId::new(first), RuleId::new(first + 1), target)
        })
        .flatten()
        .collect()
}

/// The wildcard/verbatim rule and the `www.`-stripped rule for one domain
fn domain_rules(
    domain: &str,
    wildcard_id: RuleId,
    bare_id: RuleId,
    target: &str,
) -> Option<[RuleDescriptor; 2]> {
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return None;
    }
    if !is_valid_host(&domain) {
        warn!(domain = %domain, id = %wildcard_id, "Not a valid host, domain not blocked");
        return None;
    }

    let (wildcard, bare) = match domain.strip_prefix("www.") {
        Some(bare) => (format!("*://{domain}/*"), format!("*://{bare}/*")),
        None => (format!("*://*.{domain}/*"), format!("*://{domain}/*")),
    };

    Some([
        RuleDescriptor::redirect_main_frame(wildcard_id, wildcard, target),
        RuleDescriptor::redirect_main_frame(bare_id, bare, target),
    ])
}
