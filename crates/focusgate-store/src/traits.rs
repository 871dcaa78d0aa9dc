//! Store trait definitions

use async_trait::async_trait;
use focusgate_api::{DomainList, RawSchedule};

use crate::{AuditEvent, StoreResult};

/// Schedule and custom domain list, as edited by the settings layer
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Saved weekly schedule, `None` if never saved
    async fn get_schedule(&self) -> StoreResult<Option<RawSchedule>>;

    /// Replace the weekly schedule
    async fn set_schedule(&self, schedule: &RawSchedule) -> StoreResult<()>;

    /// Custom domains in insertion order
    async fn get_domain_list(&self) -> StoreResult<DomainList>;

    /// Append a domain. Returns `false` if it is blank or already in the
    /// list, and `StoreError::InvalidDomain` if it is not a usable host.
    async fn add_site(&self, domain: &str) -> StoreResult<bool>;

    /// Remove a domain. Returns `false` if it was not in the list.
    async fn remove_site(&self, domain: &str) -> StoreResult<bool>;

    /// Remove every custom domain
    async fn clear_sites(&self) -> StoreResult<()>;
}

/// Append-only audit log
pub trait AuditLog: Send + Sync {
    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
