//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Daemon started
    ServiceStarted,

    /// Daemon stopped
    ServiceStopped,

    /// A reconciliation pass finished (fully or partially)
    PolicyApplied {
        should_block: bool,
        active_domain_count: usize,
        ops_applied: usize,
        complete: bool,
    },

    /// Schedule saved by an admin tool
    ScheduleSaved,

    /// Custom site added
    SiteAdded { domain: String },

    /// Custom site removed
    SiteRemoved { domain: String },

    /// Custom site list cleared
    SitesCleared,
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: focusgate_util::now(),
            event,
        }
    }
}
