//! SQLite-based store implementation

use async_trait::async_trait;
use chrono::{DateTime, Local};
use focusgate_api::{DomainList, RawSchedule, is_valid_host, normalize_domain};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, AuditLog, ConfigStore, StoreError, StoreResult};

const SCHEDULE_KEY: &str = "work_schedule";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Key/value settings (JSON values)
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL
            );

            -- Custom blocked sites, ordered by position
            CREATE TABLE IF NOT EXISTS custom_sites (
                position INTEGER PRIMARY KEY AUTOINCREMENT,
                domain TEXT NOT NULL UNIQUE
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    fn read_schedule(&self) -> StoreResult<Option<RawSchedule>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = ?",
                [SCHEDULE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn write_schedule(&self, schedule: &RawSchedule) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(schedule)?;

        conn.execute(
            r#"
            INSERT INTO settings (key, value_json)
            VALUES (?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value_json = excluded.value_json
            "#,
            params![SCHEDULE_KEY, json],
        )?;

        debug!(days = schedule.days.len(), "Schedule saved");
        Ok(())
    }

    fn read_sites(&self) -> StoreResult<DomainList> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT domain FROM custom_sites ORDER BY position")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut domains = Vec::new();
        for row in rows {
            domains.push(row?);
        }

        Ok(DomainList::new(domains))
    }

    fn insert_site(&self, domain: &str) -> StoreResult<bool> {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return Ok(false);
        }
        if !is_valid_host(&domain) {
            return Err(StoreError::InvalidDomain(domain));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO custom_sites (domain) VALUES (?)",
            [&domain],
        )?;

        debug!(domain = %domain, inserted = inserted == 1, "Add site");
        Ok(inserted == 1)
    }

    fn delete_site(&self, domain: &str) -> StoreResult<bool> {
        let domain = normalize_domain(domain);
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM custom_sites WHERE domain = ?", [&domain])?;

        debug!(domain = %domain, deleted = deleted == 1, "Remove site");
        Ok(deleted == 1)
    }

    fn delete_all_sites(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM custom_sites", [])?;

        debug!(deleted, "Sites cleared");
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn get_schedule(&self) -> StoreResult<Option<RawSchedule>> {
        self.read_schedule()
    }

    async fn set_schedule(&self, schedule: &RawSchedule) -> StoreResult<()> {
        self.write_schedule(schedule)
    }

    async fn get_domain_list(&self) -> StoreResult<DomainList> {
        self.read_sites()
    }

    async fn add_site(&self, domain: &str) -> StoreResult<bool> {
        self.insert_site(domain)
    }

    async fn remove_site(&self, domain: &str) -> StoreResult<bool> {
        self.delete_site(domain)
    }

    async fn clear_sites(&self) -> StoreResult<()> {
        self.delete_all_sites()
    }
}

impl AuditLog for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| focusgate_util::now());
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
