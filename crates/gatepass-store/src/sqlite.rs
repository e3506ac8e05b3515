//! SQLite-based store implementation

use chrono::{DateTime, Utc};
use gatepass_api::VisitorPass;
use gatepass_util::PassId;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, RosterSnapshot, Store, StoreError, StoreResult};

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
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Cached pass records, in API order
            CREATE TABLE IF NOT EXISTS passes (
                pass_id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                record_json TEXT NOT NULL
            );

            -- Roster metadata (single row)
            CREATE TABLE IF NOT EXISTS roster_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                fetched_at TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_passes_position ON passes(position);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn parse_stored_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

impl Store for SqliteStore {
    fn append_audit(&self, event: AuditEvent) -> StoreResult<i64> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        let id = conn.last_insert_rowid();
        debug!(event_id = id, "Audit event appended");

        Ok(id)
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let Some(timestamp) = parse_stored_time(&timestamp_str) else {
                warn!(event_id = id, timestamp = %timestamp_str, "Skipping audit event with bad timestamp");
                continue;
            };
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn replace_roster(
        &self,
        passes: &[VisitorPass],
        fetched_at: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut seen = HashSet::with_capacity(passes.len());

        tx.execute("DELETE FROM passes", [])?;
        {
            let mut insert = tx.prepare(
                r#"
                INSERT INTO passes (pass_id, position, record_json)
                VALUES (?, ?, ?)
                ON CONFLICT(pass_id)
                DO UPDATE SET record_json = excluded.record_json
                "#,
            )?;
            for (position, pass) in passes.iter().enumerate() {
                if !seen.insert(pass.pass_id.as_str()) {
                    // Later record wins, keeping the first position
                    warn!(pass_id = %pass.pass_id, position, "Duplicate pass id in roster");
                }
                let json = serde_json::to_string(pass)?;
                insert.execute(params![pass.pass_id.as_str(), position as i64, json])?;
            }
        }
        tx.execute(
            r#"
            INSERT INTO roster_meta (id, fetched_at)
            VALUES (1, ?)
            ON CONFLICT(id)
            DO UPDATE SET fetched_at = excluded.fetched_at
            "#,
            [fetched_at.to_rfc3339()],
        )?;
        tx.commit()?;

        debug!(
            pass_count = seen.len(),
            duplicates = passes.len() - seen.len(),
            fetched_at = %fetched_at,
            "Roster replaced"
        );
        Ok(seen.len())
    }

    fn load_roster(&self) -> StoreResult<Option<RosterSnapshot>> {
        let conn = self.conn()?;

        let fetched_at: Option<String> = conn
            .query_row("SELECT fetched_at FROM roster_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(fetched_at) = fetched_at else {
            return Ok(None);
        };
        let fetched_at = parse_stored_time(&fetched_at).ok_or_else(|| {
            StoreError::Serialization(format!("bad roster timestamp: {}", fetched_at))
        })?;

        let mut stmt = conn.prepare("SELECT record_json FROM passes ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut passes = Vec::new();
        for row in rows {
            passes.push(serde_json::from_str::<VisitorPass>(&row?)?);
        }

        Ok(Some(RosterSnapshot { fetched_at, passes }))
    }

    fn get_pass(&self, pass_id: &PassId) -> StoreResult<Option<VisitorPass>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM passes WHERE pass_id = ?",
                [pass_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|s| serde_json::from_str(&s).map_err(StoreError::from))
            .transpose()
    }

    fn upsert_pass(&self, pass: &VisitorPass) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(pass)?;

        conn.execute(
            r#"
            INSERT INTO passes (pass_id, position, record_json)
            VALUES (?1, (SELECT COALESCE(MAX(position) + 1, 0) FROM passes), ?2)
            ON CONFLICT(pass_id)
            DO UPDATE SET record_json = excluded.record_json
            "#,
            params![pass.pass_id.as_str(), json],
        )?;

        debug!(pass_id = %pass.pass_id, "Pass record cached");
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gatepass_util::ScanId;

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_audit_log_newest_first() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .append_audit(AuditEvent::new(AuditEventType::ConsoleStarted))
            .unwrap();
        let id = store
            .append_audit(AuditEvent::new(AuditEventType::ScanSubmitted {
                scan_id: ScanId::new(),
                pass_id: PassId::new("VIS-1"),
            }))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, id);
        assert!(matches!(events[0].event, AuditEventType::ScanSubmitted { .. }));
        assert!(matches!(events[1].event, AuditEventType::ConsoleStarted));

        assert_eq!(store.get_recent_audits(1).unwrap().len(), 1);
    }

    #[test]
    fn test_roster_absent_until_synced() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_roster().unwrap().is_none());

        store.replace_roster(&[], fetched()).unwrap();
        let snapshot = store.load_roster().unwrap().unwrap();
        assert!(snapshot.passes.is_empty());
        assert_eq!(snapshot.fetched_at, fetched());
    }

    #[test]
    fn test_roster_keeps_order_and_replaces() {
        let store = SqliteStore::in_memory().unwrap();
        let first = vec![
            VisitorPass::new("VIS-3", "Carol"),
            VisitorPass::new("VIS-1", "Alice"),
            VisitorPass::new("VIS-2", "Bob"),
        ];
        store.replace_roster(&first, fetched()).unwrap();

        let ids: Vec<_> = store
            .load_roster()
            .unwrap()
            .unwrap()
            .passes
            .into_iter()
            .map(|p| p.pass_id.to_string())
            .collect();
        assert_eq!(ids, ["VIS-3", "VIS-1", "VIS-2"]);

        let second = vec![VisitorPass::new("VIS-9", "Zed")];
        store
            .replace_roster(&second, fetched() + chrono::Duration::hours(1))
            .unwrap();
        let snapshot = store.load_roster().unwrap().unwrap();
        assert_eq!(snapshot.passes, second);
        assert!(store.get_pass(&PassId::new("VIS-1")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_pass_ids_collapse() {
        let store = SqliteStore::in_memory().unwrap();
        let mut later = VisitorPass::new("VIS-1", "Alice");
        later
            .record_check_in(Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap())
            .unwrap();
        let roster = vec![
            VisitorPass::new("VIS-1", "Alice"),
            VisitorPass::new("VIS-2", "Bob"),
            later,
        ];

        let stored = store.replace_roster(&roster, fetched()).unwrap();
        assert_eq!(stored, 2);

        let passes = store.load_roster().unwrap().unwrap().passes;
        let ids: Vec<_> = passes.iter().map(|p| p.pass_id.to_string()).collect();
        assert_eq!(ids, ["VIS-1", "VIS-2"]);
        assert!(passes[0].has_checked_in());
    }

    #[test]
    fn test_upsert_refreshes_or_appends() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .replace_roster(
                &[VisitorPass::new("VIS-1", "Alice"), VisitorPass::new("VIS-2", "Bob")],
                fetched(),
            )
            .unwrap();

        let mut alice = VisitorPass::new("VIS-1", "Alice");
        alice
            .record_check_in(Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap())
            .unwrap();
        store.upsert_pass(&alice).unwrap();
        store.upsert_pass(&VisitorPass::new("VIS-7", "New")).unwrap();

        let cached = store.get_pass(&PassId::new("VIS-1")).unwrap().unwrap();
        assert!(cached.has_checked_in());

        let ids: Vec<_> = store
            .load_roster()
            .unwrap()
            .unwrap()
            .passes
            .into_iter()
            .map(|p| p.pass_id.to_string())
            .collect();
        assert_eq!(ids, ["VIS-1", "VIS-2", "VIS-7"]);
    }

    #[test]
    fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatepass.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .replace_roster(&[VisitorPass::new("VIS-1", "Alice")], fetched())
                .unwrap();
            store
                .append_audit(AuditEvent::new(AuditEventType::RosterSynced { pass_count: 1 }))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_roster().unwrap().unwrap().passes.len(), 1);
        assert!(matches!(
            store.get_recent_audits(5).unwrap()[0].event,
            AuditEventType::RosterSynced { pass_count: 1 }
        ));
    }
}
