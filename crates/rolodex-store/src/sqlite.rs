//! SQLite-backed registry

use crate::persisted::{decode_attributes, encode_attributes};
use crate::StoreError;
use rolodex_domain::{BusinessIdentity, EntityRecord, Fingerprint, RegistryStore, UpsertOutcome};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT fingerprint, name, website, phone, address, registry_id,
        first_seen, last_seen, retention_expiry, overall_confidence, resolved_attributes
     FROM entities";

/// Registry stored in a single SQLite table
///
/// Resolved attributes are kept as a JSON column in the same layout the
/// file backend uses.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one registry behind a
/// mutex rather than opening it from several threads.
pub struct SqliteRegistry {
    conn: Connection,
}

/// Columns of one `entities` row before decoding
struct EntityRow {
    fingerprint: String,
    identity: BusinessIdentity,
    first_seen: i64,
    last_seen: i64,
    retention_expiry: i64,
    overall_confidence: f64,
    resolved_attributes: String,
}

impl EntityRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            fingerprint: row.get(0)?,
            identity: BusinessIdentity {
                normalized_name: row.get(1)?,
                domain: row.get(2)?,
                phone_normalized: row.get(3)?,
                address_normalized: row.get(4)?,
                registry_id: row.get(5)?,
            },
            first_seen: row.get(6)?,
            last_seen: row.get(7)?,
            retention_expiry: row.get(8)?,
            overall_confidence: row.get(9)?,
            resolved_attributes: row.get(10)?,
        })
    }

    fn into_record(self) -> Result<EntityRecord, StoreError> {
        let fingerprint = Fingerprint::from_hex(self.fingerprint).map_err(StoreError::InvalidData)?;
        let attributes = serde_json::from_str(&self.resolved_attributes)?;
        Ok(EntityRecord {
            fingerprint,
            identity: self.identity,
            resolved_attributes: decode_attributes(attributes)?,
            overall_confidence: self.overall_confidence,
            first_seen: to_timestamp(self.first_seen)?,
            last_seen: to_timestamp(self.last_seen)?,
            retention_expiry: to_timestamp(self.retention_expiry)?,
        })
    }
}

fn to_timestamp(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::InvalidData(format!("Negative timestamp: {}", value)))
}

fn to_column(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl SqliteRegistry {
    /// Open (or create) a registry database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rolodex_store::SqliteRegistry;
    ///
    /// let registry = SqliteRegistry::new("rolodex.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let registry = Self { conn };
        registry.initialize_schema()?;
        Ok(registry)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }
}

impl RegistryStore for SqliteRegistry {
    type Error = StoreError;

    fn load(&mut self) -> Result<usize, Self::Error> {
        let count = self.len()?;
        info!("SQLite registry holds {} entries", count);
        Ok(count)
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE fingerprint = ?1", SELECT_COLUMNS),
                params![fingerprint.as_str()],
                EntityRow::from_row,
            )
            .optional()?;
        row.map(EntityRow::into_record).transpose()
    }

    fn entries(&self) -> Result<Vec<EntityRecord>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY fingerprint", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], EntityRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(EntityRow::into_record).collect()
    }

    fn upsert(&mut self, record: EntityRecord) -> Result<UpsertOutcome, Self::Error> {
        let attributes = serde_json::to_string(&encode_attributes(&record.resolved_attributes))?;
        let tx = self.conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM entities WHERE fingerprint = ?1",
                params![record.fingerprint.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        // first_seen is never overwritten
        tx.execute(
            "INSERT INTO entities (fingerprint, name, website, phone, address, registry_id,
                first_seen, last_seen, retention_expiry, overall_confidence, resolved_attributes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(fingerprint) DO UPDATE SET
                name = excluded.name,
                website = excluded.website,
                phone = excluded.phone,
                address = excluded.address,
                registry_id = excluded.registry_id,
                last_seen = excluded.last_seen,
                retention_expiry = excluded.retention_expiry,
                overall_confidence = excluded.overall_confidence,
                resolved_attributes = excluded.resolved_attributes",
            params![
                record.fingerprint.as_str(),
                &record.identity.normalized_name,
                &record.identity.domain,
                &record.identity.phone_normalized,
                &record.identity.address_normalized,
                &record.identity.registry_id,
                to_column(record.first_seen),
                to_column(record.last_seen),
                to_column(record.retention_expiry),
                record.overall_confidence,
                &attributes,
            ],
        )?;
        tx.commit()?;

        debug!("Upserted {} (existing: {})", record.fingerprint.short(), exists);
        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    fn evict_expired(&mut self, now: u64) -> Result<Vec<Fingerprint>, Self::Error> {
        let tx = self.conn.transaction()?;
        let expired = {
            let mut stmt = tx.prepare(
                "SELECT fingerprint FROM entities WHERE retention_expiry <= ?1 ORDER BY fingerprint",
            )?;
            let rows = stmt
                .query_map(params![to_column(now)], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        if expired.is_empty() {
            return Ok(Vec::new());
        }

        tx.execute(
            "DELETE FROM entities WHERE retention_expiry <= ?1",
            params![to_column(now)],
        )?;
        tx.commit()?;

        expired
            .into_iter()
            .map(|fp| Fingerprint::from_hex(fp).map_err(StoreError::InvalidData))
            .collect()
    }

    fn len(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
