//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use rusqlite::Connection;
use crate::delete::{ConfirmDelete, DeleteCoordinator, DeleteOutcome};
use crate::entity::Lesson;
use crate::impact::{self, ImpactReport};
use crate::resolver::Upsert;
use crate::{EntityKind, Error, Operation, Result, SqlResultExt, Target};
use super::codec::{self, Record};
use super::ids;
use super::schema::{self, ResetConfirmation};

/// SQLite-backed storage for the planner's entities
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).during(Operation::Open, Target::Schema)?;
        Self::from_connection(conn)
    }

    /// Open a database file, waiting up to `busy_timeout` for locks held by other connections
    pub fn open_with_busy_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path).during(Operation::Open, Target::Schema)?;
        conn.busy_timeout(busy_timeout).during(Operation::Open, Target::Schema)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().during(Operation::Open, Target::Schema)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .during(Operation::Open, Target::Schema)?;
        let mut store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    /// Close the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .during(Operation::Open, Target::Schema)
    }

    /// Raw connection, for read-only inspection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Schema ==========

    pub fn create_schema(&mut self) -> Result<()> {
        schema::create_all(&mut self.conn)
    }

    pub fn drop_schema(&mut self) -> Result<()> {
        schema::drop_all(&mut self.conn)
    }

    /// Drop and recreate every table. All rows are lost.
    pub fn reset(&mut self, confirmation: ResetConfirmation) -> Result<()> {
        schema::reset(&mut self.conn, confirmation)
    }

    // ========== Entity Operations ==========

    /// Get an entity by id, with every required reference hydrated
    pub fn get<E: Record>(&self, id: i64) -> Result<E> {
        E::fetch(&self.conn, id)
    }

    /// Every entity of a kind, ordered by id
    pub fn list<E: Record>(&self) -> Result<Vec<E>> {
        codec::all_ids(&self.conn, E::KIND)?
            .into_iter()
            .map(|id| E::fetch(&self.conn, id))
            .collect()
    }

    /// Insert an entity and any missing dependency in one transaction.
    /// Returns the id the entity was written under.
    pub fn insert<E: Upsert>(&mut self, entity: &E) -> Result<i64> {
        let id = self.with_transaction(|tx| E::insert_into(tx, entity))?;
        tracing::debug!(kind = %E::KIND, id, "insert committed");
        Ok(id)
    }

    /// Replace the row at `entity.id()` in one transaction
    pub fn update<E: Upsert>(&mut self, entity: &E) -> Result<()> {
        self.with_transaction(|tx| E::update_in(tx, entity))?;
        tracing::debug!(kind = %E::KIND, id = entity.id(), "update committed");
        Ok(())
    }

    /// Run `f` inside a transaction. Any error rolls every statement back.
    pub fn with_transaction<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .transaction()
            .during(Operation::Transaction, Target::Schema)?;
        let value = f(&tx)?;
        tx.commit().during(Operation::Transaction, Target::Schema)?;
        Ok(value)
    }

    // ========== Lookups ==========

    pub fn next_id(&self, kind: EntityKind) -> Result<i64> {
        ids::next_id(&self.conn, kind)
    }

    pub fn exists(&self, kind: EntityKind, id: i64) -> Result<bool> {
        codec::exists(&self.conn, kind, id)
    }

    /// Row count of a table
    pub fn size(&self, kind: EntityKind) -> Result<usize> {
        codec::count_rows(&self.conn, kind)
    }

    /// All ids of a table, ascending
    pub fn ids(&self, kind: EntityKind) -> Result<Vec<i64>> {
        codec::all_ids(&self.conn, kind)
    }

    /// The lesson on `weekday_id` during `period_id`, if that slot is taken
    pub fn lesson_at(&self, weekday_id: i64, period_id: i64) -> Result<Option<Lesson>> {
        codec::lesson_at(&self.conn, weekday_id, period_id)
    }

    // ========== Deletes ==========

    pub fn impact_count(&self, kind: EntityKind, id: i64) -> Result<u64> {
        impact::impact_count(&self.conn, kind, id)
    }

    pub fn impact_report(&self, kind: EntityKind, id: i64) -> Result<ImpactReport> {
        impact::impact_report(&self.conn, kind, id)
    }

    /// Delete `kind #id`, asking `confirm` first when other rows depend on it
    pub fn delete<C: ConfirmDelete + ?Sized>(&mut self, kind: EntityKind, id: i64, confirm: &C) -> Result<DeleteOutcome> {
        DeleteCoordinator::new(self, confirm).run(kind, id)
    }

    /// Final delete step. Re-checks the row inside the transaction so a row
    /// removed while confirmation was pending surfaces as `NotFound`.
    pub(crate) fn delete_confirmed(&mut self, kind: EntityKind, id: i64, confirmed_impact: u64) -> Result<()> {
        self.with_transaction(|tx| {
            if !codec::exists(tx, kind, id)? {
                return Err(Error::NotFound { kind, id });
            }
            let current = impact::impact_count(tx, kind, id)?;
            if current != confirmed_impact {
                tracing::warn!(%kind, id, confirmed = confirmed_impact, current, "impact changed since confirmation");
            }
            codec::delete_row(tx, kind, id)
        })?;
        tracing::info!(%kind, id, impact = confirmed_impact, "deleted");
        Ok(())
    }

    // ========== Inspection ==========

    /// Raw rows of one table, `column: value || ...` per line
    pub fn dump_table(&self, kind: EntityKind) -> Result<String> {
        codec::dump_table(&self.conn, kind)
    }

    /// Raw rows of every table, one block per table
    pub fn dump_all(&self) -> Result<String> {
        let mut out = String::new();
        for kind in EntityKind::all() {
            out.push_str(&format!("Table {}:\n", kind));
            out.push_str(&self.dump_table(*kind)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let counts = EntityKind::all()
            .iter()
            .map(|kind| Ok((*kind, self.size(*kind)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(DbStats { counts })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub counts: Vec<(EntityKind, usize)>,
}

impl DbStats {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (kind, count) in &self.counts {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        write!(f, "  Total: {}", self.total())
    }
}
