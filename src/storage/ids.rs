//! Identifier allocation
//!
//! Ids are `max(id) + 1` per table. Only used when the caller passes an
//! id `<= 0`; positive ids are always taken verbatim.

use rusqlite::Connection;
use crate::{EntityKind, Operation, Result, SqlResultExt, Target};

/// Next unused id for `kind`'s table, `1` when the table is empty
pub fn next_id(conn: &Connection, kind: EntityKind) -> Result<i64> {
    let sql = format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {}", kind.as_str());
    conn.query_row(&sql, [], |row| row.get(0))
        .during(Operation::Read, Target::Table(kind))
}

/// The id to write for a record: `requested` if positive, otherwise freshly allocated
pub fn resolve_id(conn: &Connection, kind: EntityKind, requested: i64) -> Result<i64> {
    if requested > 0 {
        Ok(requested)
    } else {
        let id = next_id(conn, kind)?;
        tracing::debug!(%kind, id, "allocated id");
        Ok(id)
    }
}
