//! [`Backend`] implementation over a migrated SQLite connection.
//!
//! SQL is assembled from [`Column`] names and [`TABLE`]; no statement spells
//! a physical column by hand. Errors are raw [`rusqlite::Error`] values.

use crate::backend::{Backend, Direction, Slot};
use crate::db;
use crate::error::OpenError;
use crate::model::{Column, FieldId, GroupKey, Item, ItemId, NewItem, TABLE, Taxis};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::path::Path;
use std::time::Duration;

/// SQLite-backed item rows.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// See [`db::open_store`].
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, OpenError> {
        Ok(Self {
            conn: db::open_store(path, busy_timeout)?,
        })
    }

    /// Open a private in-memory store.
    ///
    /// # Errors
    ///
    /// See [`db::open_in_memory`].
    pub fn open_in_memory() -> Result<Self, OpenError> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    /// Wrap a connection whose schema is already at the latest version.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        field_id: row.get(1)?,
        parent_id: row.get(2)?,
        taxis: row.get(3)?,
        name: row.get(4)?,
        value: row.get(5)?,
    })
}

fn aggregate_taxis_sql(aggregate: &str) -> String {
    format!(
        "SELECT {aggregate}({taxis}) FROM {TABLE} WHERE {parent} = ?1",
        taxis = Column::Taxis,
        parent = Column::ParentId,
    )
}

fn neighbor_sql(direction: Direction) -> String {
    let (op, order) = match direction {
        Direction::Successor => (">", "ASC"),
        Direction::Predecessor => ("<", "DESC"),
    };
    format!(
        "SELECT {id}, {taxis} FROM {TABLE} \
         WHERE {parent} = ?1 AND {taxis} {op} ?2 \
         ORDER BY {taxis} {order}, {id} ASC LIMIT 1",
        id = Column::Id,
        taxis = Column::Taxis,
        parent = Column::ParentId,
    )
}

fn insert_sql() -> String {
    format!(
        "INSERT INTO {TABLE} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
        Column::FieldId,
        Column::Name,
        Column::Value,
        Column::ParentId,
        Column::Taxis,
    )
}

fn set_taxis_sql() -> String {
    format!(
        "UPDATE {TABLE} SET {taxis} = ?1 WHERE {id} = ?2",
        taxis = Column::Taxis,
        id = Column::Id,
    )
}

impl Backend for SqliteBackend {
    type Error = rusqlite::Error;

    fn get(&self, id: ItemId) -> rusqlite::Result<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM {TABLE} WHERE {} = ?1",
            Column::select_list(),
            Column::Id,
        );
        self.conn
            .prepare_cached(&sql)?
            .query_row(params![id], row_to_item)
            .optional()
    }

    fn max_taxis(&self, group: GroupKey) -> rusqlite::Result<Option<Taxis>> {
        self.conn
            .prepare_cached(&aggregate_taxis_sql("MAX"))?
            .query_row(params![group], |row| row.get(0))
    }

    fn min_taxis(&self, group: GroupKey) -> rusqlite::Result<Option<Taxis>> {
        self.conn
            .prepare_cached(&aggregate_taxis_sql("MIN"))?
            .query_row(params![group], |row| row.get(0))
    }

    fn neighbor(
        &self,
        group: GroupKey,
        taxis: Taxis,
        direction: Direction,
    ) -> rusqlite::Result<Option<Slot>> {
        self.conn
            .prepare_cached(&neighbor_sql(direction))?
            .query_row(params![group, taxis], |row| {
                Ok(Slot {
                    id: row.get(0)?,
                    taxis: row.get(1)?,
                })
            })
            .optional()
    }

    fn list(&self, group: GroupKey, field: Option<FieldId>) -> rusqlite::Result<Vec<Item>> {
        let field_clause = if field.is_some() {
            format!(" AND {} = ?2", Column::FieldId)
        } else {
            String::new()
        };
        let sql = format!(
            "SELECT {select} FROM {TABLE} WHERE {parent} = ?1{field_clause} \
             ORDER BY {taxis} ASC, {id} ASC",
            select = Column::select_list(),
            parent = Column::ParentId,
            taxis = Column::Taxis,
            id = Column::Id,
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = match field {
            Some(field_id) => stmt.query_map(params![group, field_id], row_to_item)?,
            None => stmt.query_map(params![group], row_to_item)?,
        };
        rows.collect()
    }

    fn insert(
        &mut self,
        item: &NewItem,
        group: GroupKey,
        taxis: Taxis,
    ) -> rusqlite::Result<ItemId> {
        self.conn.prepare_cached(&insert_sql())?.execute(params![
            item.field_id,
            item.name,
            item.value,
            group,
            taxis
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn append(&mut self, item: &NewItem, group: GroupKey) -> rusqlite::Result<Slot> {
        // IMMEDIATE takes the write lock before the max is read
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let max: Option<Taxis> = tx
            .prepare_cached(&aggregate_taxis_sql("MAX"))?
            .query_row(params![group], |row| row.get(0))?;
        let taxis = max.map_or(1, |max| max + 1);
        tx.prepare_cached(&insert_sql())?.execute(params![
            item.field_id,
            item.name,
            item.value,
            group,
            taxis
        ])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Slot { id, taxis })
    }

    fn update_payload(&mut self, id: ItemId, name: &str, value: &str) -> rusqlite::Result<bool> {
        let sql = format!(
            "UPDATE {TABLE} SET {} = ?1, {} = ?2 WHERE {} = ?3",
            Column::Name,
            Column::Value,
            Column::Id,
        );
        let changed = self
            .conn
            .prepare_cached(&sql)?
            .execute(params![name, value, id])?;
        Ok(changed > 0)
    }

    fn set_taxis(&mut self, id: ItemId, taxis: Taxis) -> rusqlite::Result<()> {
        self.conn
            .prepare_cached(&set_taxis_sql())?
            .execute(params![taxis, id])?;
        Ok(())
    }

    fn swap_taxis(&mut self, a: Slot, b: Slot) -> rusqlite::Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(&set_taxis_sql())?;
            stmt.execute(params![b.taxis, a.id])?;
            stmt.execute(params![a.taxis, b.id])?;
        }
        tx.commit()
    }

    fn delete(&mut self, id: ItemId) -> rusqlite::Result<bool> {
        let sql = format!("DELETE FROM {TABLE} WHERE {} = ?1", Column::Id);
        let removed = self.conn.prepare_cached(&sql)?.execute(params![id])?;
        Ok(removed > 0)
    }

    fn delete_with_children(&mut self, id: ItemId) -> rusqlite::Result<usize> {
        let sql = format!(
            "DELETE FROM {TABLE} WHERE {} = ?1 OR {} = ?1",
            Column::Id,
            Column::ParentId,
        );
        self.conn.prepare_cached(&sql)?.execute(params![id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SqliteBackend {
        SqliteBackend::open_in_memory().expect("open in-memory store")
    }

    fn insert(backend: &mut SqliteBackend, field: FieldId, group: GroupKey, taxis: Taxis) -> ItemId {
        backend
            .insert(&NewItem::new(field, format!("item-{taxis}"), ""), group, taxis)
            .expect("insert")
    }

    #[test]
    fn aggregates_on_empty_group_are_none() {
        let backend = backend();
        assert_eq!(backend.max_taxis(42).expect("max"), None);
        assert_eq!(backend.min_taxis(42).expect("min"), None);
    }

    #[test]
    fn aggregates_are_scoped_to_group() {
        let mut backend = backend();
        insert(&mut backend, 1, 10, 3);
        insert(&mut backend, 1, 10, 8);
        insert(&mut backend, 1, 11, 50);

        assert_eq!(backend.max_taxis(10).expect("max"), Some(8));
        assert_eq!(backend.min_taxis(10).expect("min"), Some(3));
    }

    #[test]
    fn neighbor_queries_follow_direction() {
        let mut backend = backend();
        let low = insert(&mut backend, 1, 10, 2);
        insert(&mut backend, 1, 10, 5);
        let high = insert(&mut backend, 1, 10, 9);

        assert_eq!(
            backend.neighbor(10, 5, Direction::Successor).expect("next"),
            Some(Slot { id: high, taxis: 9 })
        );
        assert_eq!(
            backend.neighbor(10, 5, Direction::Predecessor).expect("prev"),
            Some(Slot { id: low, taxis: 2 })
        );
        assert_eq!(
            backend.neighbor(10, 9, Direction::Successor).expect("next"),
            None
        );
    }

    #[test]
    fn swap_taxis_is_applied_to_both_rows() {
        let mut backend = backend();
        let a = insert(&mut backend, 1, 10, 1);
        let b = insert(&mut backend, 1, 10, 2);

        backend
            .swap_taxis(Slot { id: a, taxis: 1 }, Slot { id: b, taxis: 2 })
            .expect("swap");

        assert_eq!(backend.get(a).expect("get").map(|i| i.taxis), Some(2));
        assert_eq!(backend.get(b).expect("get").map(|i| i.taxis), Some(1));
    }

    #[test]
    fn list_filters_by_field_and_orders_by_taxis() {
        let mut backend = backend();
        let second = insert(&mut backend, 1, 10, 7);
        let first = insert(&mut backend, 1, 10, 4);
        insert(&mut backend, 2, 10, 5);

        let ids: Vec<ItemId> = backend
            .list(10, Some(1))
            .expect("list")
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(backend.list(10, None).expect("list").len(), 3);
    }

    #[test]
    fn append_numbers_after_group_max() {
        let mut backend = backend();
        insert(&mut backend, 1, 10, 6);
        insert(&mut backend, 1, 11, 40);

        let slot = backend
            .append(&NewItem::new(1, "tail", ""), 10)
            .expect("append");
        assert_eq!(slot.taxis, 7);
        assert_eq!(backend.get(slot.id).expect("get").map(|i| i.taxis), Some(7));

        let first = backend
            .append(&NewItem::new(1, "head", ""), 12)
            .expect("append");
        assert_eq!(first.taxis, 1);
    }

    #[test]
    fn oversized_payload_surfaces_constraint_error() {
        let mut backend = backend();
        let err = backend
            .insert(&NewItem::new(1, "x".repeat(256), ""), 0, 1)
            .expect_err("check constraint");
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }

    #[test]
    fn reopen_keeps_rows_on_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("taxis.db");
        let id = {
            let mut backend =
                SqliteBackend::open(&path, db::DEFAULT_BUSY_TIMEOUT).expect("open");
            insert(&mut backend, 1, 0, 1)
        };
        let backend = SqliteBackend::open(&path, db::DEFAULT_BUSY_TIMEOUT).expect("reopen");
        assert_eq!(backend.get(id).expect("get").map(|i| i.taxis), Some(1));
    }
}
