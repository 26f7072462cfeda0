//! In-process [`Backend`] over a `BTreeMap`.
//!
//! Never fails, so its error type is [`Infallible`]. Ids are assigned from a
//! monotonically increasing counter and are not reused after deletes, which
//! matches `AUTOINCREMENT` in the SQLite backend.

use crate::backend::{Backend, Direction, Slot};
use crate::model::{FieldId, GroupKey, Item, ItemId, NewItem, Taxis};
use std::collections::BTreeMap;
use std::convert::Infallible;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    rows: BTreeMap<ItemId, Item>,
    last_id: ItemId,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn in_group(&self, group: GroupKey) -> impl Iterator<Item = &Item> {
        self.rows.values().filter(move |item| item.parent_id == group)
    }
}

impl Backend for MemoryBackend {
    type Error = Infallible;

    fn get(&self, id: ItemId) -> Result<Option<Item>, Infallible> {
        Ok(self.rows.get(&id).cloned())
    }

    fn max_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, Infallible> {
        Ok(self.in_group(group).map(|item| item.taxis).max())
    }

    fn min_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, Infallible> {
        Ok(self.in_group(group).map(|item| item.taxis).min())
    }

    fn neighbor(
        &self,
        group: GroupKey,
        taxis: Taxis,
        direction: Direction,
    ) -> Result<Option<Slot>, Infallible> {
        let candidates = self.in_group(group);
        let found = match direction {
            Direction::Successor => candidates
                .filter(|item| item.taxis > taxis)
                .min_by_key(|item| (item.taxis, item.id)),
            Direction::Predecessor => candidates
                .filter(|item| item.taxis < taxis)
                .max_by_key(|item| (item.taxis, std::cmp::Reverse(item.id))),
        };
        Ok(found.map(|item| Slot {
            id: item.id,
            taxis: item.taxis,
        }))
    }

    fn list(&self, group: GroupKey, field: Option<FieldId>) -> Result<Vec<Item>, Infallible> {
        let mut items: Vec<Item> = self
            .in_group(group)
            .filter(|item| field.is_none_or(|field_id| item.field_id == field_id))
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.taxis, item.id));
        Ok(items)
    }

    fn insert(
        &mut self,
        item: &NewItem,
        group: GroupKey,
        taxis: Taxis,
    ) -> Result<ItemId, Infallible> {
        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(
            id,
            Item {
                id,
                field_id: item.field_id,
                parent_id: group,
                taxis,
                name: item.name.clone(),
                value: item.value.clone(),
            },
        );
        Ok(id)
    }

    fn update_payload(&mut self, id: ItemId, name: &str, value: &str) -> Result<bool, Infallible> {
        let Some(item) = self.rows.get_mut(&id) else {
            return Ok(false);
        };
        name.clone_into(&mut item.name);
        value.clone_into(&mut item.value);
        Ok(true)
    }

    fn set_taxis(&mut self, id: ItemId, taxis: Taxis) -> Result<(), Infallible> {
        if let Some(item) = self.rows.get_mut(&id) {
            item.taxis = taxis;
        }
        Ok(())
    }

    fn delete(&mut self, id: ItemId) -> Result<bool, Infallible> {
        Ok(self.rows.remove(&id).is_some())
    }

    fn delete_with_children(&mut self, id: ItemId) -> Result<usize, Infallible> {
        let before = self.rows.len();
        self.rows
            .retain(|row_id, item| *row_id != id && item.parent_id != id);
        Ok(before - self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        for (taxis, name) in [(1, "a"), (4, "b"), (9, "c")] {
            backend
                .insert(&NewItem::new(1, name, ""), 7, taxis)
                .expect("insert");
        }
        backend.insert(&NewItem::new(1, "other", ""), 8, 5).expect("insert");
        backend
    }

    #[test]
    fn neighbor_skips_gaps_and_other_groups() {
        let backend = seeded();
        let next = backend
            .neighbor(7, 4, Direction::Successor)
            .expect("neighbor");
        assert_eq!(next, Some(Slot { id: 3, taxis: 9 }));

        let prev = backend
            .neighbor(7, 9, Direction::Predecessor)
            .expect("neighbor");
        assert_eq!(prev, Some(Slot { id: 2, taxis: 4 }));
    }

    #[test]
    fn neighbor_at_edges_is_none() {
        let backend = seeded();
        assert_eq!(backend.neighbor(7, 9, Direction::Successor).expect("n"), None);
        assert_eq!(backend.neighbor(7, 1, Direction::Predecessor).expect("n"), None);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut backend = seeded();
        assert!(backend.delete(4).expect("delete"));
        let id = backend.insert(&NewItem::default(), 8, 1).expect("insert");
        assert_eq!(id, 5);
    }

    #[test]
    fn delete_with_children_is_one_level() {
        let mut backend = MemoryBackend::new();
        let root = backend.insert(&NewItem::default(), 0, 1).expect("insert");
        let child = backend.insert(&NewItem::default(), root, 1).expect("insert");
        let grandchild = backend.insert(&NewItem::default(), child, 1).expect("insert");

        assert_eq!(backend.delete_with_children(root).expect("delete"), 2);
        assert!(backend.get(grandchild).expect("get").is_some());
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn update_payload_reports_unknown_id() {
        let mut backend = seeded();
        assert!(!backend.update_payload(99, "x", "y").expect("update"));
        assert!(backend.update_payload(1, "x", "y").expect("update"));
        let item = backend.get(1).expect("get").expect("present");
        assert_eq!((item.name.as_str(), item.value.as_str()), ("x", "y"));
    }
}
