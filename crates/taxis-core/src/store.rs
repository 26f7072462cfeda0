//! Group-relative ordering over a [`Backend`].
//!
//! Each group (items sharing a `parent_id`) is a sequence ordered by
//! ascending `taxis`. New items go to the end (`max + 1`, or `1` for an empty
//! group). Moving an item swaps its `taxis` with the adjacent item in the
//! requested direction. Deletes leave gaps; nothing is ever renumbered.
//!
//! Writes check the 255-character payload limit before reaching the backend,
//! so every backend rejects the same rows.
//!
//! The store does no locking. With the SQLite backend an append reads the
//! group maximum and inserts under one write lock, and the two writes of a
//! swap commit together. The neighbor lookup that precedes a swap runs
//! outside that transaction, so two processes moving items in the same group
//! at the same moment can still interleave.

use crate::backend::{Backend, Direction, Slot};
use crate::model::{FieldId, GroupKey, Item, ItemId, NewItem, PayloadError, Taxis};
use tracing::{debug, info};

/// Failure of an insert or update.
#[derive(Debug, thiserror::Error)]
pub enum WriteError<E: std::error::Error + 'static> {
    /// Name or value is over the length limit; nothing was written.
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Backend(E),
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The item traded places with `neighbor`, taking over its `taxis`.
    Swapped { neighbor: ItemId, taxis: Taxis },
    /// The item is already first or last in that direction.
    AtEdge,
    /// No such item in the requested group.
    Missing,
}

impl MoveOutcome {
    #[must_use]
    pub const fn is_swapped(self) -> bool {
        matches!(self, Self::Swapped { .. })
    }

    /// Stable lowercase label used in CLI and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Swapped { .. } => "swapped",
            Self::AtEdge => "at_edge",
            Self::Missing => "missing",
        }
    }
}

/// Ordered related-field items backed by `B`.
#[derive(Debug)]
pub struct OrderedItemStore<B> {
    backend: B,
}

impl<B: Backend> OrderedItemStore<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Append `item` to the end of `group` and return its new id.
    ///
    /// # Errors
    ///
    /// [`WriteError::Payload`] if the name or value is too long, otherwise
    /// backend failures.
    pub fn insert(
        &mut self,
        item: &NewItem,
        group: GroupKey,
    ) -> Result<ItemId, WriteError<B::Error>> {
        item.validate()?;
        let Slot { id, taxis } = self
            .backend
            .append(item, group)
            .map_err(WriteError::Backend)?;
        info!(id, group, taxis, field_id = item.field_id, "inserted item");
        Ok(id)
    }

    /// Overwrite the name and value of `item.id`.
    ///
    /// Group, field and `taxis` are left alone. Returns `false` when no item
    /// has that id.
    ///
    /// # Errors
    ///
    /// [`WriteError::Payload`] if the name or value is too long, otherwise
    /// backend failures.
    pub fn update(&mut self, item: &Item) -> Result<bool, WriteError<B::Error>> {
        item.validate()?;
        let found = self
            .backend
            .update_payload(item.id, &item.name, &item.value)
            .map_err(WriteError::Backend)?;
        if found {
            debug!(id = item.id, "updated item payload");
        } else {
            debug!(id = item.id, "update skipped, no such item");
        }
        Ok(found)
    }

    /// Remove one item. Siblings keep their `taxis`; other groups are
    /// untouched. Returns `false` when no item has that id.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn delete(&mut self, id: ItemId) -> Result<bool, B::Error> {
        let removed = self.backend.delete(id)?;
        if removed {
            info!(id, "deleted item");
        }
        Ok(removed)
    }

    /// Remove an item together with the items grouped directly under it.
    /// Returns how many rows were removed.
    ///
    /// Ids below 1 are never issued, and `0` is the top-level group key, so
    /// they remove nothing.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn delete_with_children(&mut self, id: ItemId) -> Result<usize, B::Error> {
        if id <= 0 {
            debug!(id, "delete skipped, not an item id");
            return Ok(0);
        }
        let removed = self.backend.delete_with_children(id)?;
        info!(id, removed, "deleted item with children");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn get(&self, id: ItemId) -> Result<Option<Item>, B::Error> {
        self.backend.get(id)
    }

    /// Items of `group` in ascending `taxis` order.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn list(&self, group: GroupKey) -> Result<Vec<Item>, B::Error> {
        self.backend.list(group, None)
    }

    /// Items of `group` that belong to `field`, in ascending `taxis` order.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn list_in_field(&self, field: FieldId, group: GroupKey) -> Result<Vec<Item>, B::Error> {
        self.backend.list(group, Some(field))
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn max_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, B::Error> {
        self.backend.max_taxis(group)
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn min_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, B::Error> {
        self.backend.min_taxis(group)
    }

    /// Swap `id` with its successor (next larger `taxis`) in `group`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn move_up(&mut self, id: ItemId, group: GroupKey) -> Result<MoveOutcome, B::Error> {
        self.shift(id, group, Direction::Successor)
    }

    /// Swap `id` with its predecessor (next smaller `taxis`) in `group`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn move_down(&mut self, id: ItemId, group: GroupKey) -> Result<MoveOutcome, B::Error> {
        self.shift(id, group, Direction::Predecessor)
    }

    fn shift(
        &mut self,
        id: ItemId,
        group: GroupKey,
        direction: Direction,
    ) -> Result<MoveOutcome, B::Error> {
        let Some(target) = self.backend.get(id)? else {
            debug!(id, group, "move skipped, no such item");
            return Ok(MoveOutcome::Missing);
        };
        if target.parent_id != group {
            debug!(
                id,
                group,
                actual_group = target.parent_id,
                "move skipped, item belongs to another group"
            );
            return Ok(MoveOutcome::Missing);
        }

        let Some(neighbor) = self.backend.neighbor(group, target.taxis, direction)? else {
            debug!(id, group, ?direction, "move skipped, item is at the edge");
            return Ok(MoveOutcome::AtEdge);
        };

        let slot = Slot {
            id,
            taxis: target.taxis,
        };
        self.backend.swap_taxis(slot, neighbor)?;
        info!(
            id,
            group,
            neighbor = neighbor.id,
            from = target.taxis,
            to = neighbor.taxis,
            "swapped taxis"
        );

        Ok(MoveOutcome::Swapped {
            neighbor: neighbor.id,
            taxis: neighbor.taxis,
        })
    }
}
