//! Persistence collaborator used by [`OrderedItemStore`](crate::store::OrderedItemStore).
//!
//! A backend is a row store addressable by item id and queryable by group
//! and `taxis`. It knows nothing about ordering rules; those live in the
//! store. Errors are the backend's own and pass through the store unchanged.

use crate::model::{FieldId, GroupKey, Item, ItemId, NewItem, Taxis};

/// Neighbor search direction relative to a `taxis` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest `taxis` strictly greater than the pivot.
    Successor,
    /// Largest `taxis` strictly less than the pivot.
    Predecessor,
}

/// An item's id paired with its current `taxis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: ItemId,
    pub taxis: Taxis,
}

/// Row-level operations the ordering logic needs from storage.
pub trait Backend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one item by id.
    ///
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn get(&self, id: ItemId) -> Result<Option<Item>, Self::Error>;

    /// Largest `taxis` in `group`, `None` when the group is empty.
    ///
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn max_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, Self::Error>;

    /// Smallest `taxis` in `group`, `None` when the group is empty.
    ///
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn min_taxis(&self, group: GroupKey) -> Result<Option<Taxis>, Self::Error>;

    /// Closest item to `taxis` within `group` in the given direction.
    ///
    /// Ties (which the store never creates) resolve to the lowest id.
    ///
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn neighbor(
        &self,
        group: GroupKey,
        taxis: Taxis,
        direction: Direction,
    ) -> Result<Option<Slot>, Self::Error>;

    /// Items in `group` by ascending `taxis`, then id, optionally limited to
    /// one related field.
    ///
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn list(&self, group: GroupKey, field: Option<FieldId>) -> Result<Vec<Item>, Self::Error>;

    /// Persist a new row and return its assigned id.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn insert(
        &mut self,
        item: &NewItem,
        group: GroupKey,
        taxis: Taxis,
    ) -> Result<ItemId, Self::Error>;

    /// Persist `item` at the end of `group` (`max + 1`, or `1` when empty)
    /// and return where it landed.
    ///
    /// The default reads [`max_taxis`](Self::max_taxis) and then calls
    /// [`insert`](Self::insert). Backends shared between processes should run
    /// both steps under one write lock so concurrent appends get distinct
    /// positions.
    ///
    /// # Errors
    ///
    /// Backend-specific read or write failure.
    fn append(&mut self, item: &NewItem, group: GroupKey) -> Result<Slot, Self::Error> {
        let taxis = self.max_taxis(group)?.map_or(1, |max| max + 1);
        let id = self.insert(item, group, taxis)?;
        Ok(Slot { id, taxis })
    }

    /// Overwrite name and value of an existing row. `false` if `id` is unknown.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn update_payload(&mut self, id: ItemId, name: &str, value: &str)
    -> Result<bool, Self::Error>;

    /// Overwrite one row's `taxis`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn set_taxis(&mut self, id: ItemId, taxis: Taxis) -> Result<(), Self::Error>;

    /// Exchange the `taxis` values of two rows.
    ///
    /// The default issues two [`set_taxis`](Self::set_taxis) calls; backends
    /// with transactions should apply both writes atomically.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn swap_taxis(&mut self, a: Slot, b: Slot) -> Result<(), Self::Error> {
        self.set_taxis(a.id, b.taxis)?;
        self.set_taxis(b.id, a.taxis)
    }

    /// Remove one row. `false` if `id` is unknown.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn delete(&mut self, id: ItemId) -> Result<bool, Self::Error>;

    /// Remove the row `id` and every row whose group key is `id`.
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn delete_with_children(&mut self, id: ItemId) -> Result<usize, Self::Error>;
}
