//! Item records and the logical-to-physical column map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned item identifier.
pub type ItemId = i64;
/// Parent key partitioning items into independently ordered groups.
pub type GroupKey = i64;
/// Related field an item belongs to.
pub type FieldId = i64;
/// Ordering key, ascending within a group.
pub type Taxis = i64;

/// Maximum length, in characters, of an item's name or value.
pub const MAX_PAYLOAD_CHARS: usize = 255;

/// Physical table holding related-field items.
pub const TABLE: &str = "related_field_items";

/// A persisted related-field item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub field_id: FieldId,
    pub parent_id: GroupKey,
    pub taxis: Taxis,
    pub name: String,
    pub value: String,
}

/// Payload for an item that has not been inserted yet.
///
/// The group and `taxis` are decided at insert time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub field_id: FieldId,
    pub name: String,
    pub value: String,
}

impl NewItem {
    #[must_use]
    pub fn new(field_id: FieldId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_id,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Check payload lengths against [`MAX_PAYLOAD_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::TooLong`] naming the first offending column.
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_payload(&self.name, &self.value)
    }
}

impl Item {
    /// Check payload lengths against [`MAX_PAYLOAD_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::TooLong`] naming the first offending column.
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_payload(&self.name, &self.value)
    }
}

fn check_payload(name: &str, value: &str) -> Result<(), PayloadError> {
    for (column, text) in [(Column::Name, name), (Column::Value, value)] {
        let len = text.chars().count();
        if len > MAX_PAYLOAD_CHARS {
            return Err(PayloadError::TooLong { column, len });
        }
    }
    Ok(())
}

/// Rejected item payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("{column} is {len} characters, limit is {max}", max = MAX_PAYLOAD_CHARS)]
    TooLong { column: Column, len: usize },
}

/// Logical item fields and the physical column each one is stored in.
///
/// Every SQL statement the SQLite backend issues names columns through this
/// table, so renaming a column is a one-line change here plus a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    FieldId,
    ParentId,
    Taxis,
    Name,
    Value,
}

impl Column {
    /// All columns, in the order rows are selected and decoded.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::FieldId,
        Self::ParentId,
        Self::Taxis,
        Self::Name,
        Self::Value,
    ];

    /// Physical column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FieldId => "field_id",
            Self::ParentId => "parent_id",
            Self::Taxis => "taxis",
            Self::Name => "item_name",
            Self::Value => "item_value",
        }
    }

    /// Comma-separated select list covering [`Column::ALL`].
    #[must_use]
    pub fn select_list() -> String {
        Self::ALL
            .iter()
            .map(|column| column.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn column_names_are_unique() {
        let mut seen = HashSet::new();
        for column in Column::ALL {
            assert!(seen.insert(column.name()), "duplicate column {column}");
        }
    }

    #[test]
    fn select_list_follows_decode_order() {
        assert_eq!(
            Column::select_list(),
            "id, field_id, parent_id, taxis, item_name, item_value"
        );
    }

    #[test]
    fn payload_at_limit_is_accepted() {
        let item = NewItem::new(1, "n".repeat(MAX_PAYLOAD_CHARS), "v");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn payload_limit_counts_characters_not_bytes() {
        // 255 three-byte characters: over the byte count, within the limit.
        let item = NewItem::new(1, "标".repeat(MAX_PAYLOAD_CHARS), "");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn oversized_value_is_rejected() {
        let item = NewItem::new(1, "ok", "x".repeat(MAX_PAYLOAD_CHARS + 1));
        assert_eq!(
            item.validate(),
            Err(PayloadError::TooLong {
                column: Column::Value,
                len: MAX_PAYLOAD_CHARS + 1,
            })
        );
    }
}
