//! Canonical SQLite schema for the item store.
//!
//! - `related_field_items` holds every item; `parent_id` is the group key and
//!   `taxis` the ordering key within a group
//! - `store_meta` holds the schema version; every migration ends by writing
//!   its own number there
//!
//! Column names here must match [`Column::name`](crate::model::Column::name).

/// Migration v1: item table plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS related_field_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    field_id INTEGER NOT NULL DEFAULT 0,
    item_name TEXT NOT NULL DEFAULT '' CHECK (length(item_name) <= 255),
    item_value TEXT NOT NULL DEFAULT '' CHECK (length(item_value) <= 255),
    parent_id INTEGER NOT NULL DEFAULT 0,
    taxis INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT INTO store_meta (id, schema_version) VALUES (1, 1)
    ON CONFLICT (id) DO UPDATE SET schema_version = excluded.schema_version;
";

/// Migration v2: read-path indexes for neighbor lookup and field listings.
///
/// The group/taxis index is not UNIQUE: a swap writes its two rows one
/// statement at a time.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_parent_taxis
    ON related_field_items(parent_id, taxis);

CREATE INDEX IF NOT EXISTS idx_items_field_parent_taxis
    ON related_field_items(field_id, parent_id, taxis);

UPDATE store_meta SET schema_version = 2 WHERE id = 1;
";

/// Indexes every migrated store must have.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_items_parent_taxis",
    "idx_items_field_parent_taxis",
];
