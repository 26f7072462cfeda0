use crate::output::{OutputMode, render_mode};
use crate::project;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use taxis_core::{FieldId, GroupKey, ItemId, NewItem, Taxis};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Group (parent id) to append the item to. `0` is the top level.
    #[arg(long, short, default_value_t = 0)]
    pub group: GroupKey,

    /// Related field the item belongs to.
    #[arg(long, short, default_value_t = 0)]
    pub field: FieldId,

    /// Item name (at most 255 characters).
    #[arg(long, short)]
    pub name: String,

    /// Item value (at most 255 characters).
    #[arg(long, default_value = "")]
    pub value: String,
}

#[derive(Debug, Serialize)]
struct Added {
    id: ItemId,
    group: GroupKey,
    field_id: FieldId,
    taxis: Taxis,
}

/// Execute `taxis add`: append a new item to the end of its group.
///
/// # Errors
///
/// Returns an error if the payload is too long, no project is found, or the
/// store rejects the insert.
pub fn run_add(args: &AddArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let item = NewItem::new(args.field, args.name.clone(), args.value.clone());

    let mut store = project::open(cwd, output)?;
    let id = match store.insert(&item, args.group) {
        Ok(id) => id,
        Err(err) => return project::write_failure(output, &err),
    };
    let taxis = match store.get(id) {
        Ok(Some(stored)) => stored.taxis,
        Ok(None) => return project::not_found(output, id),
        Err(err) => return project::store_failure(output, &err),
    };

    let added = Added {
        id,
        group: args.group,
        field_id: args.field,
        taxis,
    };
    render_mode(
        output,
        &added,
        |a, w| writeln!(w, "{}\t{}\t{}", a.id, a.group, a.taxis),
        |a, w| {
            writeln!(
                w,
                "✓ Added #{} to group {} at position {}",
                a.id, a.group, a.taxis
            )
        },
    )
}
