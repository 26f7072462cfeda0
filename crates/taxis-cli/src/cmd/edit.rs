use crate::output::{OutputMode, pretty_item, render};
use crate::project;
use anyhow::Result;
use clap::{ArgGroup, Args};
use std::path::Path;
use taxis_core::ItemId;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("payload")
        .required(true)
        .multiple(true)
        .args(["name", "value"])
))]
pub struct EditArgs {
    /// Item id to edit.
    pub id: ItemId,

    /// New item name.
    #[arg(long, short)]
    pub name: Option<String>,

    /// New item value.
    #[arg(long)]
    pub value: Option<String>,
}

/// Execute `taxis edit`: replace an item's name and/or value.
///
/// Position, group, and field are never touched.
///
/// # Errors
///
/// Returns an error if the item does not exist, the new payload is too long,
/// or the store fails.
pub fn run_edit(args: &EditArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let mut store = project::open(cwd, output)?;

    let mut item = match store.get(args.id) {
        Ok(Some(item)) => item,
        Ok(None) => return project::not_found(output, args.id),
        Err(err) => return project::store_failure(output, &err),
    };
    if let Some(name) = &args.name {
        item.name.clone_from(name);
    }
    if let Some(value) = &args.value {
        item.value.clone_from(value);
    }

    match store.update(&item) {
        Ok(true) => {}
        // removed by another process between the read and the write
        Ok(false) => return project::not_found(output, args.id),
        Err(err) => return project::write_failure(output, &err),
    }

    render(output, &item, |item, w| pretty_item(w, item))
}
