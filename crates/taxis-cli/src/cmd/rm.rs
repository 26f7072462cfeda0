use crate::output::{OutputMode, render};
use crate::project;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use taxis_core::ItemId;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Item id to remove.
    pub id: ItemId,

    /// Also remove the items grouped directly under this one.
    #[arg(long)]
    pub children: bool,
}

#[derive(Debug, Serialize)]
struct Removed {
    id: ItemId,
    removed: usize,
    children: usize,
}

/// Execute `taxis rm`. Remaining items keep their positions.
///
/// # Errors
///
/// Returns an error if the item does not exist or the store fails.
pub fn run_rm(args: &RmArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let mut store = project::open(cwd, output)?;

    match store.get(args.id) {
        Ok(Some(_)) => {}
        Ok(None) => return project::not_found(output, args.id),
        Err(err) => return project::store_failure(output, &err),
    }

    let result = if args.children {
        store.delete_with_children(args.id)
    } else {
        store.delete(args.id).map(usize::from)
    };
    let removed = match result {
        // removed by another process after the lookup
        Ok(0) => return project::not_found(output, args.id),
        Ok(removed) => removed,
        Err(err) => return project::store_failure(output, &err),
    };

    render(
        output,
        &Removed {
            id: args.id,
            removed,
            children: removed - 1,
        },
        |r, w| match r.children {
            0 => writeln!(w, "✓ Removed #{}", r.id),
            1 => writeln!(w, "✓ Removed #{} and 1 child", r.id),
            n => writeln!(w, "✓ Removed #{} and {n} children", r.id),
        },
    )
}
