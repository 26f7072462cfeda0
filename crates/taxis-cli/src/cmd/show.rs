use crate::output::{OutputMode, pretty_item, render_item, render_list};
use crate::project;
use anyhow::Result;
use clap::Args;
use std::path::Path;
use taxis_core::ItemId;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item id to display.
    pub id: ItemId,
}

/// Execute `taxis show <id>`.
///
/// # Errors
///
/// Returns an error if the item does not exist or the store fails.
pub fn run_show(args: &ShowArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let store = project::open(cwd, output)?;
    let item = match store.get(args.id) {
        Ok(Some(item)) => item,
        Ok(None) => return project::not_found(output, args.id),
        Err(err) => return project::store_failure(output, &err),
    };

    match output {
        OutputMode::Pretty => pretty_item(&mut std::io::stdout().lock(), &item)?,
        // header plus one row, same shape as `taxis ls`
        OutputMode::Text => render_list(std::slice::from_ref(&item), output)?,
        OutputMode::Json => render_item(&item, output)?,
    }
    Ok(())
}
