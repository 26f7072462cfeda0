use crate::output::{OutputMode, pretty_rule, render_list};
use crate::project;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;
use taxis_core::{FieldId, GroupKey};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Group (parent id) to list. `0` is the top level.
    #[arg(long, short, default_value_t = 0)]
    pub group: GroupKey,

    /// Only show items of this related field.
    #[arg(long, short)]
    pub field: Option<FieldId>,
}

/// Execute `taxis ls`: print one group in ascending position order.
///
/// # Errors
///
/// Returns an error if no project is found or the store fails.
pub fn run_list(args: &ListArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let store = project::open(cwd, output)?;
    let listed = match args.field {
        Some(field) => store.list_in_field(field, args.group),
        None => store.list(args.group),
    };
    let items = match listed {
        Ok(items) => items,
        Err(err) => return project::store_failure(output, &err),
    };
    tracing::debug!(group = args.group, count = items.len(), "listed group");

    if output == OutputMode::Pretty {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match args.field {
            Some(field) => writeln!(out, "group {} · field {field}", args.group)?,
            None => writeln!(out, "group {}", args.group)?,
        }
        pretty_rule(&mut out)?;
        if items.is_empty() {
            writeln!(out, "(no items)")?;
            return Ok(());
        }
    }

    render_list(&items, output)?;
    Ok(())
}
