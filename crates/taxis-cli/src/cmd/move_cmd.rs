use crate::output::{CliError, OutputMode, fail, render_mode};
use crate::project;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use taxis_core::error::ErrorCode;
use taxis_core::{GroupKey, ItemId, MoveOutcome, Taxis};

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Item id to move.
    pub id: ItemId,

    /// Group the item is expected in. Defaults to the item's own group.
    #[arg(long, short)]
    pub group: Option<GroupKey>,
}

/// Which neighbor to trade places with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Toward larger `taxis` values.
    Up,
    /// Toward smaller `taxis` values.
    Down,
}

#[derive(Debug, Serialize)]
struct Moved {
    id: ItemId,
    group: GroupKey,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighbor: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    taxis: Option<Taxis>,
}

/// Execute `taxis up` / `taxis down`.
///
/// Reaching the end of the group is reported, not treated as a failure.
///
/// # Errors
///
/// Returns an error if the item is not in the requested group or the store
/// fails.
pub fn run_move(args: &MoveArgs, shift: Shift, output: OutputMode, cwd: &Path) -> Result<()> {
    let mut store = project::open(cwd, output)?;

    let group = match args.group {
        Some(group) => group,
        None => match store.get(args.id) {
            Ok(Some(item)) => item.parent_id,
            Ok(None) => return project::not_found(output, args.id),
            Err(err) => return project::store_failure(output, &err),
        },
    };

    let result = match shift {
        Shift::Up => store.move_up(args.id, group),
        Shift::Down => store.move_down(args.id, group),
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return project::store_failure(output, &err),
    };

    let (neighbor, taxis) = match outcome {
        MoveOutcome::Swapped { neighbor, taxis } => (Some(neighbor), Some(taxis)),
        MoveOutcome::AtEdge => (None, None),
        MoveOutcome::Missing => {
            return fail(
                output,
                &CliError::with_code(
                    ErrorCode::ItemNotFound,
                    format!("item {} not found in group {group}", args.id),
                )
                .suggest(format!("use `taxis ls --group {group}` to see its items")),
            );
        }
    };

    let moved = Moved {
        id: args.id,
        group,
        outcome: outcome.label(),
        neighbor,
        taxis,
    };
    let edge = match shift {
        Shift::Up => "last",
        Shift::Down => "first",
    };
    render_mode(
        output,
        &moved,
        |m, w| {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                m.id,
                m.outcome,
                m.neighbor.map_or_else(String::new, |n| n.to_string()),
                m.taxis.map_or_else(String::new, |t| t.to_string()),
            )
        },
        |m, w| match (m.neighbor, m.taxis) {
            (Some(neighbor), Some(taxis)) => writeln!(
                w,
                "✓ Swapped #{} with #{neighbor}; #{} is now at position {taxis}",
                m.id, m.id
            ),
            _ => writeln!(w, "#{} is already {edge} in group {}", m.id, m.group),
        },
    )
}
