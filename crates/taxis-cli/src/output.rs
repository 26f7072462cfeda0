//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var (`pretty` | `text` | `json`)
//! 3. `output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY, [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use taxis_core::Item;
use taxis_core::config::normalize_output_mode;
use taxis_core::error::{ErrorCode, OpenError};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 48;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<10} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output.
    Pretty,
    /// Tab-separated rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn from_name(raw: &str) -> Option<Self> {
        match normalize_output_mode(raw)? {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    user_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    // unknown values fall through to the next layer
    if let Some(mode) = format_env.and_then(OutputMode::from_name) {
        return mode;
    }
    if let Some(mode) = user_output.and_then(OutputMode::from_name) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, user config, and
/// TTY detection.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        user_output,
        is_tty,
    )
}

/// Implemented by result types that render in every mode.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as one self-contained JSON object.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row, fields in [`Renderable::table_headers`] order.
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a single [`Renderable`] to stdout.
pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Pretty => item.render_human(&mut out),
        OutputMode::Text => item.render_table(&mut out),
        OutputMode::Json => {
            item.render_json(&mut out)?;
            writeln!(out)
        }
    }
}

/// Render a list of [`Renderable`] items to stdout.
///
/// JSON mode emits one array; text mode prints a header row when the list is
/// non-empty.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(&mut out, items, mode)
}

fn write_list<R: Renderable>(out: &mut dyn Write, items: &[R], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            if !items.is_empty() && !R::table_headers().is_empty() {
                writeln!(out, "{}", R::table_headers().join("\t"))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            writeln!(out, "\n]")?;
        }
    }
    Ok(())
}

/// Render a serializable value with distinct text and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable `E####` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Error tagged with `code`, carrying its hint as the suggestion.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    #[must_use]
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&OpenError> for CliError {
    fn from(err: &OpenError) -> Self {
        Self::with_code(err.code(), err.to_string())
    }
}

impl From<&rusqlite::Error> for CliError {
    fn from(err: &rusqlite::Error) -> Self {
        let code = ErrorCode::from_sqlite(err);
        Self::with_code(code, format!("{}: {err}", code.message()))
    }
}

/// Render a serializable value to stdout; pretty and text share `human_fn`.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render `error` and return it as a failed command result.
pub fn fail<T>(mode: OutputMode, error: &CliError) -> anyhow::Result<T> {
    render_error(mode, error)?;
    Err(anyhow::anyhow!("{}", error.message))
}

impl Renderable for Item {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.value.is_empty() {
            writeln!(w, "{:>5}  #{:<6} {}", self.taxis, self.id, self.name)
        } else {
            writeln!(
                w,
                "{:>5}  #{:<6} {} = {}",
                self.taxis, self.id, self.name, self.value
            )
        }
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.id, self.parent_id, self.field_id, self.taxis, self.name, self.value
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "group", "field", "taxis", "name", "value"]
    }
}

/// Full detail view of one item for pretty output.
pub fn pretty_item(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    writeln!(w, "{}", item.name)?;
    pretty_rule(w)?;
    pretty_kv(w, "id", item.id.to_string())?;
    pretty_kv(w, "group", item.parent_id.to_string())?;
    pretty_kv(w, "field", item.field_id.to_string())?;
    pretty_kv(w, "taxis", item.taxis.to_string())?;
    pretty_kv(w, "value", &item.value)
}
