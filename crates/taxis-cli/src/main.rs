#![forbid(unsafe_code)]

mod cmd;
mod output;
mod project;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::move_cmd::Shift;
use output::OutputMode;
use std::env;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "taxis: ordered related-field items with swap-based reordering",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output (same as `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, user_output: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, user_output)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a taxis project",
        long_about = "Create .taxis/ with a default config and an empty, migrated store.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    taxis init\n\n    # Rewrite the config of an existing project\n    taxis init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Write",
        about = "Append an item to a group",
        long_about = "Insert an item at the end of its group (position = current max + 1).",
        after_help = "EXAMPLES:\n    # Add a top-level item\n    taxis add --name Zhejiang --value zj\n\n    # Add a child of item 1 under field 2\n    taxis add --group 1 --field 2 --name Hangzhou\n\n    # Emit machine-readable output\n    taxis add --name Zhejiang --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Write",
        about = "Change an item's name or value",
        long_about = "Replace an item's name and/or value. Its position and group are unchanged.",
        after_help = "EXAMPLES:\n    # Rename item 3\n    taxis edit 3 --name Suzhou\n\n    # Change only the value\n    taxis edit 3 --value sz"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one item",
        after_help = "EXAMPLES:\n    # Show item 3\n    taxis show 3\n\n    # Emit machine-readable output\n    taxis show 3 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        name = "ls",
        next_help_heading = "Read",
        about = "List a group in order",
        long_about = "List the items of one group in ascending position order.",
        after_help = "EXAMPLES:\n    # List the top level\n    taxis ls\n\n    # List children of item 1 that belong to field 2\n    taxis ls --group 1 --field 2\n\n    # Tab-separated output for scripts\n    taxis ls --group 1 --format text"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Reorder",
        about = "Swap an item with the next one in its group",
        long_about = "Swap an item's position with the item holding the next larger position in the same group.",
        after_help = "EXAMPLES:\n    # Move item 3 up within its own group\n    taxis up 3\n\n    # Require that item 3 is in group 1\n    taxis up 3 --group 1"
    )]
    Up(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Reorder",
        about = "Swap an item with the previous one in its group",
        long_about = "Swap an item's position with the item holding the next smaller position in the same group.",
        after_help = "EXAMPLES:\n    # Move item 3 down within its own group\n    taxis down 3\n\n    # Emit machine-readable output\n    taxis down 3 --json"
    )]
    Down(cmd::move_cmd::MoveArgs),

    #[command(
        name = "rm",
        next_help_heading = "Write",
        about = "Remove an item",
        long_about = "Remove an item. Other items keep their positions; gaps are not closed.",
        after_help = "EXAMPLES:\n    # Remove item 3\n    taxis rm 3\n\n    # Remove item 1 and the items directly under it\n    taxis rm 1 --children"
    )]
    Rm(cmd::rm::RmArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    taxis completions bash\n\n    # Generate zsh completions\n    taxis completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TAXIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taxis=debug,info"
        } else {
            "taxis=info,warn"
        })
    });

    let format = env::var("TAXIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = taxis_core::config::load_user_config().unwrap_or_else(|err| {
        warn!("ignoring user config: {err:#}");
        taxis_core::config::UserConfig::default()
    });
    let output = cli.output_mode(user_config.output.as_deref());
    debug!(?output, "resolved output mode");

    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &cwd),
        Commands::Add(ref args) => cmd::add::run_add(args, output, &cwd),
        Commands::Edit(ref args) => cmd::edit::run_edit(args, output, &cwd),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &cwd),
        Commands::List(ref args) => cmd::list::run_list(args, output, &cwd),
        Commands::Up(ref args) => cmd::move_cmd::run_move(args, Shift::Up, output, &cwd),
        Commands::Down(ref args) => cmd::move_cmd::run_move(args, Shift::Down, output, &cwd),
        Commands::Rm(ref args) => cmd::rm::run_rm(args, output, &cwd),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
