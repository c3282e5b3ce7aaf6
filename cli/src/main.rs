use clap::{Parser, Subcommand};
use lapwatch_cli::commands;
use lapwatch_cli::readline;
use lapwatch_cli::CliContext;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let ctx = CliContext::new();
    ctx.service.load().await;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Parser)]
#[command(version, about = "multi-stopwatch board")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty watch
    Add,
    /// Remove a watch and stop its ticking
    Remove {
        #[arg(short, long)]
        id: u64,
    },
    /// Start a stopped watch or pause a running one
    Toggle {
        #[arg(short, long)]
        id: u64,
    },
    /// Zero a watch
    Reset {
        #[arg(short, long)]
        id: u64,
    },
    /// Set a watch label
    Label {
        #[arg(short, long)]
        id: u64,
        #[arg(short, long)]
        text: String,
    },
    /// Set a watch goal, e.g. "30min" or "2.5h"
    Goal {
        #[arg(short, long)]
        id: u64,
        #[arg(short, long)]
        text: String,
    },
    /// Show all watches
    List,
    /// Dry-run the goal parser
    ParseGoal {
        #[arg(short, long)]
        text: String,
    },
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "lapwatch".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Add) => commands::add_watch(ctx).await,
        Some(Commands::Remove { id }) => commands::remove(ctx, *id).await,
        Some(Commands::Toggle { id }) => commands::toggle(ctx, *id).await,
        Some(Commands::Reset { id }) => commands::reset(ctx, *id).await,
        Some(Commands::Label { id, text }) => commands::set_label(ctx, *id, text).await,
        Some(Commands::Goal { id, text }) => commands::set_goal(ctx, *id, text).await,
        Some(Commands::List) => commands::list(ctx).await,
        Some(Commands::ParseGoal { text }) => commands::check_goal(text),
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
