use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use upsync::git::Git2Repository;
use upsync::orchestrator::UpdateOrchestrator;
use upsync::{config, ui};

#[derive(Parser)]
#[command(
    name = "upsync",
    about = "Selectively pull upstream releases into a customized fork"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        help = "Path to the fork's working tree (defaults to the current directory)"
    )]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a newer upstream release exists
    Check,
    /// Stage the latest upstream release on a new update branch
    Apply,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let root = args.repo.unwrap_or_else(|| PathBuf::from("."));

    // Initialize git operations
    let repo = match Git2Repository::open(&root) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    let orchestrator = UpdateOrchestrator::new(&repo, &config, &root);

    match args.command {
        Command::Check => match orchestrator.check() {
            Ok(report) => ui::display_report("Update summary:", &report),
            Err(e) => {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
        },
        Command::Apply => match orchestrator.apply() {
            Ok(result) => ui::display_report("Update result:", &result),
            Err(e) => {
                ui::display_error(&format!("Update failed: {}", e));
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
