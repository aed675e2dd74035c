// ebgctl/src/main.rs

mod check;
mod uninit;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::uninit::UninitArgs;
use crate::utils::init_log_level;

#[derive(Parser)]
#[command(name = "ebgctl", version, about = "Ext block-group administration", long_about = None)]
struct Cli {
    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark empty block groups as uninitialized
    Uninit {
        /// Target filesystem image or block device
        filesystem: PathBuf,

        /// First group to convert (group 0 never qualifies)
        start_group: Option<u32>,

        /// Last group to convert (default: the last group)
        end_group: Option<u32>,

        /// Only report what would change, don't write
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Report every group, not just the summary
        #[arg(short, long)]
        verbose: bool,

        /// Convert groups even when they hold data
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the superblock and group descriptors
    Check {
        /// Target filesystem image or block device
        filesystem: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Uninit {
            filesystem,
            start_group,
            end_group,
            dry_run,
            verbose,
            force,
        } => {
            init_log_level(quiet, verbose);
            uninit::run(&UninitArgs {
                filesystem,
                start_group,
                end_group,
                dry_run,
                force,
            })
        }
        Commands::Check { filesystem } => {
            init_log_level(quiet, false);
            check::run(&filesystem)
        }
    }
}
