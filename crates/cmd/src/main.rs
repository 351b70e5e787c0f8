// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::HarnessContext;
use cmd::external::ProcessTool;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "prefgen")]
struct Cli {
    /// Experiment workspace directory (overrides PREFGEN_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// YAML parameter file; built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the random tuple values, for reproducible tables
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate tables, queries and environment files
    Gen,
    /// Run every experiment with every algorithm
    Run,
    /// Summarize detail results and compute confidence intervals
    Summarize,
    /// List experiment identifiers
    List {
        /// Only show identifiers containing this text
        pattern: Option<String>,
    },
    /// Write the default parameter file
    InitConfig {
        /// Where to write the YAML file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();

    if let Commands::InitConfig { path } = &cli.command {
        return commands::init_config_command(path);
    }

    let ctx = HarnessContext::new(cli.root, cli.config.as_deref(), cli.seed)?;
    match &cli.command {
        Commands::Gen => commands::generate_command(&ctx).map(|_| ()),
        Commands::Run => commands::run_command(&ctx, &mut ProcessTool).map(|_| ()),
        Commands::Summarize => commands::summarize_command(&ctx, &mut ProcessTool).map(|_| ()),
        Commands::List { pattern } => commands::list_command(&ctx, pattern.as_deref()),
        Commands::InitConfig { .. } => Ok(()),
    }
}
