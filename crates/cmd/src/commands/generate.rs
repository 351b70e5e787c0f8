// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Generate command - writes table data, queries and engine environments
//!
//! Tables that already exist are kept, so an interrupted generation can be
//! resumed by running the command again.

use crate::common::HarnessContext;
use anyhow::{Context, Result};
use diagnostics::*;
use prefgen::{GenerationReport, generate_all};

pub fn generate_command(ctx: &HarnessContext) -> Result<GenerationReport> {
    let experiments = ctx.prepare()?;
    let count = experiments.len();
    info!("Generating artifacts for {count} experiments");

    let mut rng = ctx.rng();
    let report = generate_all(&ctx.layout, &experiments, &ctx.params, &mut rng)
        .context("Failed to generate experiment artifacts")?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Tables: {} generated, {} already present",
            report.tables_generated, report.tables_cached
        );
        println!("Queries: {}", report.queries);
        println!("Environments: {}", report.environments);
    }
    Ok(report)
}
