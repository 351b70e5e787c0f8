// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Run command - executes every experiment with every algorithm
//!
//! Each (run, algorithm, experiment) triple is executed once: when its detail
//! file already holds results the engine is not invoked again. An empty detail
//! file left by a crashed engine does not count as results. Runs are strictly
//! sequential so the timings do not disturb each other.

use crate::common::HarnessContext;
use crate::external::ExternalTool;
use anyhow::Result;
use diagnostics::*;

/// What happened to the experiment runs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Engine invocations that produced a detail file
    pub completed: usize,
    /// Triples whose detail file was already present
    pub skipped: usize,
    /// Invocations after which no usable detail file was found
    pub missing: usize,
}

/// Whether `path` is a non-empty file
pub fn has_results(path: &std::path::Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Engine command line arguments for one run
pub fn engine_args(
    algorithm: &str,
    env_file: &std::path::Path,
    detail_file: &std::path::Path,
    iterations: usize,
) -> Vec<String> {
    vec![
        "-p".to_string(),
        algorithm.to_string(),
        "-e".to_string(),
        env_file.display().to_string(),
        "-d".to_string(),
        detail_file.display().to_string(),
        "-m".to_string(),
        iterations.to_string(),
    ]
}

pub fn run_command(ctx: &HarnessContext, engine: &mut dyn ExternalTool) -> Result<RunReport> {
    let experiments = ctx.prepare()?;
    let params = &ctx.params;
    let mut report = RunReport::default();

    for run in 1..=params.run_count {
        for algorithm in &params.algorithms {
            let algorithm = algorithm.as_str();
            for exp in &experiments {
                let detail = ctx.layout.detail_file(algorithm, exp, run);
                if has_results(&detail) {
                    report.skipped += 1;
                    continue;
                }

                let args = engine_args(
                    algorithm,
                    &ctx.layout.env_file(exp),
                    &detail,
                    params.iterations,
                );
                let id = exp.experiment_id();
                info!("Run {run}: {algorithm} on {id}");
                if let Err(e) = engine.invoke(&params.engine, &args) {
                    let reason = format!("{:#}", e);
                    error!("Engine invocation failed: {reason}");
                }

                if has_results(&detail) {
                    report.completed += 1;
                } else {
                    let path = detail.display().to_string();
                    let engine_name = params.engine.clone();
                    warn!("Detail results file missing or empty: {path}; check that {engine_name} is in PATH");
                    report.missing += 1;
                }
            }
        }
    }

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Runs: {} completed, {} already done, {} without results",
            report.completed, report.skipped, report.missing
        );
    }
    Ok(report)
}
