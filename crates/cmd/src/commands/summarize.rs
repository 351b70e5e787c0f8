// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Summarize command - aggregates detail results and computes confidence intervals

use crate::common::HarnessContext;
use crate::external::ExternalTool;
use anyhow::{Context, Result};
use diagnostics::*;
use prefgen::summary::{ConfidenceJob, confidence_jobs, summarize_all};

/// Outcome of the confidence interval pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummarizeReport {
    pub intervals: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Confidence tool command line arguments for one summary
pub fn confidence_args(job: &ConfidenceJob) -> Vec<String> {
    vec![
        "-i".to_string(),
        job.input.display().to_string(),
        "-o".to_string(),
        job.output.display().to_string(),
        "-k".to_string(),
        job.key.clone(),
    ]
}

pub fn summarize_command(ctx: &HarnessContext, tool: &mut dyn ExternalTool) -> Result<SummarizeReport> {
    ctx.prepare()?;
    summarize_all(&ctx.layout, &ctx.params).context("Failed to summarize detail results")?;

    let mut report = SummarizeReport::default();
    for job in confidence_jobs(&ctx.layout) {
        if !job.input.is_file() {
            let input = job.input.display().to_string();
            debug!("No summary {input}, skipping");
            report.skipped += 1;
            continue;
        }

        let ok = match tool.invoke(&ctx.params.confidence_tool, &confidence_args(&job)) {
            Ok(ok) => ok,
            Err(e) => {
                let reason = format!("{:#}", e);
                error!("Confidence tool invocation failed: {reason}");
                false
            }
        };

        if ok && job.output.is_file() {
            report.intervals += 1;
        } else {
            let output = job.output.display().to_string();
            warn!("Confidence interval file not produced: {output}");
            report.failed += 1;
        }
    }

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Confidence intervals: {} written, {} skipped, {} failed",
            report.intervals, report.skipped, report.failed
        );
    }
    Ok(report)
}
