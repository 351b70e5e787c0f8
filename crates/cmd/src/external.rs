// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Invocation of the external programs the harness drives: the StreamPref
//! engine and the confidence interval tool.

use anyhow::{Context, Result};
use diagnostics::*;
use std::process::Command;

/// Something that can run an external program to completion
pub trait ExternalTool {
    /// Run `program` with `args`; Ok(false) when it ran but reported failure
    fn invoke(&mut self, program: &str, args: &[String]) -> Result<bool>;
}

/// Runs programs as child processes, inheriting stdio
#[derive(Debug, Default)]
pub struct ProcessTool;

impl ExternalTool for ProcessTool {
    fn invoke(&mut self, program: &str, args: &[String]) -> Result<bool> {
        let command_line = format!("{} {}", program, args.join(" "));
        debug!("Running {command_line}");

        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to start '{}', check that it is in PATH", program))?;

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            warn!("Command exited with status {code}: {command_line}");
        }
        Ok(status.success())
    }
}
