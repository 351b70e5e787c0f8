// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod generate;
pub mod init_config;
pub mod list;
pub mod run;
pub mod summarize;

pub use generate::generate_command;
pub use init_config::init_config_command;
pub use list::{list_command, list_experiments};
pub use run::{RunReport, run_command};
pub use summarize::{SummarizeReport, summarize_command};
