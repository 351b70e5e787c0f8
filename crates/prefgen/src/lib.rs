// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! PrefGen - workload generator for StreamPref preference-query experiments
//!
//! Enumerates experiment configurations, generates the insert/delete table
//! streams and preference queries each experiment needs, and summarizes the
//! engine's result files.

pub mod artifacts;
pub mod enumerate;
pub mod error;
pub mod experiment;
pub mod layout;
pub mod params;
pub mod rules;
pub mod summary;
pub mod tuples;

pub use artifacts::{GenerationReport, TableOutcome, build_table, generate_all};
pub use enumerate::experiment_list;
pub use error::{PrefGenError, Result};
pub use experiment::{Experiment, Parameter, TopK};
pub use layout::Layout;
pub use params::ExperimentParams;
pub use rules::{PreferenceRule, compile_rules, query_text};
pub use tuples::{Batch, Operation, Record, TableStream, generate_deletions, generate_inserts};
