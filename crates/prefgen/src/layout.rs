// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Directory layout of an experiment workspace
//!
//! ```text
//! {root}/data             table streams, {table_id}.csv
//! {root}/queries          preference queries, {query_id}.cql
//! {root}/env              engine environments, {experiment_id}.env
//! {root}/details          engine output, {alg}-{experiment_id}.{run}.csv
//! {root}/runtime_summary  per-parameter runtime summaries
//! {root}/memory_summary   per-parameter memory summaries
//! {root}/runtime_result   confidence intervals of runtime summaries
//! {root}/memory_result    confidence intervals of memory summaries
//! ```

use crate::error::Result;
use crate::experiment::{Experiment, detail_file_name};
use diagnostics::*;
use std::path::{Path, PathBuf};

/// Default workspace directory name
pub const DEFAULT_ROOT: &str = "streampref";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn queries_dir(&self) -> PathBuf {
        self.root.join("queries")
    }

    pub fn env_dir(&self) -> PathBuf {
        self.root.join("env")
    }

    pub fn details_dir(&self) -> PathBuf {
        self.root.join("details")
    }

    pub fn runtime_summary_dir(&self) -> PathBuf {
        self.root.join("runtime_summary")
    }

    pub fn memory_summary_dir(&self) -> PathBuf {
        self.root.join("memory_summary")
    }

    pub fn runtime_result_dir(&self) -> PathBuf {
        self.root.join("runtime_result")
    }

    pub fn memory_result_dir(&self) -> PathBuf {
        self.root.join("memory_result")
    }

    /// Every directory of the workspace, root first
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.clone(),
            self.details_dir(),
            self.runtime_summary_dir(),
            self.memory_summary_dir(),
            self.runtime_result_dir(),
            self.memory_result_dir(),
            self.queries_dir(),
            self.data_dir(),
            self.env_dir(),
        ]
    }

    /// Create the missing workspace directories
    pub fn create_directories(&self) -> Result<()> {
        for dir in self.directories() {
            if !dir.is_dir() {
                let path = dir.display().to_string();
                debug!("Creating directory {path}");
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }

    pub fn table_file(&self, exp: &Experiment) -> PathBuf {
        self.data_dir().join(format!("{}.csv", exp.table_id()))
    }

    pub fn query_file(&self, exp: &Experiment) -> PathBuf {
        self.queries_dir().join(format!("{}.cql", exp.query_id()))
    }

    pub fn env_file(&self, exp: &Experiment) -> PathBuf {
        self.env_dir().join(format!("{}.env", exp.experiment_id()))
    }

    pub fn detail_file(&self, algorithm: &str, exp: &Experiment, run: usize) -> PathBuf {
        self.details_dir()
            .join(detail_file_name(algorithm, exp, run))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ExperimentParams;

    #[test]
    fn test_file_names_follow_identifiers() {
        let layout = Layout::new("/tmp/work");
        let exp = ExperimentParams::default().default_experiment();
        assert_eq!(
            layout.table_file(&exp),
            PathBuf::from("/tmp/work/data/att8tup1000del50ins50.csv")
        );
        assert_eq!(
            layout.query_file(&exp),
            PathBuf::from("/tmp/work/queries/rul8lev2ind4best.cql")
        );
        assert_eq!(
            layout.env_file(&exp),
            PathBuf::from("/tmp/work/env/att8tup1000del50ins50rul8lev2ind4best.env")
        );
        assert_eq!(
            layout.detail_file("partition", &exp, 1),
            PathBuf::from("/tmp/work/details/partition-att8tup1000del50ins50rul8lev2ind4best.1.csv")
        );
    }

    #[test]
    fn test_create_directories_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let layout = Layout::new(tmp.path().join("streampref"));
        layout.create_directories().expect("first");
        layout.create_directories().expect("second");
        for dir in layout.directories() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
    }
}
