// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Experiment parameter space
//!
//! Candidate lists and defaults for every swept parameter, plus the knobs of
//! the run harness. Built once (defaults or YAML) and passed by reference.
//!
//! ## Example config
//!
//! ```yaml
//! max_value: 63
//! iterations: 100
//! attributes: [8, 16, 32, 64]
//! attributes_default: 8
//! tuples: [500, 1000, 2000, 4000, 8000]
//! tuples_default: 1000
//! deletions: [50, 100, 200, 400]
//! deletions_default: 50
//! insertions: [50, 100, 200, 400]
//! insertions_default: 50
//! rules: [2, 4, 8, 16, 32]
//! rules_default: 8
//! levels: [1, 2, 4, 8]
//! level_default: 2
//! indifferent: [0, 1, 2, 4]
//! indifferent_default: 4
//! top: [-1, 125, 250, 500, 1000]
//! top_default: -1
//! algorithms: [inc_ancestors, inc_graph, inc_partition, partition]
//! run_count: 5
//! engine: streampref
//! confidence_tool: confinterval.py
//! ```

use crate::enumerate::experiment_list;
use crate::error::{PrefGenError, Result};
use crate::experiment::{Experiment, Parameter, TopK};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentParams {
    /// Largest attribute value; also the wrap bound of rule conditions
    pub max_value: u32,
    /// Number of timestamps in every generated table
    pub iterations: usize,

    pub attributes: Vec<usize>,
    pub attributes_default: usize,
    pub tuples: Vec<usize>,
    pub tuples_default: usize,
    pub deletions: Vec<usize>,
    pub deletions_default: usize,
    pub insertions: Vec<usize>,
    pub insertions_default: usize,
    pub rules: Vec<usize>,
    pub rules_default: usize,
    pub levels: Vec<usize>,
    pub level_default: usize,
    pub indifferent: Vec<usize>,
    pub indifferent_default: usize,
    pub top: Vec<TopK>,
    pub top_default: TopK,

    /// Engine algorithms compared in every run
    pub algorithms: Vec<String>,
    /// Repetitions of each (algorithm, experiment) pair
    pub run_count: usize,
    /// Engine executable
    pub engine: String,
    /// Confidence interval executable
    pub confidence_tool: String,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            max_value: 63,
            iterations: 100,
            attributes: vec![8, 16, 32, 64],
            attributes_default: 8,
            tuples: vec![500, 1000, 2000, 4000, 8000],
            tuples_default: 1000,
            deletions: vec![50, 100, 200, 400],
            deletions_default: 50,
            insertions: vec![50, 100, 200, 400],
            insertions_default: 50,
            rules: vec![2, 4, 8, 16, 32],
            rules_default: 8,
            levels: vec![1, 2, 4, 8],
            level_default: 2,
            indifferent: vec![0, 1, 2, 4],
            indifferent_default: 4,
            top: vec![
                TopK::Best,
                TopK::Top(125),
                TopK::Top(250),
                TopK::Top(500),
                TopK::Top(1000),
            ],
            top_default: TopK::Best,
            algorithms: ["inc_ancestors", "inc_graph", "inc_partition", "partition"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            run_count: 5,
            engine: "streampref".to_string(),
            confidence_tool: "confinterval.py".to_string(),
        }
    }
}

impl ExperimentParams {
    /// Load and validate parameters from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| PrefGenError::ConfigFile {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let params: ExperimentParams = serde_yaml_ng::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// The experiment with every parameter at its default
    pub fn default_experiment(&self) -> Experiment {
        Experiment {
            attributes: self.attributes_default,
            tuples: self.tuples_default,
            deletions: self.deletions_default,
            insertions: self.insertions_default,
            rules: self.rules_default,
            level: self.level_default,
            indifferent: self.indifferent_default,
            top: self.top_default,
        }
    }

    /// Largest candidate tuple count
    pub fn tuples_max(&self) -> usize {
        self.tuples
            .iter()
            .copied()
            .max()
            .unwrap_or(self.tuples_default)
    }

    /// Candidate values of `param`, as used in sweeps and summary files
    pub fn candidates(&self, param: Parameter) -> Vec<i64> {
        match param {
            Parameter::Attributes => as_i64(&self.attributes),
            Parameter::Tuples => as_i64(&self.tuples),
            Parameter::Deletions => as_i64(&self.deletions),
            Parameter::Insertions => as_i64(&self.insertions),
            Parameter::Rules => as_i64(&self.rules),
            Parameter::Level => as_i64(&self.levels),
            Parameter::Indifferent => as_i64(&self.indifferent),
            Parameter::Top => self.top.iter().map(|t| i64::from(*t)).collect(),
        }
    }

    /// Reject parameter sets the generators cannot handle
    pub fn validate(&self) -> Result<()> {
        for param in Parameter::ALL {
            if self.candidates(param).is_empty() {
                return Err(PrefGenError::config(format!(
                    "candidate list for '{}' is empty",
                    param.key()
                )));
            }
        }
        if self.iterations == 0 {
            return Err(PrefGenError::config("iterations must be greater than 0"));
        }
        if self.run_count == 0 {
            return Err(PrefGenError::config("run_count must be greater than 0"));
        }
        if self.algorithms.is_empty() {
            return Err(PrefGenError::config("at least one algorithm is required"));
        }
        if self.algorithms.iter().any(|a| a.trim().is_empty()) {
            return Err(PrefGenError::config("algorithm names cannot be empty"));
        }
        if self.engine.trim().is_empty() || self.confidence_tool.trim().is_empty() {
            return Err(PrefGenError::config("external tool names cannot be empty"));
        }

        for exp in experiment_list(self)? {
            exp.validate()?;
        }
        Ok(())
    }
}

fn as_i64(values: &[usize]) -> Vec<i64> {
    values.iter().map(|v| *v as i64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = ExperimentParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.tuples_max(), 8000);
        assert_eq!(params.candidates(Parameter::Top), vec![-1, 125, 250, 500, 1000]);
    }

    #[test]
    fn test_yaml_round_trip() {
        let params = ExperimentParams::default();
        let yaml = params.to_yaml().expect("serialize");
        assert!(yaml.contains("top_default: -1"));
        let parsed = ExperimentParams::from_yaml(&yaml).expect("parse");
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_missing_key_fails() {
        let yaml = ExperimentParams::default()
            .to_yaml()
            .expect("serialize")
            .lines()
            .filter(|line| !line.starts_with("iterations:"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = ExperimentParams::from_yaml(&yaml).expect_err("missing key");
        assert!(err.to_string().contains("iterations"), "{}", err);
    }

    #[test]
    fn test_invalid_top_fails() {
        let yaml = ExperimentParams::default()
            .to_yaml()
            .expect("serialize")
            .replace("top_default: -1", "top_default: -7");
        assert!(ExperimentParams::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_validate_rejects_narrow_tables() {
        let params = ExperimentParams {
            attributes: vec![4, 8],
            ..ExperimentParams::default()
        };
        // Four attributes cannot hold the default four indifferent attributes
        assert!(matches!(
            params.validate(),
            Err(PrefGenError::InvalidExperiment { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_lists() {
        let params = ExperimentParams {
            rules: vec![],
            ..ExperimentParams::default()
        };
        assert!(matches!(params.validate(), Err(PrefGenError::Config(_))));

        let params = ExperimentParams {
            iterations: 0,
            ..ExperimentParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ExperimentParams::load(dir.path().join("nope.yaml")).expect_err("missing");
        assert!(matches!(err, PrefGenError::ConfigFile { .. }));
    }
}
