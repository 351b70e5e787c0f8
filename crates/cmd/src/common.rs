// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use prefgen::{Experiment, ExperimentParams, Layout, experiment_list};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Environment variable naming the experiment workspace directory
pub const ROOT_ENV: &str = "PREFGEN_ROOT";

/// Get the workspace root with an optional override, falling back to PREFGEN_ROOT
/// and then to the default `streampref` directory
pub fn get_root_with_override(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    env::var(ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(prefgen::layout::DEFAULT_ROOT))
}

/// Everything a command needs: where to work, what to vary, how to draw values
pub struct HarnessContext {
    pub layout: Layout,
    pub params: ExperimentParams,
    pub seed: Option<u64>,
}

impl HarnessContext {
    pub fn new(root: Option<PathBuf>, config: Option<&Path>, seed: Option<u64>) -> Result<Self> {
        let params = match config {
            Some(path) => ExperimentParams::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExperimentParams::default(),
        };
        Ok(Self {
            layout: Layout::new(get_root_with_override(root)),
            params,
            seed,
        })
    }

    /// Create the workspace directories and enumerate the experiments
    pub fn prepare(&self) -> Result<Vec<Experiment>> {
        self.layout.create_directories().with_context(|| {
            format!(
                "Failed to create workspace directories under {}",
                self.layout.root().display()
            )
        })?;
        Ok(experiment_list(&self.params)?)
    }

    /// Seeded random source when a seed was given, entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
