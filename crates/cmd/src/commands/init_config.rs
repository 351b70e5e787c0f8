// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use diagnostics::*;
use prefgen::ExperimentParams;

/// Write the default parameter file to `path`, refusing to replace an existing one
pub fn init_config_command(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(anyhow!("Config file already exists: {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let yaml = ExperimentParams::default().to_yaml()?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

    let written = path.display().to_string();
    info!("Wrote default parameters to {written}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_round_trips() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("conf").join("params.yaml");
        init_config_command(&path).expect("init");

        let params = ExperimentParams::load(&path).expect("load");
        assert_eq!(params, ExperimentParams::default());

        assert!(init_config_command(&path).is_err(), "must not overwrite");
    }
}
