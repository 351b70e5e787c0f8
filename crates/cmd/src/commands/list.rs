// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::HarnessContext;

/// Experiment ids in enumeration order, optionally restricted to a substring
pub fn list_experiments(ctx: &HarnessContext, pattern: Option<&str>) -> Result<Vec<String>> {
    let experiments = prefgen::experiment_list(&ctx.params)?;
    Ok(experiments
        .iter()
        .map(|exp| exp.experiment_id())
        .filter(|id| pattern.is_none_or(|p| id.contains(p)))
        .collect())
}

pub fn list_command(ctx: &HarnessContext, pattern: Option<&str>) -> Result<()> {
    let ids = list_experiments(ctx, pattern)?;
    #[allow(clippy::print_stdout)]
    {
        for id in &ids {
            println!("{}", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefgen::{ExperimentParams, Layout};

    #[test]
    fn test_list_filters_by_pattern() {
        let ctx = HarnessContext {
            layout: Layout::default(),
            params: ExperimentParams::default(),
            seed: None,
        };
        let all = list_experiments(&ctx, None).expect("list");
        assert_eq!(all.len(), 78);
        assert_eq!(all[0], "att8tup1000del50ins50rul8lev2ind4best");

        let no_deletions = list_experiments(&ctx, Some("del0ins")).expect("list");
        assert!(!no_deletions.is_empty());
        assert!(no_deletions.iter().all(|id| id.contains("del0ins")));
    }
}
