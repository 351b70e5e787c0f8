// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Experiment enumeration
//!
//! Each parameter is swept over its candidates while the others stay at their
//! defaults. Most sweeps also add a "no deletions" and a "no insertions"
//! variant. The deletion sweep runs against the largest table so that the
//! working set never drains. It has no "no deletions" variant, and the
//! insertion sweep has no "no insertions" variant.

use crate::error::Result;
use crate::experiment::{Experiment, Parameter};
use crate::params::ExperimentParams;
use std::collections::HashSet;

/// Ordered, de-duplicated list of experiments
#[derive(Debug, Default)]
struct ExperimentSet {
    seen: HashSet<Experiment>,
    list: Vec<Experiment>,
}

impl ExperimentSet {
    fn add(&mut self, exp: Experiment) {
        if self.seen.insert(exp) {
            self.list.push(exp);
        }
    }
}

/// Which churn variants a sweep adds next to each swept value
#[derive(Debug, Clone, Copy)]
struct Variants {
    no_deletions: bool,
    no_insertions: bool,
}

impl Variants {
    const BOTH: Variants = Variants {
        no_deletions: true,
        no_insertions: true,
    };
}

fn sweep(
    set: &mut ExperimentSet,
    params: &ExperimentParams,
    base: Experiment,
    param: Parameter,
    variants: Variants,
) -> Result<()> {
    for value in params.candidates(param) {
        let exp = base.with(param, value)?;
        set.add(exp);
        if variants.no_deletions {
            set.add(exp.with(Parameter::Deletions, 0)?);
        }
        if variants.no_insertions {
            set.add(exp.with(Parameter::Insertions, 0)?);
        }
    }
    Ok(())
}

/// Build the full list of distinct experiments, in generation order
pub fn experiment_list(params: &ExperimentParams) -> Result<Vec<Experiment>> {
    let mut set = ExperimentSet::default();
    let base = params.default_experiment();

    sweep(&mut set, params, base, Parameter::Attributes, Variants::BOTH)?;
    sweep(&mut set, params, base, Parameter::Tuples, Variants::BOTH)?;

    let largest = base.with(Parameter::Tuples, params.tuples_max() as i64)?;
    sweep(
        &mut set,
        params,
        largest,
        Parameter::Deletions,
        Variants {
            no_deletions: false,
            no_insertions: true,
        },
    )?;
    sweep(
        &mut set,
        params,
        base,
        Parameter::Insertions,
        Variants {
            no_deletions: true,
            no_insertions: false,
        },
    )?;

    for param in [
        Parameter::Rules,
        Parameter::Level,
        Parameter::Indifferent,
        Parameter::Top,
    ] {
        sweep(&mut set, params, base, param, Variants::BOTH)?;
    }

    Ok(set.list)
}
