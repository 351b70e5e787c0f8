// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Experiment configurations and the identifiers derived from them.
//!
//! Identifiers double as file names and cache keys, so they must stay stable
//! across runs. The table id only depends on the fields that shape the data
//! stream and the query id only on the fields that shape the query, which lets
//! many experiments share one table file or one query file.

use crate::error::{PrefGenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-k value that selects the plain BEST operator
pub const BEST_SENTINEL: i64 = -1;

/// Result cardinality bound of a preference query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TopK {
    /// Unbounded, only the best tuples
    Best,
    /// At most `n` tuples, n > 0
    Top(usize),
}

impl TryFrom<i64> for TopK {
    type Error = PrefGenError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            BEST_SENTINEL => Ok(TopK::Best),
            n if n > 0 => Ok(TopK::Top(n as usize)),
            _ => Err(PrefGenError::ParameterValue { key: "top", value }),
        }
    }
}

impl From<TopK> for i64 {
    fn from(top: TopK) -> i64 {
        match top {
            TopK::Best => BEST_SENTINEL,
            TopK::Top(n) => n as i64,
        }
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopK::Best => write!(f, "best"),
            TopK::Top(n) => write!(f, "top{}", n),
        }
    }
}

/// The swept fields of an experiment, in identifier order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parameter {
    Attributes,
    Tuples,
    Deletions,
    Insertions,
    Rules,
    Level,
    Indifferent,
    Top,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::Attributes,
        Parameter::Tuples,
        Parameter::Deletions,
        Parameter::Insertions,
        Parameter::Rules,
        Parameter::Level,
        Parameter::Indifferent,
        Parameter::Top,
    ];

    /// Short key used in identifiers and summary file names
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Attributes => "att",
            Parameter::Tuples => "tup",
            Parameter::Deletions => "del",
            Parameter::Insertions => "ins",
            Parameter::Rules => "rul",
            Parameter::Level => "lev",
            Parameter::Indifferent => "ind",
            Parameter::Top => "top",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One experiment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Experiment {
    pub attributes: usize,
    pub tuples: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub rules: usize,
    pub level: usize,
    pub indifferent: usize,
    pub top: TopK,
}

/// Name of the i-th (zero based) attribute
pub fn attribute_name(index: usize) -> String {
    format!("A{}", index + 1)
}

impl Experiment {
    /// Check the constraints the generators rely on
    pub fn validate(&self) -> Result<()> {
        // Rules condition on A1 and A2, prefer on A3, and list A4.. as indifferent
        let needed = 3 + self.indifferent;
        if self.attributes < needed {
            return Err(self.invalid(format!(
                "{} attributes cannot hold A1-A3 plus {} indifferent attributes",
                self.attributes, self.indifferent
            )));
        }
        if self.level == 0 {
            return Err(self.invalid("preference level must be at least 1"));
        }
        Ok(())
    }

    fn invalid<S: Into<String>>(&self, reason: S) -> PrefGenError {
        PrefGenError::InvalidExperiment {
            id: self.experiment_id(),
            reason: reason.into(),
        }
    }

    /// Copy of this experiment with `param` set to `value`
    pub fn with(mut self, param: Parameter, value: i64) -> Result<Self> {
        let count = || {
            usize::try_from(value).map_err(|_| PrefGenError::ParameterValue {
                key: param.key(),
                value,
            })
        };
        match param {
            Parameter::Attributes => self.attributes = count()?,
            Parameter::Tuples => self.tuples = count()?,
            Parameter::Deletions => self.deletions = count()?,
            Parameter::Insertions => self.insertions = count()?,
            Parameter::Rules => self.rules = count()?,
            Parameter::Level => self.level = count()?,
            Parameter::Indifferent => self.indifferent = count()?,
            Parameter::Top => self.top = TopK::try_from(value)?,
        }
        Ok(self)
    }

    /// Identifier of the table data; depends on attributes, tuples, deletions, insertions
    pub fn table_id(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}{}",
            Parameter::Attributes.key(),
            self.attributes,
            Parameter::Tuples.key(),
            self.tuples,
            Parameter::Deletions.key(),
            self.deletions,
            Parameter::Insertions.key(),
            self.insertions,
        )
    }

    /// Identifier of the query; depends on rules, level, indifferent, top
    pub fn query_id(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}",
            Parameter::Rules.key(),
            self.rules,
            Parameter::Level.key(),
            self.level,
            Parameter::Indifferent.key(),
            self.indifferent,
            self.top,
        )
    }

    pub fn experiment_id(&self) -> String {
        self.table_id() + &self.query_id()
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table_id(), self.query_id())
    }
}

/// File name of the engine's detail output for one run of one algorithm
pub fn detail_file_name(algorithm: &str, exp: &Experiment, run: usize) -> String {
    format!("{}-{}.{}.csv", algorithm, exp.experiment_id(), run)
}
