// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Preference rule compiler
//!
//! Rules have the shape
//! `IF A1 = c1 AND A2 = c2 THEN A3 = best BETTER A3 = worst [indifferent]`.
//! Consecutive rules under the same condition pair form a chain of preferred
//! values 1 > 2 > 3 > ... of length `level`. Once a chain is complete the
//! condition on A2 advances; when A2 runs past the maximum attribute value the
//! condition on A1 advances (wrapping back to 1) and A2 restarts at 1.

use crate::experiment::{Experiment, TopK, attribute_name};
use std::fmt;

/// Indifferent attributes A4..A(3+count) of every rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indifferent {
    count: usize,
}

impl Indifferent {
    /// First indifferent attribute is A4
    const FIRST_INDEX: usize = 3;

    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn names(&self) -> Vec<String> {
        (Self::FIRST_INDEX..Self::FIRST_INDEX + self.count)
            .map(attribute_name)
            .collect()
    }
}

impl fmt::Display for Indifferent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return Ok(());
        }
        write!(f, "[{}]", self.names().join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceRule {
    pub cond1: u32,
    pub cond2: u32,
    pub best: usize,
    pub worst: usize,
    pub indifferent: Indifferent,
}

impl fmt::Display for PreferenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IF A1 = {} AND A2 = {} THEN A3 = {} BETTER A3 = {} {}",
            self.cond1, self.cond2, self.best, self.worst, self.indifferent
        )
    }
}

/// Endless, deterministic sequence of preference rules
#[derive(Debug, Clone)]
pub struct RuleSequence {
    level: usize,
    max_value: u32,
    indifferent: Indifferent,
    current_level: usize,
    cond1: u32,
    cond2: u32,
    pref_value: usize,
}

impl RuleSequence {
    pub fn new(level: usize, indifferent: usize, max_value: u32) -> Self {
        Self {
            level,
            max_value,
            indifferent: Indifferent::new(indifferent),
            current_level: 0,
            cond1: 1,
            cond2: 1,
            pref_value: 1,
        }
    }
}

impl Iterator for RuleSequence {
    type Item = PreferenceRule;

    fn next(&mut self) -> Option<PreferenceRule> {
        let rule = PreferenceRule {
            cond1: self.cond1,
            cond2: self.cond2,
            best: self.pref_value,
            worst: self.pref_value + 1,
            indifferent: self.indifferent,
        };

        // Advance the state for the following rule
        self.pref_value += 1;
        self.current_level += 1;
        if self.current_level == self.level {
            self.current_level = 0;
            self.pref_value = 1;
            self.cond2 += 1;
        }
        if self.cond2 > self.max_value {
            self.cond1 += 1;
            if self.cond1 > self.max_value {
                self.cond1 = 1;
            }
            self.cond2 = 1;
        }

        Some(rule)
    }
}

/// The first `rules` rules for the given level depth and indifferent count
pub fn compile_rules(
    rules: usize,
    level: usize,
    indifferent: usize,
    max_value: u32,
) -> Vec<PreferenceRule> {
    RuleSequence::new(level, indifferent, max_value)
        .take(rules)
        .collect()
}

/// Conjunction of rendered rules
pub fn preference_clause(rules: &[PreferenceRule]) -> String {
    rules
        .iter()
        .map(|rule| rule.to_string())
        .collect::<Vec<_>>()
        .join("\nAND\n")
}

/// Full query text for an experiment
pub fn query_text(exp: &Experiment, max_value: u32) -> String {
    let rules = compile_rules(exp.rules, exp.level, exp.indifferent, max_value);
    let topk = match exp.top {
        TopK::Best => String::new(),
        TopK::Top(n) => format!("TOP({})", n),
    };
    format!(
        "SELECT {} * FROM r\nACCORDING TO PREFERENCES\n{};",
        topk,
        preference_clause(&rules)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(rules: &[PreferenceRule]) -> Vec<(u32, u32, usize, usize)> {
        rules
            .iter()
            .map(|r| (r.cond1, r.cond2, r.best, r.worst))
            .collect()
    }

    #[test]
    fn test_two_level_chains() {
        let rules = compile_rules(4, 2, 0, 63);
        assert_eq!(
            tuples(&rules),
            vec![(1, 1, 1, 2), (1, 1, 2, 3), (1, 2, 1, 2), (1, 2, 2, 3)]
        );
    }

    #[test]
    fn test_single_level_advances_every_rule() {
        let rules = compile_rules(3, 1, 0, 63);
        assert_eq!(
            tuples(&rules),
            vec![(1, 1, 1, 2), (1, 2, 1, 2), (1, 3, 1, 2)]
        );
    }

    #[test]
    fn test_cond2_wraps_into_cond1() {
        let max = 63usize;
        let rules = compile_rules(max * max + 2, 1, 0, 63);

        assert_eq!((rules[max - 1].cond1, rules[max - 1].cond2), (1, 63));
        assert_eq!((rules[max].cond1, rules[max].cond2), (2, 1));
        assert_eq!((rules[2 * max].cond1, rules[2 * max].cond2), (3, 1));

        // cond1 advances once per 63 values of cond2
        for (i, rule) in rules.iter().take(max * max).enumerate() {
            assert_eq!(rule.cond1 as usize, i / max + 1);
            assert_eq!(rule.cond2 as usize, i % max + 1);
        }

        // and wraps back to 1 after 63
        assert_eq!((rules[max * max].cond1, rules[max * max].cond2), (1, 1));
        assert_eq!((rules[max * max + 1].cond1, rules[max * max + 1].cond2), (1, 2));
    }

    #[test]
    fn test_small_max_value_wrap() {
        let rules = compile_rules(6, 1, 0, 2);
        assert_eq!(
            tuples(&rules)
                .iter()
                .map(|(c1, c2, _, _)| (*c1, *c2))
                .collect::<Vec<_>>(),
            vec![(1, 1), (1, 2), (2, 1), (2, 2), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn test_indifferent_rendering() {
        assert_eq!(Indifferent::new(0).to_string(), "");
        assert_eq!(Indifferent::new(2).to_string(), "[A4, A5]");
        assert_eq!(Indifferent::new(4).names(), vec!["A4", "A5", "A6", "A7"]);
    }

    #[test]
    fn test_rule_rendering() {
        let rules = compile_rules(2, 2, 1, 63);
        assert_eq!(
            rules[0].to_string(),
            "IF A1 = 1 AND A2 = 1 THEN A3 = 1 BETTER A3 = 2 [A4]"
        );
        let plain = compile_rules(1, 2, 0, 63);
        assert_eq!(
            plain[0].to_string(),
            "IF A1 = 1 AND A2 = 1 THEN A3 = 1 BETTER A3 = 2 "
        );
        assert_eq!(
            preference_clause(&rules),
            "IF A1 = 1 AND A2 = 1 THEN A3 = 1 BETTER A3 = 2 [A4]\nAND\n\
             IF A1 = 1 AND A2 = 1 THEN A3 = 2 BETTER A3 = 3 [A4]"
        );
    }

    #[test]
    fn test_query_text() {
        let exp = Experiment {
            attributes: 8,
            tuples: 4,
            deletions: 0,
            insertions: 0,
            rules: 2,
            level: 1,
            indifferent: 0,
            top: TopK::Best,
        };
        assert_eq!(
            query_text(&exp, 63),
            "SELECT  * FROM r\nACCORDING TO PREFERENCES\n\
             IF A1 = 1 AND A2 = 1 THEN A3 = 1 BETTER A3 = 2 \nAND\n\
             IF A1 = 1 AND A2 = 2 THEN A3 = 1 BETTER A3 = 2 ;"
        );

        let bounded = Experiment {
            top: TopK::Top(125),
            ..exp
        };
        assert!(query_text(&bounded, 63).starts_with("SELECT TOP(125) * FROM r\n"));
    }
}
