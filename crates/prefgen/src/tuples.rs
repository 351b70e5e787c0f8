// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Synthetic tuple streams
//!
//! A table evolves over `iterations` timestamps. Timestamp 0 inserts the
//! initial tuples; every later timestamp first deletes `deletions` random live
//! tuples and then inserts `insertions` fresh ones. Only these deltas are
//! written out; the live working set exists only while the stream runs.

use crate::experiment::Experiment;
use diagnostics::*;
use rand::Rng;
use rand::seq::SliceRandom;

/// One synthetic tuple; values are A1..An in order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    values: Vec<u32>,
}

impl Record {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Operation tag of a batch, written to the `_FL` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Delete,
}

impl Operation {
    pub fn tag(self) -> &'static str {
        match self {
            Operation::Insert => "+",
            Operation::Delete => "-",
        }
    }
}

/// Records inserted or deleted at one timestamp
#[derive(Debug, Clone)]
pub struct Batch {
    pub timestamp: usize,
    pub operation: Operation,
    pub records: Vec<Record>,
}

/// Generate `count` records of `attributes` uniform values in [0, max_value]
pub fn generate_inserts<R: Rng + ?Sized>(
    count: usize,
    attributes: usize,
    max_value: u32,
    rng: &mut R,
) -> Vec<Record> {
    (0..count)
        .map(|_| {
            Record::new(
                (0..attributes)
                    .map(|_| rng.gen_range(0..=max_value))
                    .collect(),
            )
        })
        .collect()
}

/// Pick `count` records of the working set at random.
///
/// Returns `(deleted, remaining)`. A request larger than the working set
/// deletes everything that is left.
pub fn generate_deletions<R: Rng + ?Sized>(
    mut working_set: Vec<Record>,
    count: usize,
    rng: &mut R,
) -> (Vec<Record>, Vec<Record>) {
    let available = working_set.len();
    if count > available {
        debug!("Deletion batch of {count} capped at {available} live records");
    }
    working_set.shuffle(rng);
    let remaining = working_set.split_off(count.min(available));
    (working_set, remaining)
}

#[derive(Debug, Clone, Copy)]
struct Step {
    timestamp: usize,
    operation: Operation,
}

/// Iterator over the batches of one table, maintaining the working set
pub struct TableStream<'a, R: Rng + ?Sized> {
    experiment: Experiment,
    max_value: u32,
    iterations: usize,
    rng: &'a mut R,
    working_set: Vec<Record>,
    next: Option<Step>,
}

impl<'a, R: Rng + ?Sized> TableStream<'a, R> {
    pub fn new(experiment: Experiment, max_value: u32, iterations: usize, rng: &'a mut R) -> Self {
        let next = (iterations > 0).then_some(Step {
            timestamp: 0,
            operation: Operation::Insert,
        });
        Self {
            experiment,
            max_value,
            iterations,
            rng,
            working_set: Vec::new(),
            next,
        }
    }

    /// Number of live records after the batches emitted so far
    pub fn working_set_len(&self) -> usize {
        self.working_set.len()
    }

    fn insert_count(&self, timestamp: usize) -> usize {
        if timestamp == 0 {
            self.experiment.tuples
        } else {
            self.experiment.insertions
        }
    }
}

impl<R: Rng + ?Sized> Iterator for TableStream<'_, R> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let step = self.next?;
        let records = match step.operation {
            Operation::Delete => {
                let live = std::mem::take(&mut self.working_set);
                let (deleted, remaining) =
                    generate_deletions(live, self.experiment.deletions, &mut *self.rng);
                self.working_set = remaining;
                self.next = Some(Step {
                    timestamp: step.timestamp,
                    operation: Operation::Insert,
                });
                deleted
            }
            Operation::Insert => {
                let inserted = generate_inserts(
                    self.insert_count(step.timestamp),
                    self.experiment.attributes,
                    self.max_value,
                    &mut *self.rng,
                );
                self.working_set.extend(inserted.iter().cloned());
                let timestamp = step.timestamp + 1;
                self.next = (timestamp < self.iterations).then_some(Step {
                    timestamp,
                    operation: Operation::Delete,
                });
                inserted
            }
        };
        Some(Batch {
            timestamp: step.timestamp,
            operation: step.operation,
            records,
        })
    }
}
