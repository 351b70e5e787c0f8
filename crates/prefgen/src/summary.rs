// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Summaries of engine results
//!
//! The engine writes one detail file per (algorithm, experiment, run) with a
//! `runtime` and a `memory` column per iteration. Summaries collapse every
//! detail file into one runtime and one memory figure and lay them out as one
//! CSV per swept parameter: a key column holding the parameter value, then one
//! column per algorithm, one row per (value, run). The external confidence
//! interval tool turns each summary into a result file.

use crate::error::{PrefGenError, Result};
use crate::experiment::{Experiment, Parameter};
use crate::layout::Layout;
use crate::params::ExperimentParams;
use arrow_array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use diagnostics::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const RUNTIME_COLUMN: &str = "runtime";
pub const MEMORY_COLUMN: &str = "memory";
/// Key column of the iterations summary
pub const ALGORITHM_KEY: &str = "algorithm";
pub const FIRST_COLUMN: &str = "first";
pub const OTHERS_COLUMN: &str = "others";
/// Base name of the first-iteration versus later-iterations summary
pub const ITERATIONS_NAME: &str = "iterations";

/// Runtime and memory of one iteration, or an aggregate of several
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub runtime: f64,
    pub memory: f64,
}

impl Measurement {
    pub const MISSING: Measurement = Measurement {
        runtime: f64::NAN,
        memory: f64::NAN,
    };

    pub fn is_missing(&self) -> bool {
        self.runtime.is_nan() && self.memory.is_nan()
    }
}

fn column_index(schema: &Schema, name: &str) -> Option<usize> {
    schema
        .fields()
        .iter()
        .position(|field| field.name().trim() == name)
}

fn parse_value(path: &Path, column: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    text.parse::<f64>()
        .map_err(|_| PrefGenError::InvalidMeasurement {
            path: path.to_path_buf(),
            column: column.to_string(),
            value: text.to_string(),
        })
}

/// Non-blank value of a text cell
fn string_value(column: &StringArray, row: usize) -> Option<&str> {
    (!column.is_null(row))
        .then(|| column.value(row))
        .filter(|text| !text.trim().is_empty())
}

/// Read every iteration of a detail file.
///
/// Header names and values may carry surrounding whitespace. An empty file
/// has no iterations, and rows cut short by an interrupted engine are dropped.
pub fn read_detail<P: AsRef<Path>>(path: P) -> Result<Vec<Measurement>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }

    // Only the header names matter; every column is read as text
    let format = arrow_csv::reader::Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(&mut file, Some(0))?;
    file.rewind()?;

    let schema = Schema::new(
        inferred
            .fields()
            .iter()
            .map(|field| Field::new(field.name().trim(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let runtime_idx = column_index(&schema, RUNTIME_COLUMN)
        .ok_or_else(|| PrefGenError::missing_column(path, RUNTIME_COLUMN))?;
    let memory_idx = column_index(&schema, MEMORY_COLUMN)
        .ok_or_else(|| PrefGenError::missing_column(path, MEMORY_COLUMN))?;

    let reader = arrow_csv::ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_truncated_rows(true)
        .build(file)?;

    let mut measurements = Vec::new();
    for batch in reader {
        let batch = batch?;
        let runtime = batch
            .column(runtime_idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| PrefGenError::missing_column(path, RUNTIME_COLUMN))?;
        let memory = batch
            .column(memory_idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| PrefGenError::missing_column(path, MEMORY_COLUMN))?;
        for row in 0..batch.num_rows() {
            let (Some(runtime), Some(memory)) =
                (string_value(runtime, row), string_value(memory, row))
            else {
                let file = path.display().to_string();
                debug!("Dropping incomplete row {row} of {file}");
                continue;
            };
            measurements.push(Measurement {
                runtime: parse_value(path, RUNTIME_COLUMN, runtime)?,
                memory: parse_value(path, MEMORY_COLUMN, memory)?,
            });
        }
    }
    Ok(measurements)
}

/// Iterations of a detail file, or None when it is absent or unreadable
fn read_existing(path: &Path) -> Option<Vec<Measurement>> {
    let file = path.display().to_string();
    if !path.is_file() {
        warn!("Detail file does not exist: {file}");
        return None;
    }
    match read_detail(path) {
        Ok(rows) => Some(rows),
        Err(e) => {
            let reason = e.to_string();
            warn!("Ignoring unreadable detail file {file}: {reason}");
            None
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Total runtime and mean memory of a detail file; NaN when it is missing or empty
pub fn detail_totals<P: AsRef<Path>>(path: P) -> Result<Measurement> {
    let Some(rows) = read_existing(path.as_ref()) else {
        return Ok(Measurement::MISSING);
    };
    if rows.is_empty() {
        return Ok(Measurement::MISSING);
    }
    Ok(Measurement {
        runtime: rows.iter().map(|m| m.runtime).sum(),
        memory: mean(rows.iter().map(|m| m.memory)),
    })
}

/// The first iteration of a detail file, or the mean of all later iterations
pub fn detail_average<P: AsRef<Path>>(path: P, first_only: bool) -> Result<Measurement> {
    let Some(rows) = read_existing(path.as_ref()) else {
        return Ok(Measurement::MISSING);
    };
    let Some((first, others)) = rows.split_first() else {
        return Ok(Measurement::MISSING);
    };
    if first_only {
        return Ok(*first);
    }
    Ok(Measurement {
        runtime: mean(others.iter().map(|m| m.runtime)),
        memory: mean(others.iter().map(|m| m.memory)),
    })
}

/// Summary file base name: the parameter key plus churn suffixes
pub fn summary_basename(param: Parameter, exp: &Experiment) -> String {
    let mut name = param.key().to_string();
    if param != Parameter::Deletions && exp.deletions == 0 {
        name.push_str("_no_del");
    }
    if param != Parameter::Insertions && exp.insertions == 0 {
        name.push_str("_no_ins");
    }
    name
}

/// One line of a summary file
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: String,
    pub values: BTreeMap<String, f64>,
}

impl SummaryRow {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: key.into(),
            values: BTreeMap::new(),
        }
    }
}

/// Write rows as CSV: the key column first, then the value columns sorted by name
pub fn write_summary<P: AsRef<Path>>(path: P, key_column: &str, rows: &[SummaryRow]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let names: Vec<&String> = first.values.keys().collect();

    let mut fields = vec![Field::new(key_column, DataType::Utf8, false)];
    fields.extend(names.iter().map(|name| Field::new(name.as_str(), DataType::Float64, true)));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
        rows.iter().map(|row| row.key.as_str()),
    ))];
    for name in &names {
        columns.push(Arc::new(Float64Array::from_iter(
            rows.iter().map(|row| row.values.get(*name).copied()),
        )));
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

    let file = File::create(path.as_ref())?;
    let mut writer = arrow_csv::WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;
    Ok(())
}

/// Runtime and memory summaries of one parameter sweep around `base`
pub fn summarize_parameter(
    layout: &Layout,
    params: &ExperimentParams,
    param: Parameter,
    base: &Experiment,
) -> Result<()> {
    let mut time_rows = Vec::new();
    let mut memory_rows = Vec::new();

    for value in params.candidates(param) {
        let exp = base.with(param, value)?;
        for run in 1..=params.run_count {
            let mut time_row = SummaryRow::new(value.to_string());
            let mut memory_row = SummaryRow::new(value.to_string());
            for algorithm in &params.algorithms {
                let totals = detail_totals(layout.detail_file(algorithm, &exp, run))?;
                time_row.values.insert(algorithm.clone(), totals.runtime);
                memory_row.values.insert(algorithm.clone(), totals.memory);
            }
            time_rows.push(time_row);
            memory_rows.push(memory_row);
        }
    }

    let name = format!("{}.csv", summary_basename(param, base));
    let key = param.key();
    write_summary(layout.runtime_summary_dir().join(&name), key, &time_rows)?;
    write_summary(layout.memory_summary_dir().join(&name), key, &memory_rows)?;
    debug!("Wrote summary {name}");
    Ok(())
}

/// First iteration versus later iterations of the default experiment, per algorithm
pub fn summarize_iterations(layout: &Layout, params: &ExperimentParams) -> Result<()> {
    let exp = params.default_experiment();
    let mut time_rows = Vec::new();
    let mut memory_rows = Vec::new();

    for run in 1..=params.run_count {
        for algorithm in &params.algorithms {
            let path = layout.detail_file(algorithm, &exp, run);
            let first = detail_average(&path, true)?;
            let others = detail_average(&path, false)?;

            let mut time_row = SummaryRow::new(algorithm.clone());
            time_row.values.insert(FIRST_COLUMN.to_string(), first.runtime);
            time_row.values.insert(OTHERS_COLUMN.to_string(), others.runtime);
            let mut memory_row = SummaryRow::new(algorithm.clone());
            memory_row.values.insert(FIRST_COLUMN.to_string(), first.memory);
            memory_row.values.insert(OTHERS_COLUMN.to_string(), others.memory);

            time_rows.push(time_row);
            memory_rows.push(memory_row);
        }
    }

    let name = format!("{}.csv", ITERATIONS_NAME);
    write_summary(layout.runtime_summary_dir().join(&name), ALGORITHM_KEY, &time_rows)?;
    write_summary(layout.memory_summary_dir().join(&name), ALGORITHM_KEY, &memory_rows)?;
    Ok(())
}

/// Every summary: each parameter at the defaults, without deletions and without
/// insertions, the deletion sweep on the largest table, and the iterations summary
pub fn summarize_all(layout: &Layout, params: &ExperimentParams) -> Result<()> {
    let base = params.default_experiment();
    let swept: Vec<Parameter> = Parameter::ALL
        .into_iter()
        .filter(|p| *p != Parameter::Deletions)
        .collect();

    for param in &swept {
        summarize_parameter(layout, params, *param, &base)?;
    }

    let no_deletions = base.with(Parameter::Deletions, 0)?;
    for param in &swept {
        summarize_parameter(layout, params, *param, &no_deletions)?;
    }

    let no_insertions = base.with(Parameter::Insertions, 0)?;
    for param in swept.iter().filter(|p| **p != Parameter::Insertions) {
        summarize_parameter(layout, params, *param, &no_insertions)?;
    }

    let largest = base.with(Parameter::Tuples, params.tuples_max() as i64)?;
    summarize_parameter(layout, params, Parameter::Deletions, &largest)?;
    let largest_no_insertions = largest.with(Parameter::Insertions, 0)?;
    summarize_parameter(layout, params, Parameter::Deletions, &largest_no_insertions)?;

    summarize_iterations(layout, params)?;
    info!("Summaries written");
    Ok(())
}

/// One confidence interval computation over a summary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidenceJob {
    pub key: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Confidence interval jobs for every summary, runtime before memory
pub fn confidence_jobs(layout: &Layout) -> Vec<ConfidenceJob> {
    let mut names: Vec<(String, String)> = Vec::new();
    for param in Parameter::ALL {
        names.push((param.key().to_string(), param.key().to_string()));
    }
    for param in Parameter::ALL.into_iter().filter(|p| *p != Parameter::Deletions) {
        names.push((param.key().to_string(), format!("{}_no_del", param.key())));
    }
    for param in Parameter::ALL.into_iter().filter(|p| *p != Parameter::Insertions) {
        names.push((param.key().to_string(), format!("{}_no_ins", param.key())));
    }
    names.push((ALGORITHM_KEY.to_string(), ITERATIONS_NAME.to_string()));

    let mut jobs = Vec::with_capacity(names.len() * 2);
    for (key, name) in names {
        let file = format!("{}.csv", name);
        jobs.push(ConfidenceJob {
            key: key.clone(),
            input: layout.runtime_summary_dir().join(&file),
            output: layout.runtime_result_dir().join(&file),
        });
        jobs.push(ConfidenceJob {
            key,
            input: layout.memory_summary_dir().join(&file),
            output: layout.memory_result_dir().join(&file),
        });
    }
    jobs
}
