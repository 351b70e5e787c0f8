// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Writing generated tables, queries and engine environments
//!
//! Table files use the engine's stream format: a `_TS` timestamp column, a
//! `_FL` operation column (`+` insert, `-` delete) and the attributes A1..An.
//! Tables are expensive to produce and are never regenerated once present;
//! queries and environments are cheap and always rewritten.

use crate::error::Result;
use crate::experiment::{Experiment, attribute_name};
use crate::layout::Layout;
use crate::params::ExperimentParams;
use crate::rules::query_text;
use crate::tuples::{Batch, TableStream};
use arrow_array::{ArrayRef, RecordBatch, StringArray, UInt32Array, UInt64Array};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use diagnostics::*;
use rand::Rng;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

/// Timestamp column of table files
pub const TS_COLUMN: &str = "_TS";
/// Operation column of table files
pub const OP_COLUMN: &str = "_FL";

/// Schema of a table file with `attributes` attribute columns
pub fn table_schema(attributes: usize) -> SchemaRef {
    let mut fields = vec![
        Field::new(TS_COLUMN, DataType::UInt64, false),
        Field::new(OP_COLUMN, DataType::Utf8, false),
    ];
    fields.extend((0..attributes).map(|i| Field::new(attribute_name(i), DataType::UInt32, false)));
    Arc::new(Schema::new(fields))
}

fn to_record_batch(schema: &SchemaRef, attributes: usize, batch: &Batch) -> Result<RecordBatch> {
    let rows = batch.records.len();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(attributes + 2);
    columns.push(Arc::new(UInt64Array::from(vec![batch.timestamp as u64; rows])));
    columns.push(Arc::new(StringArray::from(vec![batch.operation.tag(); rows])));
    for i in 0..attributes {
        columns.push(Arc::new(UInt32Array::from_iter_values(
            batch.records.iter().map(|r| r.values()[i]),
        )));
    }
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

/// Appends batches to a table file, writing the header only into an empty file
pub struct TableWriter {
    schema: SchemaRef,
    attributes: usize,
    writer: arrow_csv::Writer<File>,
    rows: usize,
}

impl TableWriter {
    pub fn open<P: AsRef<Path>>(path: P, attributes: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let header = file.metadata()?.len() == 0;
        let writer = arrow_csv::WriterBuilder::new()
            .with_header(header)
            .build(file);
        Ok(Self {
            schema: table_schema(attributes),
            attributes,
            writer,
            rows: 0,
        })
    }

    /// Append one batch; empty batches leave the file untouched
    pub fn write(&mut self, batch: &Batch) -> Result<()> {
        if batch.records.is_empty() {
            return Ok(());
        }
        let record_batch = to_record_batch(&self.schema, self.attributes, batch)?;
        self.writer.write(&record_batch)?;
        self.rows += batch.records.len();
        Ok(())
    }

    /// Data rows written through this writer
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Result of a table build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Generated { rows: usize },
    /// The file already existed and was left alone
    Cached,
}

/// Generate the table stream of `exp` unless its file already exists
pub fn build_table<R: Rng + ?Sized>(
    layout: &Layout,
    exp: &Experiment,
    params: &ExperimentParams,
    rng: &mut R,
) -> Result<TableOutcome> {
    exp.validate()?;
    let path = layout.table_file(exp);
    let table_id = exp.table_id();
    if path.exists() {
        debug!("Table {table_id} exists, skipping");
        return Ok(TableOutcome::Cached);
    }

    File::create(&path)?;
    let mut writer = TableWriter::open(&path, exp.attributes)?;
    for batch in TableStream::new(*exp, params.max_value, params.iterations, rng) {
        writer.write(&batch)?;
    }

    let rows = writer.rows();
    info!("Generated table {table_id} with {rows} rows");
    Ok(TableOutcome::Generated { rows })
}

/// Write the query file of `exp`
pub fn write_query(layout: &Layout, exp: &Experiment, params: &ExperimentParams) -> Result<()> {
    exp.validate()?;
    std::fs::write(layout.query_file(exp), query_text(exp, params.max_value))?;
    Ok(())
}

/// Environment descriptor binding the table and query of `exp`
pub fn env_text(layout: &Layout, exp: &Experiment) -> String {
    let columns = (1..=exp.attributes)
        .map(|i| format!("a{} INTEGER", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "REGISTER TABLE r ({}) \nINPUT '{}';\n\n{}\n\nREGISTER QUERY q \nINPUT '{}';",
        columns,
        layout.table_file(exp).display(),
        "#".repeat(80),
        layout.query_file(exp).display(),
    )
}

/// Write the environment file of `exp`
pub fn write_env(layout: &Layout, exp: &Experiment) -> Result<()> {
    std::fs::write(layout.env_file(exp), env_text(layout, exp))?;
    Ok(())
}

/// Counts of what `generate_all` produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub tables_generated: usize,
    pub tables_cached: usize,
    pub queries: usize,
    pub environments: usize,
}

/// Generate tables, then queries, then environments for every experiment.
///
/// Nothing is written when any experiment is invalid.
pub fn generate_all<R: Rng + ?Sized>(
    layout: &Layout,
    experiments: &[Experiment],
    params: &ExperimentParams,
    rng: &mut R,
) -> Result<GenerationReport> {
    for exp in experiments {
        exp.validate()?;
    }
    let mut report = GenerationReport::default();

    let mut tables = HashSet::new();
    for exp in experiments {
        if !tables.insert(exp.table_id()) {
            continue;
        }
        match build_table(layout, exp, params, rng)? {
            TableOutcome::Generated { .. } => report.tables_generated += 1,
            TableOutcome::Cached => report.tables_cached += 1,
        }
    }

    let mut queries = HashSet::new();
    for exp in experiments {
        if queries.insert(exp.query_id()) {
            write_query(layout, exp, params)?;
            report.queries += 1;
        }
    }

    for exp in experiments {
        write_env(layout, exp)?;
        report.environments += 1;
    }

    let (tables, queries, environments) = (
        report.tables_generated,
        report.queries,
        report.environments,
    );
    info!("Generated {tables} tables, {queries} queries, {environments} environments");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrefGenError;
    use crate::experiment::TopK;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small() -> Experiment {
        Experiment {
            attributes: 4,
            tuples: 3,
            deletions: 1,
            insertions: 2,
            rules: 2,
            level: 1,
            indifferent: 1,
            top: TopK::Top(5),
        }
    }

    fn params(iterations: usize) -> ExperimentParams {
        ExperimentParams {
            iterations,
            ..ExperimentParams::default()
        }
    }

    fn workspace() -> (tempfile::TempDir, Layout) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let layout = Layout::new(tmp.path().join("streampref"));
        layout.create_directories().expect("dirs");
        (tmp, layout)
    }

    #[test]
    fn test_table_file_format() {
        let (_tmp, layout) = workspace();
        let mut rng = StdRng::seed_from_u64(17);
        let exp = small();

        let outcome = build_table(&layout, &exp, &params(3), &mut rng).expect("build");
        // 3 initial + 2 * (1 deleted + 2 inserted)
        assert_eq!(outcome, TableOutcome::Generated { rows: 9 });

        let content = std::fs::read_to_string(layout.table_file(&exp)).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "_TS,_FL,A1,A2,A3,A4");
        assert_eq!(lines.len(), 10);

        let tags: Vec<(&str, &str)> = lines[1..]
            .iter()
            .map(|line| {
                let mut fields = line.split(',');
                (fields.next().unwrap_or(""), fields.next().unwrap_or(""))
            })
            .collect();
        assert_eq!(
            tags,
            vec![
                ("0", "+"),
                ("0", "+"),
                ("0", "+"),
                ("1", "-"),
                ("1", "+"),
                ("1", "+"),
                ("2", "-"),
                ("2", "+"),
                ("2", "+"),
            ]
        );
        for line in &lines[1..] {
            let values: Vec<u32> = line
                .split(',')
                .skip(2)
                .map(|v| v.parse().expect("integer"))
                .collect();
            assert_eq!(values.len(), 4);
            assert!(values.iter().all(|v| *v <= 63));
        }
    }

    #[test]
    fn test_existing_table_is_not_regenerated() {
        let (_tmp, layout) = workspace();
        let exp = small();
        std::fs::write(layout.table_file(&exp), "sentinel").expect("write");

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = build_table(&layout, &exp, &params(3), &mut rng).expect("build");
        assert_eq!(outcome, TableOutcome::Cached);
        assert_eq!(
            std::fs::read_to_string(layout.table_file(&exp)).expect("read"),
            "sentinel"
        );
    }

    #[test]
    fn test_table_writer_appends_without_second_header() {
        let (_tmp, layout) = workspace();
        let path = layout.data_dir().join("append.csv");
        let batch = Batch {
            timestamp: 4,
            operation: crate::tuples::Operation::Delete,
            records: vec![crate::tuples::Record::new(vec![1, 2])],
        };

        TableWriter::open(&path, 2).expect("open").write(&batch).expect("write");
        TableWriter::open(&path, 2).expect("reopen").write(&batch).expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "_TS,_FL,A1,A2\n4,-,1,2\n4,-,1,2\n");
    }

    #[test]
    fn test_empty_batches_write_nothing() {
        let (_tmp, layout) = workspace();
        let exp = Experiment {
            tuples: 0,
            deletions: 0,
            insertions: 0,
            ..small()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = build_table(&layout, &exp, &params(5), &mut rng).expect("build");
        assert_eq!(outcome, TableOutcome::Generated { rows: 0 });
        let content = std::fs::read_to_string(layout.table_file(&exp)).expect("read");
        assert!(content.is_empty());
    }

    #[test]
    fn test_env_text() {
        let layout = Layout::new("streampref");
        let exp = small();
        let expected = format!(
            "REGISTER TABLE r (a1 INTEGER, a2 INTEGER, a3 INTEGER, a4 INTEGER) \n\
             INPUT 'streampref/data/att4tup3del1ins2.csv';\n\n{}\n\n\
             REGISTER QUERY q \nINPUT 'streampref/queries/rul2lev1ind1top5.cql';",
            "#".repeat(80)
        );
        assert_eq!(env_text(&layout, &exp), expected);
    }

    #[test]
    fn test_generate_all_shares_tables_and_queries() {
        let (_tmp, layout) = workspace();
        let a = small();
        let b = Experiment { rules: 4, ..a };
        let c = Experiment { tuples: 5, ..a };
        let mut rng = StdRng::seed_from_u64(3);

        let report = generate_all(&layout, &[a, b, c], &params(2), &mut rng).expect("generate");
        assert_eq!(
            report,
            GenerationReport {
                tables_generated: 2,
                tables_cached: 0,
                queries: 2,
                environments: 3,
            }
        );
        for exp in [a, b, c] {
            assert!(layout.table_file(&exp).is_file());
            assert!(layout.query_file(&exp).is_file());
            assert!(layout.env_file(&exp).is_file());
        }

        let again = generate_all(&layout, &[a, b, c], &params(2), &mut rng).expect("generate");
        assert_eq!(again.tables_generated, 0);
        assert_eq!(again.tables_cached, 2);
    }

    #[test]
    fn test_invalid_experiments_are_rejected() {
        let (_tmp, layout) = workspace();
        let flat = Experiment { level: 0, ..small() };
        let narrow = Experiment {
            attributes: 3,
            indifferent: 2,
            ..small()
        };
        let mut rng = StdRng::seed_from_u64(4);

        let err = generate_all(&layout, &[small(), flat], &params(2), &mut rng)
            .expect_err("level 0 must be rejected");
        assert!(matches!(err, PrefGenError::InvalidExperiment { .. }));
        assert!(
            !layout.table_file(&small()).exists(),
            "nothing is generated before validation passes"
        );

        assert!(build_table(&layout, &narrow, &params(2), &mut rng).is_err());
        assert!(!layout.table_file(&narrow).exists());
        assert!(write_query(&layout, &flat, &params(2)).is_err());
        assert!(!layout.query_file(&flat).exists());
    }
}
