// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrefGenError>;

#[derive(Debug, Error)]
pub enum PrefGenError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid experiment {id}: {reason}")]
    InvalidExperiment { id: String, reason: String },

    #[error("Value {value} out of range for parameter '{key}'")]
    ParameterValue { key: &'static str, value: i64 },

    #[error("Cannot read config file {}: {source}", .path.display())]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] arrow_schema::ArrowError),

    #[error("Detail file {} is missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Detail file {} has non-numeric {column} value '{value}'", .path.display())]
    InvalidMeasurement {
        path: PathBuf,
        column: String,
        value: String,
    },
}

impl PrefGenError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PrefGenError::Config(msg.into())
    }

    pub fn missing_column<P: AsRef<Path>, S: Into<String>>(path: P, column: S) -> Self {
        PrefGenError::MissingColumn {
            path: path.as_ref().to_path_buf(),
            column: column.into(),
        }
    }
}
