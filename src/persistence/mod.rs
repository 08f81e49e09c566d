use std::io;

use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;

use crate::validation::SnapshotValidationError;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Validation(#[from] SnapshotValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub mod file;

pub use file::{
    export_frontier_csv, export_item_costs_csv, export_pareto_csv, export_requirements_csv,
    export_s_curve_csv, load_items_from_csv, load_snapshot_from_json, save_items_to_csv,
    save_snapshot_to_json,
};
