//! Error types for the data-loader crate.
//!
//! Only an artifact that exists but cannot be read, parsed or validated
//! produces one of these. A missing artifact is not an error: the loader
//! reports it as absent and the matching capability is switched off.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and validating artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading an artifact file
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON artifact (vectorizer, similarity matrix, collaborative model)
    /// is malformed or fails validation during deserialization
    #[error("Failed to parse JSON artifact {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The program catalog CSV could not be parsed
    #[error("Failed to parse catalog {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two artifacts disagree on a dimension
    #[error("Shape mismatch in {artifact}: expected {expected}, found {found}")]
    ShapeMismatch {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },

    /// A matrix row has a different width from the first row
    #[error("Ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// An id map points outside the factor matrix it indexes
    #[error("Index {index} for {map} key '{key}' is out of bounds (len {len})")]
    IndexOutOfBounds {
        map: &'static str,
        key: String,
        index: usize,
        len: usize,
    },

    /// Two item ids map to the same factor column
    #[error("Item column {index} is claimed by both '{first}' and '{second}'")]
    DuplicateItemIndex {
        index: usize,
        first: String,
        second: String,
    },

    /// Catalog contains the same program id twice
    #[error("Duplicate program id in catalog: {id}")]
    DuplicateProgram { id: String },

    /// Vectorizer parameters are inconsistent
    #[error("Invalid vectorizer: {0}")]
    InvalidVectorizer(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
