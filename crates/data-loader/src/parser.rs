//! Readers for the on-disk artifact files.
//!
//! - JSON artifacts: vectorizer, similarity matrix, collaborative model
//! - programs.csv: program_id,name,description,tags_text
//!
//! Every reader returns `Ok(None)` when the file does not exist. A file
//! that exists but fails to parse is an error.

use crate::error::{DataLoadError, Result};
use crate::types::Program;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Read and deserialize a JSON artifact, or `None` if the file is absent
pub fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        info!("Artifact {} not present, skipping", path.display());
        return Ok(None);
    }

    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        DataLoadError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!("Parsed artifact {}", path.display());
    Ok(Some(value))
}

/// One row of programs.csv.
///
/// Older exports name the tag column `skills`; both are accepted.
#[derive(Debug, Deserialize)]
struct ProgramRecord {
    program_id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "skills")]
    tags_text: Option<String>,
}

/// Parse the program catalog, or `None` if the file is absent
pub fn parse_catalog(path: &Path) -> Result<Option<Vec<Program>>> {
    if !path.exists() {
        info!("Catalog {} not present, skipping", path.display());
        return Ok(None);
    }

    let csv_error = |source: csv::Error| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;

    let mut programs = Vec::new();
    for record in reader.deserialize::<ProgramRecord>() {
        let record = record.map_err(csv_error)?;
        programs.push(Program::new(
            record.program_id,
            record.name,
            record.description.unwrap_or_default(),
            record.tags_text.unwrap_or_default(),
        ));
    }

    debug!("Parsed {} programs from {}", programs.len(), path.display());
    Ok(Some(programs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DenseMatrix;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_absent_json_is_none() {
        let dir = TempDir::new().unwrap();
        let result: Option<DenseMatrix> =
            read_json_artifact(&dir.path().join("missing.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "matrix.json", "[[1.0, 0.0], [0.5, 0.5]]");
        let matrix: DenseMatrix = read_json_artifact(&path).unwrap().unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.row(1), &[0.5, 0.5]);
    }

    #[test]
    fn test_corrupt_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "matrix.json", "[[1.0, 0.0], [0.5");
        let result: Result<Option<DenseMatrix>> = read_json_artifact(&path);
        assert!(matches!(result, Err(DataLoadError::Json { .. })));
    }

    #[test]
    fn test_invalid_matrix_shape_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "matrix.json", "[[1.0, 0.0], [0.5]]");
        let result: Result<Option<DenseMatrix>> = read_json_artifact(&path);
        assert!(matches!(result, Err(DataLoadError::Json { .. })));
    }

    #[test]
    fn test_parse_catalog() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "programs.csv",
            "program_id,name,description,tags_text\n\
             P1,Intro to Python,\"Learn Python, fast\",\"Python, Programming\"\n\
             P2,Cooking,,Cooking\n",
        );

        let programs = parse_catalog(&path).unwrap().unwrap();
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].description, "Learn Python, fast");
        assert_eq!(programs[0].match_text, "learn python, fast python, programming");
        assert_eq!(programs[1].description, "");
        assert_eq!(programs[1].tags_text, "Cooking");
    }

    #[test]
    fn test_parse_catalog_skills_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "programs.csv",
            "program_id,name,description,skills\nP1,Stats,Numbers,Statistics\n",
        );

        let programs = parse_catalog(&path).unwrap().unwrap();
        assert_eq!(programs[0].tags_text, "Statistics");
    }

    #[test]
    fn test_parse_catalog_missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "programs.csv", "id,title\nP1,Stats\n");
        assert!(matches!(parse_catalog(&path), Err(DataLoadError::Csv { .. })));
    }

    #[test]
    fn test_absent_catalog_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(parse_catalog(&dir.path().join("programs.csv")).unwrap().is_none());
    }
}
