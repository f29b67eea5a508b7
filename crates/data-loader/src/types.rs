//! Core domain types for the scoring artifacts.
//!
//! Everything here is immutable once built. Constructors validate the
//! invariants the scorers rely on (aligned shapes, in-bounds indices, an
//! injective item map), so a value that exists is safe to index without
//! further checks.

use crate::error::{DataLoadError, Result};
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable external identifier of a catalog program
pub type ProgramId = String;

/// External identifier of a user known to the collaborative model
pub type UserId = String;

// =============================================================================
// Catalog
// =============================================================================

/// One catalog entry.
///
/// `match_text` is the lowercase concatenation of description and tags
/// used for explanation matching. It is derived in [`Program::new`] and
/// never deserialized directly.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub tags_text: String,
    #[serde(skip)]
    pub match_text: String,
}

impl Program {
    pub fn new(
        id: impl Into<ProgramId>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags_text: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let tags_text = tags_text.into();
        let match_text = format!("{} {}", description, tags_text).to_lowercase();
        Self {
            id: id.into(),
            name: name.into(),
            description,
            tags_text,
            match_text,
        }
    }
}

/// Programs in catalog order, plus an id lookup.
///
/// Catalog order is significant: row `i` of the similarity matrix
/// describes `programs[i]`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    programs: Vec<Program>,
    by_id: HashMap<ProgramId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate program ids
    pub fn new(programs: Vec<Program>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(programs.len());
        for (position, program) in programs.iter().enumerate() {
            if by_id.insert(program.id.clone(), position).is_some() {
                return Err(DataLoadError::DuplicateProgram {
                    id: program.id.clone(),
                });
            }
        }
        Ok(Self { programs, by_id })
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Program at a catalog position
    pub fn get(&self, position: usize) -> Option<&Program> {
        self.programs.get(position)
    }

    /// Program by external id
    pub fn get_by_id(&self, id: &str) -> Option<&Program> {
        self.by_id.get(id).map(|&position| &self.programs[position])
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }
}

// =============================================================================
// Dense matrices
// =============================================================================

/// Row-major dense matrix of `f32`.
///
/// Deserializes from a JSON array of equally sized rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// Build from nested rows. Every row must have the width of the first.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(DataLoadError::RaggedMatrix {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Borrow one row. Panics if `index >= rows()`.
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.cols;
        &self.data[start..start + self.cols]
    }
}

impl TryFrom<Vec<Vec<f32>>> for DenseMatrix {
    type Error = DataLoadError;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<DenseMatrix> for Vec<Vec<f32>> {
    fn from(matrix: DenseMatrix) -> Self {
        (0..matrix.rows).map(|i| matrix.row(i).to_vec()).collect()
    }
}

// =============================================================================
// Content model
// =============================================================================

/// Vectorizer plus the per-program similarity matrix in its space.
///
/// Row norms are computed once here so cosine similarity only needs a dot
/// product per row at query time.
#[derive(Debug, Clone)]
pub struct ContentModel {
    vectorizer: TfidfVectorizer,
    matrix: DenseMatrix,
    row_norms: Vec<f32>,
}

impl ContentModel {
    pub fn new(vectorizer: TfidfVectorizer, matrix: DenseMatrix) -> Result<Self> {
        if matrix.rows() > 0 && matrix.cols() != vectorizer.vocabulary_size() {
            return Err(DataLoadError::ShapeMismatch {
                artifact: "similarity matrix columns",
                expected: vectorizer.vocabulary_size(),
                found: matrix.cols(),
            });
        }
        let row_norms = (0..matrix.rows())
            .map(|i| matrix.row(i).iter().map(|v| v * v).sum::<f32>().sqrt())
            .collect();
        Ok(Self {
            vectorizer,
            matrix,
            row_norms,
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// Euclidean norm of each matrix row, in row order
    pub fn row_norms(&self) -> &[f32] {
        &self.row_norms
    }
}

// =============================================================================
// Collaborative model
// =============================================================================

/// Factorized user/item preference model.
///
/// The item map is validated to be injective so it can be inverted; the
/// inverse is built here rather than per query.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawCollaborativeModel")]
pub struct CollaborativeModel {
    user_id_map: HashMap<UserId, usize>,
    item_id_map: HashMap<ProgramId, usize>,
    item_ids_by_index: HashMap<usize, ProgramId>,
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
}

/// On-disk shape of the collaborative model bundle
#[derive(Debug, Deserialize)]
struct RawCollaborativeModel {
    user_id_map: HashMap<UserId, usize>,
    item_id_map: HashMap<ProgramId, usize>,
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
}

impl TryFrom<RawCollaborativeModel> for CollaborativeModel {
    type Error = DataLoadError;

    fn try_from(raw: RawCollaborativeModel) -> Result<Self> {
        Self::new(
            raw.user_id_map,
            raw.item_id_map,
            raw.user_factors,
            raw.item_factors,
        )
    }
}

impl CollaborativeModel {
    pub fn new(
        user_id_map: HashMap<UserId, usize>,
        item_id_map: HashMap<ProgramId, usize>,
        user_factors: DenseMatrix,
        item_factors: DenseMatrix,
    ) -> Result<Self> {
        if user_factors.rows() > 0
            && item_factors.rows() > 0
            && user_factors.cols() != item_factors.cols()
        {
            return Err(DataLoadError::ShapeMismatch {
                artifact: "collaborative latent dimension",
                expected: user_factors.cols(),
                found: item_factors.cols(),
            });
        }

        for (key, &index) in &user_id_map {
            if index >= user_factors.rows() {
                return Err(DataLoadError::IndexOutOfBounds {
                    map: "user_id_map",
                    key: key.clone(),
                    index,
                    len: user_factors.rows(),
                });
            }
        }

        let mut item_ids_by_index = HashMap::with_capacity(item_id_map.len());
        for (key, &index) in &item_id_map {
            if index >= item_factors.rows() {
                return Err(DataLoadError::IndexOutOfBounds {
                    map: "item_id_map",
                    key: key.clone(),
                    index,
                    len: item_factors.rows(),
                });
            }
            if let Some(previous) = item_ids_by_index.insert(index, key.clone()) {
                let (first, second) = if previous <= *key {
                    (previous, key.clone())
                } else {
                    (key.clone(), previous)
                };
                return Err(DataLoadError::DuplicateItemIndex {
                    index,
                    first,
                    second,
                });
            }
        }

        Ok(Self {
            user_id_map,
            item_id_map,
            item_ids_by_index,
            user_factors,
            item_factors,
        })
    }

    /// Factor row for a user, `None` for a cold-start user
    pub fn user_index(&self, user_id: &str) -> Option<usize> {
        self.user_id_map.get(user_id).copied()
    }

    /// Inverse item lookup. `None` for a factor row no id maps to.
    pub fn program_id_at(&self, index: usize) -> Option<&ProgramId> {
        self.item_ids_by_index.get(&index)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.user_id_map.keys()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ProgramId> {
        self.item_id_map.keys()
    }

    pub fn user_factors(&self) -> &DenseMatrix {
        &self.user_factors
    }

    pub fn item_factors(&self) -> &DenseMatrix {
        &self.item_factors
    }
}

// =============================================================================
// Artifacts - everything the scorers read
// =============================================================================

/// Which scoring signals are available after loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub content: bool,
    pub collaborative: bool,
}

/// All loaded artifacts.
///
/// Each optional capability is `None` when its source artifact was absent
/// at load time.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    catalog: Catalog,
    content: Option<ContentModel>,
    collaborative: Option<CollaborativeModel>,
}

impl Artifacts {
    /// Assemble artifacts, checking the similarity matrix is aligned
    /// row-for-row with the catalog.
    pub fn new(
        catalog: Catalog,
        content: Option<ContentModel>,
        collaborative: Option<CollaborativeModel>,
    ) -> Result<Self> {
        if let Some(model) = &content
            && model.matrix().rows() != catalog.len()
        {
            return Err(DataLoadError::ShapeMismatch {
                artifact: "similarity matrix rows",
                expected: catalog.len(),
                found: model.matrix().rows(),
            });
        }
        Ok(Self {
            catalog,
            content,
            collaborative,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn content(&self) -> Option<&ContentModel> {
        self.content.as_ref()
    }

    pub fn collaborative(&self) -> Option<&CollaborativeModel> {
        self.collaborative.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            content: self.content.is_some(),
            collaborative: self.collaborative.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_program_match_text_is_lowercase() {
        let program = Program::new("P1", "Intro", "Learn PYTHON", "Python, Data");
        assert_eq!(program.match_text, "learn python python, data");
        assert_eq!(program.tags_text, "Python, Data");
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let result = Catalog::new(vec![
            Program::new("P1", "A", "", ""),
            Program::new("P1", "B", "", ""),
        ]);
        assert!(matches!(result, Err(DataLoadError::DuplicateProgram { id }) if id == "P1"));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::new(vec![
            Program::new("P1", "A", "", ""),
            Program::new("P2", "B", "", ""),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get_by_id("P2").unwrap().name, "B");
        assert_eq!(catalog.get(0).unwrap().id, "P1");
        assert!(catalog.get_by_id("P3").is_none());
    }

    #[test]
    fn test_dense_matrix_rejects_ragged_rows() {
        let result = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(DataLoadError::RaggedMatrix { row: 1, expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_dense_matrix_rows() {
        let matrix = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 2);
        assert_eq!(matrix.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_collaborative_model_inverse_map() {
        let model = CollaborativeModel::new(
            ids(&[("u1", 0)]),
            ids(&[("P1", 1), ("P2", 0)]),
            DenseMatrix::from_rows(vec![vec![1.0, 0.0]]).unwrap(),
            DenseMatrix::from_rows(vec![vec![0.5, 0.5], vec![1.0, 0.0]]).unwrap(),
        )
        .unwrap();

        assert_eq!(model.user_index("u1"), Some(0));
        assert_eq!(model.user_index("nobody"), None);
        assert_eq!(model.program_id_at(1).map(String::as_str), Some("P1"));
        assert_eq!(model.program_id_at(0).map(String::as_str), Some("P2"));
    }

    #[test]
    fn test_collaborative_model_rejects_out_of_bounds_user() {
        let result = CollaborativeModel::new(
            ids(&[("u1", 3)]),
            ids(&[]),
            DenseMatrix::from_rows(vec![vec![1.0]]).unwrap(),
            DenseMatrix::default(),
        );
        assert!(matches!(
            result,
            Err(DataLoadError::IndexOutOfBounds { map: "user_id_map", index: 3, .. })
        ));
    }

    #[test]
    fn test_collaborative_model_rejects_shared_item_column() {
        let result = CollaborativeModel::new(
            ids(&[]),
            ids(&[("P1", 0), ("P2", 0)]),
            DenseMatrix::default(),
            DenseMatrix::from_rows(vec![vec![1.0]]).unwrap(),
        );
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateItemIndex { index: 0, first, second })
                if first == "P1" && second == "P2"
        ));
    }

    #[test]
    fn test_collaborative_model_rejects_mismatched_factor_width() {
        let result = CollaborativeModel::new(
            ids(&[]),
            ids(&[]),
            DenseMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap(),
            DenseMatrix::from_rows(vec![vec![1.0]]).unwrap(),
        );
        assert!(matches!(result, Err(DataLoadError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_artifacts_require_aligned_matrix() {
        let vectorizer = TfidfVectorizer::new(ids(&[("python", 0)]), vec![1.0]).unwrap();
        let matrix = DenseMatrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        let content = ContentModel::new(vectorizer, matrix).unwrap();
        let catalog = Catalog::new(vec![Program::new("P1", "A", "", "")]).unwrap();

        let result = Artifacts::new(catalog, Some(content), None);
        assert!(matches!(
            result,
            Err(DataLoadError::ShapeMismatch { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn test_capabilities() {
        let artifacts = Artifacts::default();
        assert_eq!(
            artifacts.capabilities(),
            Capabilities { content: false, collaborative: false }
        );
    }
}
