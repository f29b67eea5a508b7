//! TF-IDF text vectorizer (transform side only).
//!
//! The vocabulary and idf weights come from an offline-fitted artifact.
//! This module only maps new text into that fixed space.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Row normalization applied after tf-idf weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Sparse vector as `(column, value)` pairs, sorted by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt()
    }

    /// Dot product against a dense row of the same space
    pub fn dot(&self, dense: &[f32]) -> f32 {
        self.entries
            .iter()
            .filter_map(|&(column, value)| dense.get(column).map(|d| d * value))
            .sum()
    }

    pub fn to_dense(&self, dimension: usize) -> Vec<f32> {
        let mut dense = vec![0.0; dimension];
        for &(column, value) in &self.entries {
            if column < dimension {
                dense[column] = value;
            }
        }
        dense
    }
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTfidfVectorizer")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    norm: Option<Norm>,
    sublinear_tf: bool,
}

#[derive(Debug, Deserialize)]
struct RawTfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Option<Vec<String>>,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default)]
    sublinear_tf: bool,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

impl TryFrom<RawTfidfVectorizer> for TfidfVectorizer {
    type Error = DataLoadError;

    fn try_from(raw: RawTfidfVectorizer) -> Result<Self> {
        let stop_words = raw.stop_words.unwrap_or_default();
        Self::new(raw.vocabulary, raw.idf)?
            .with_lowercase(raw.lowercase)
            .with_norm(raw.norm)
            .with_sublinear_tf(raw.sublinear_tf)
            .with_stop_words(stop_words)
            .with_ngram_range(raw.ngram_range.0, raw.ngram_range.1)
    }
}

impl TfidfVectorizer {
    /// Create a unigram, lowercasing, L2-normalized vectorizer.
    ///
    /// Every vocabulary index must be unique and have an idf weight.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f32>) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(DataLoadError::InvalidVectorizer(format!(
                "vocabulary has {} terms but idf has {} weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        let mut seen = vec![false; idf.len()];
        for (term, &index) in &vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(DataLoadError::InvalidVectorizer(format!(
                        "column {} is assigned to more than one term (including '{}')",
                        index, term
                    )));
                }
                None => {
                    return Err(DataLoadError::InvalidVectorizer(format!(
                        "term '{}' has column {} outside vocabulary of {}",
                        term,
                        index,
                        idf.len()
                    )));
                }
            }
        }
        Ok(Self {
            vocabulary,
            idf,
            lowercase: true,
            ngram_range: (1, 1),
            stop_words: HashSet::new(),
            norm: Some(Norm::L2),
            sublinear_tf: false,
        })
    }

    /// Configure the n-gram range (default: 1, 1)
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(DataLoadError::InvalidVectorizer(format!(
                "invalid ngram range ({}, {})",
                min_n, max_n
            )));
        }
        self.ngram_range = (min_n, max_n);
        Ok(self)
    }

    /// Configure stop words removed before n-gram generation
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }

    /// Use `1 + ln(tf)` instead of raw counts
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Map text into the vectorizer space. Out-of-vocabulary terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = tokenize(&text)
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let mut counts: HashMap<usize, f32> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (column, tf * self.idf[column])
            })
            .collect();
        entries.sort_unstable_by_key(|&(column, _)| column);

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f32>(),
            None => 1.0,
        };
        if scale > 0.0 {
            for (_, value) in &mut entries {
                *value /= scale;
            }
        }

        SparseVector { entries }
    }
}

/// Split into maximal runs of word characters, keeping runs of two or more
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
}
