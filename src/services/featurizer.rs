use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::services::stopwords::is_stop_word;

/// Tokens are runs of at least two word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse row of term weights, column indices in ascending order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// One row per catalog entry, in catalog order
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    rows: Vec<SparseVector>,
    columns: usize,
}

impl FeatureMatrix {
    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns
    }
}

/// Term to column mapping; columns follow the lexicographic order of the terms
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    pub fn get(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in column order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

/// Output of a fit: the weighted matrix and the vocabulary it was built with
#[derive(Debug, Clone)]
pub struct Featurized {
    pub matrix: FeatureMatrix,
    pub vocabulary: Vocabulary,
}

/// TF-IDF featurizer over lowercased, stop-word filtered tokens
///
/// Weights are raw term counts times a smoothed inverse document frequency,
/// `ln((1 + n) / (1 + df)) + 1`, with every row scaled to unit L2 norm.
/// Documents without any surviving token produce an all-zero row.
#[derive(Debug, Clone)]
pub struct TfidfFeaturizer {
    token_pattern: Regex,
}

impl TfidfFeaturizer {
    pub fn new() -> AppResult<Self> {
        let token_pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| AppError::Internal(format!("Invalid token pattern: {}", e)))?;
        Ok(Self { token_pattern })
    }

    /// Lowercases `text` and returns its tokens with stop words removed
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !is_stop_word(token))
            .map(str::to_string)
            .collect()
    }

    /// Builds the vocabulary over `documents` and weights every document against it
    pub fn fit_transform(&self, documents: &[String]) -> Featurized {
        let counts: Vec<BTreeMap<String, usize>> = documents
            .iter()
            .map(|doc| {
                let mut counts = BTreeMap::new();
                for token in self.tokenize(doc) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let terms: BTreeSet<&str> = counts
            .iter()
            .flat_map(|doc| doc.keys().map(String::as_str))
            .collect();
        let terms: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(column, term)| (term.to_string(), column))
            .collect();

        let mut document_frequency = vec![0usize; terms.len()];
        for doc in &counts {
            for term in doc.keys() {
                document_frequency[terms[term.as_str()]] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                // BTreeMap iteration matches column order, so indices come out sorted
                let mut row = SparseVector::default();
                for (term, &count) in doc {
                    let column = terms[term.as_str()];
                    row.indices.push(column);
                    row.values.push(count as f64 * idf[column]);
                }
                let norm = row.norm();
                if norm > 0.0 {
                    row.values.iter_mut().for_each(|v| *v /= norm);
                }
                row
            })
            .collect();

        let matrix = FeatureMatrix {
            rows,
            columns: terms.len(),
        };

        tracing::debug!(
            documents = matrix.n_rows(),
            vocabulary = terms.len(),
            "Fitted TF-IDF featurizer"
        );

        Featurized {
            matrix,
            vocabulary: Vocabulary { terms },
        }
    }
}
