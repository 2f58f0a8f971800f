//! TF-IDF over word n-grams.
//!
//! Tokens are runs of at least two alphanumeric characters. The vocabulary is ordered
//! alphabetically, so feature indices are stable across fits on the same corpus.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fitting parameters for [`TfidfVectorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Keep at most this many terms, highest corpus frequency first.
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Drop terms seen in fewer documents than this.
    pub min_df: usize,
    /// Drop terms seen in more than this fraction of documents.
    pub max_df: f64,
    /// Use `1 + ln(tf)` instead of raw counts.
    pub sublinear_tf: bool,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_min: 1,
            ngram_max: 3,
            min_df: 2,
            max_df: 0.85,
            sublinear_tf: true,
        }
    }
}

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .collect()
}

fn ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let tokens = tokenize(text);
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        grams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    grams
}

impl TfidfVectorizer {
    /// Fits vocabulary and inverse document frequencies on `documents`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TrainingData` if the corpus is empty, the parameters are inconsistent,
    /// or no term survives document-frequency pruning.
    pub fn fit<S: AsRef<str>>(documents: &[S], params: VectorizerParams) -> CoreResult<Self> {
        if documents.is_empty() {
            return Err(CoreError::TrainingData(
                "cannot fit vectorizer on an empty corpus".into(),
            ));
        }
        if params.ngram_max < params.ngram_min.max(1) || params.max_features == 0 {
            return Err(CoreError::TrainingData(format!(
                "invalid vectorizer parameters: {params:?}"
            )));
        }

        let n_documents = documents.len();
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut document_counts: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = ngrams(doc.as_ref(), params.ngram_min, params.ngram_max);
            let mut seen = HashSet::new();
            for gram in grams {
                *term_counts.entry(gram.clone()).or_insert(0) += 1;
                if seen.insert(gram.clone()) {
                    *document_counts.entry(gram).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = params.max_df * n_documents as f64;
        let mut candidates: Vec<(String, usize, usize)> = document_counts
            .into_iter()
            .filter(|(_, df)| *df >= params.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, df)| {
                let tf = term_counts.get(&term).copied().unwrap_or(0);
                (term, tf, df)
            })
            .collect();

        if candidates.is_empty() {
            return Err(CoreError::TrainingData(
                "no terms remain after document-frequency pruning; use more training records"
                    .into(),
            ));
        }

        // Highest corpus frequency first, ties alphabetical.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(params.max_features);
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(candidates.len());
        for (index, (term, _, df)) in candidates.into_iter().enumerate() {
            idf.push(((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self {
            params,
            vocabulary,
            idf,
        })
    }

    /// Maps `text` to an L2-normalized TF-IDF vector of length [`Self::n_features`].
    ///
    /// Text with no known terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut counts = vec![0usize; self.idf.len()];
        for gram in ngrams(text, self.params.ngram_min, self.params.ngram_max) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                counts[index] += 1;
            }
        }

        let mut features: Vec<f64> = counts
            .iter()
            .zip(&self.idf)
            .map(|(&count, idf)| {
                if count == 0 {
                    0.0
                } else if self.params.sublinear_tf {
                    (1.0 + (count as f64).ln()) * idf
                } else {
                    count as f64 * idf
                }
            })
            .collect();

        let norm = features.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut features {
                *value /= norm;
            }
        }
        features
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Terms in feature-index order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<(&str, usize)> = self
            .vocabulary
            .iter()
            .map(|(term, &index)| (term.as_str(), index))
            .collect();
        terms.sort_by_key(|(_, index)| *index);
        terms.into_iter().map(|(term, _)| term).collect()
    }

    /// Checks that a deserialized vectorizer is internally consistent.
    pub(crate) fn check_consistency(&self) -> CoreResult<()> {
        if self.vocabulary.len() != self.idf.len()
            || self.vocabulary.values().any(|&index| index >= self.idf.len())
        {
            return Err(CoreError::ArtifactInconsistent(format!(
                "vectorizer vocabulary has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        Ok(())
    }
}
