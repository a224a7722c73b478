//! TF-IDF vector space over normalized documents

use crate::processing::normalizer::strip_accents;
use crate::processing::similarity::SparseVector;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use stop_words::{get, LANGUAGE};

/// Builds TF-IDF spaces. Holds the tokenizer and the stop-word list, both
/// reusable across fits.
pub struct LexicalVectorizer {
    stop_words: HashSet<String>,
    token_regex: Regex,
}

/// A vocabulary and its IDF weights, fit on one corpus.
pub struct TfIdfSpace<'a> {
    vectorizer: &'a LexicalVectorizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl Default for LexicalVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalVectorizer {
    /// English and Portuguese stop words.
    pub fn new() -> Self {
        let mut words = get(LANGUAGE::English);
        words.extend(get(LANGUAGE::Portuguese));
        Self::with_stop_words(words)
    }

    /// Stop words also match in accent-stripped form, since normalized
    /// documents carry no diacritics.
    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words = HashSet::new();
        for word in words {
            let lowered = word.as_ref().to_lowercase();
            stop_words.insert(strip_accents(&lowered));
            stop_words.insert(lowered);
        }

        // Two or more word characters, the classic TF-IDF token pattern.
        let token_regex = Regex::new(r"\b\w\w+\b").expect("Invalid token regex");

        Self {
            stop_words,
            token_regex,
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        self.token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.is_stop_word(token))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and IDF weights of `corpus`.
    pub fn fit(&self, corpus: &[String]) -> TfIdfSpace<'_> {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in corpus {
            let unique: BTreeSet<String> = self.analyze(document).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        // Sorted terms give a stable column order.
        let mut terms: Vec<(String, usize)> = document_frequency.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n_documents = corpus.len() as f32;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (column, (term, df)) in terms.into_iter().enumerate() {
            idf.push(((1.0 + n_documents) / (1.0 + df as f32)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        TfIdfSpace {
            vectorizer: self,
            vocabulary,
            idf,
        }
    }

    /// Fit on `corpus_docs` and project both document sets into that space.
    ///
    /// Rows of the first matrix correspond to `query_docs`, rows of the second
    /// to `corpus_docs`. Query terms unknown to the corpus carry no weight.
    pub fn fit_and_project(
        &self,
        query_docs: &[String],
        corpus_docs: &[String],
    ) -> (Vec<SparseVector>, Vec<SparseVector>) {
        let space = self.fit(corpus_docs);
        let corpus_matrix = corpus_docs.iter().map(|d| space.transform(d)).collect();
        let query_matrix = query_docs.iter().map(|d| space.transform(d)).collect();
        (query_matrix, corpus_matrix)
    }
}

impl TfIdfSpace<'_> {
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// L2-normalised TF-IDF row for one document.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in self.vectorizer.analyze(document) {
            if let Some(&column) = self.vocabulary.get(&token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            entries.iter_mut().for_each(|(_, w)| *w /= norm);
        }

        SparseVector::new(self.vocabulary_size(), entries)
    }
}
