//! In-memory inverted index and the corpus statistics rankers need.
//!
//! This is the indexing collaborator: it owns postings (`term -> doc -> tf`) plus the
//! per-document and per-term counts that make up `TermStats`. Everything is kept in
//! ordered maps so that iteration order (and therefore ranking) is reproducible.

use crate::query::analyze;
use crate::ranker::{DocStats, TermStats};
use crate::Error;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
struct DocEntry {
    len: u32,
    counts: BTreeMap<String, u32>,
}

/// Inverted index over tokenized documents.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<String, BTreeMap<u32, u32>>,
    docs: BTreeMap<u32, DocEntry>,
    corpus_term_counts: BTreeMap<String, u64>,
    total_terms: u64,
}

impl InvertedIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a line corpus: one document per line, doc id = 0-based line number.
    ///
    /// Blank lines still count as (empty) documents so that ids stay aligned with line numbers.
    pub fn from_line_corpus(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut idx = Self::new();
        for (i, line) in text.lines().enumerate() {
            idx.add_document(i as u32, &analyze(line));
        }
        tracing::info!(
            path = %path.display(),
            docs = idx.num_docs(),
            terms = idx.postings.len(),
            "built inverted index"
        );
        Ok(idx)
    }

    /// Count of documents currently indexed.
    pub fn num_docs(&self) -> u32 {
        self.docs.len() as u32
    }

    /// Total number of tokens over all documents.
    pub fn total_terms(&self) -> u64 {
        self.total_terms
    }

    /// Add/update a document by doc id and token stream.
    pub fn add_document(&mut self, doc_id: u32, terms: &[String]) {
        // Updates are delete+add.
        self.delete_document(doc_id);

        let mut entry = DocEntry {
            len: terms.len() as u32,
            counts: BTreeMap::new(),
        };
        for term in terms {
            *entry.counts.entry(term.clone()).or_insert(0) += 1;
        }
        for (term, &tf) in &entry.counts {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(doc_id, tf);
            *self.corpus_term_counts.entry(term.clone()).or_insert(0) += u64::from(tf);
        }
        self.total_terms += u64::from(entry.len);
        self.docs.insert(doc_id, entry);
    }

    /// Delete a document by id.
    ///
    /// Returns whether the document existed.
    pub fn delete_document(&mut self, doc_id: u32) -> bool {
        let Some(entry) = self.docs.remove(&doc_id) else {
            return false;
        };
        for (term, tf) in entry.counts {
            if let Some(list) = self.postings.get_mut(&term) {
                list.remove(&doc_id);
                if list.is_empty() {
                    self.postings.remove(&term);
                }
            }
            if let Some(count) = self.corpus_term_counts.get_mut(&term) {
                *count = count.saturating_sub(u64::from(tf));
                if *count == 0 {
                    self.corpus_term_counts.remove(&term);
                }
            }
        }
        self.total_terms = self.total_terms.saturating_sub(u64::from(entry.len));
        true
    }

    /// Term frequency of `term` in `doc_id` (0 if doc missing / term absent).
    pub fn term_frequency(&self, doc_id: u32, term: &str) -> u32 {
        self.postings
            .get(term)
            .and_then(|list| list.get(&doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Number of documents containing `term`.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings.get(term).map_or(0, |list| list.len() as u32)
    }

    /// Total occurrences of `term` across the corpus.
    pub fn corpus_term_count(&self, term: &str) -> u64 {
        self.corpus_term_counts.get(term).copied().unwrap_or(0)
    }

    /// Document length (in terms). Returns 0 for unknown doc ids.
    pub fn document_length(&self, doc_id: u32) -> u32 {
        self.docs.get(&doc_id).map_or(0, |d| d.len)
    }

    /// Distinct terms in a document. Returns 0 for unknown doc ids.
    pub fn unique_terms(&self, doc_id: u32) -> u32 {
        self.docs.get(&doc_id).map_or(0, |d| d.counts.len() as u32)
    }

    /// Iterate all distinct terms in the index, in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(String::as_str)
    }

    /// Iterate postings `(doc_id, tf)` for a term, ascending by doc id.
    pub fn postings_iter<'a>(&'a self, term: &str) -> impl Iterator<Item = (u32, u32)> + 'a {
        self.postings
            .get(term)
            .into_iter()
            .flat_map(|list| list.iter().map(|(&d, &tf)| (d, tf)))
    }

    /// Average document length (in terms).
    pub fn avg_doc_len(&self) -> f64 {
        if self.docs.is_empty() {
            return 0.0;
        }
        self.total_terms as f64 / self.docs.len() as f64
    }

    /// Corpus and document statistics for `doc_id`.
    pub fn doc_stats(&self, doc_id: u32, query_length: f64) -> DocStats {
        DocStats {
            num_docs: u64::from(self.num_docs()),
            total_terms: self.total_terms,
            avg_doc_len: self.avg_doc_len(),
            query_length,
            doc_len: u64::from(self.document_length(doc_id)),
            doc_unique_terms: u64::from(self.unique_terms(doc_id)),
        }
    }

    /// Full score data for one `(term, doc)` pair.
    pub fn term_stats(&self, doc: &DocStats, term: &str, tf: u32, weight: f64) -> TermStats {
        doc.with_term(
            u64::from(tf),
            u64::from(self.doc_frequency(term)),
            self.corpus_term_count(term),
            weight,
        )
    }
}
