use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;
pub type Position = u32;

/// One document's token -> positions map, as produced by tokenization.
/// Positions are zero-based offsets into the document's token stream, in the
/// order they were encountered.
pub type TokenPositions = HashMap<String, Vec<Position>>;

/// Positional inverted index: token -> document -> positions.
///
/// Both levels are ordered maps, so serialization walks tokens in ascending
/// lexicographic order and documents in ascending id order without any
/// sorting pass. Once populated (via [`PositionalIndex::merge`] or
/// [`crate::persist::load_index`]) the index is read-only; queries borrow it
/// immutably.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PositionalIndex {
    pub postings: BTreeMap<String, BTreeMap<DocId, Vec<Position>>>,
}

impl PositionalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the global index from per-document token maps.
    ///
    /// Every `(token, document)` pair present in the input ends up in the
    /// index with its position list stored exactly as supplied: no
    /// deduplication, no reordering. Callers merge exactly once per index
    /// instance; merging into a populated index is not supported.
    pub fn merge(&mut self, documents: BTreeMap<DocId, TokenPositions>) {
        debug_assert!(self.postings.is_empty(), "merge called on a populated index");
        for (doc_id, tokens) in documents {
            for (token, positions) in tokens {
                self.postings.entry(token).or_default().insert(doc_id, positions);
            }
        }
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
