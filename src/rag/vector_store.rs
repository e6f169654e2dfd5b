use crate::error::{RagError, RagResult};

/// Append-only, in-memory pairing of documents with their embeddings.
///
/// A document is identified only by its insertion index. Every stored vector
/// has the same length as the first one appended.
#[derive(Debug, Default)]
pub struct VectorStore {
    documents: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document and its embedding at the next index, returning that index.
    ///
    /// The dimension check runs before either half is written, so a rejected
    /// append leaves the store untouched.
    pub fn append(&mut self, document: String, vector: Vec<f32>) -> RagResult<usize> {
        if let Some(expected) = self.dimension() {
            if vector.len() != expected {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let index = self.documents.len();
        self.documents.push(document);
        self.vectors.push(vector);
        Ok(index)
    }

    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Length shared by all stored vectors, or `None` while the store is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }

    pub fn all_vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn document_at(&self, index: usize) -> RagResult<&str> {
        self.documents
            .get(index)
            .map(String::as_str)
            .ok_or(RagError::IndexOutOfRange {
                index,
                len: self.documents.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_append_assigns_sequential_indices() {
        let mut store = VectorStore::new();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);

        assert_eq!(assert_ok!(store.append("first".into(), vec![1.0, 0.0])), 0);
        assert_eq!(assert_ok!(store.append("second".into(), vec![0.0, 1.0])), 1);

        assert_eq!(store.size(), 2);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.document_at(1).unwrap(), "second");
        assert_eq!(store.all_vectors()[0], vec![1.0, 0.0]);
    }

    #[test]
    fn test_dimension_mismatch_leaves_store_unchanged() {
        let mut store = VectorStore::new();
        store.append("a".into(), vec![1.0, 2.0, 3.0]).unwrap();

        let err = assert_err!(store.append("b".into(), vec![1.0, 2.0]));
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.size(), 1);
        assert_eq!(store.all_vectors().len(), 1);
    }

    #[test]
    fn test_document_at_out_of_range() {
        let mut store = VectorStore::new();
        store.append("only".into(), vec![0.5]).unwrap();

        let err = assert_err!(store.document_at(1));
        assert!(matches!(err, RagError::IndexOutOfRange { index: 1, len: 1 }));
    }
}
