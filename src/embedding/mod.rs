//! Word-vector lookup and aggregation.
//!
//! Everything downstream of normalization sees word vectors only through
//! [`EmbeddingLookup`]. A static table in GloVe text format is the default
//! source; the `model` feature adds a locally run embedding model.

pub mod aggregate;
#[cfg(feature = "model")]
pub mod model;
pub mod table;

pub use aggregate::{add_assign, aggregate, cosine_distance, cosine_similarity, normalize};
#[cfg(feature = "model")]
pub use model::ModelEmbeddings;
pub use table::EmbeddingTable;

use std::sync::Arc;

use crate::core::config::{EmbeddingConfig, EmbeddingSource};
use crate::core::errors::{DocAlignError, Result};

/// Read-only word-vector source shared across worker threads.
pub trait EmbeddingLookup: Send + Sync {
    /// Vector for `word` (case-insensitive), or `None` when unknown.
    fn lookup(&self, word: &str) -> Option<Vec<f32>>;

    /// Dimension of every returned vector.
    fn dimension(&self) -> usize;
}

impl<T: EmbeddingLookup + ?Sized> EmbeddingLookup for Arc<T> {
    fn lookup(&self, word: &str) -> Option<Vec<f32>> {
        (**self).lookup(word)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Build the lookup selected by `config`.
pub fn open_lookup(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingLookup>> {
    match config.source {
        EmbeddingSource::Table => {
            let path = config.table_path.as_ref().ok_or_else(|| {
                DocAlignError::config_field(
                    "no word-vector table configured",
                    "embedding.table_path",
                )
            })?;
            Ok(Arc::new(EmbeddingTable::from_file(path)?))
        }
        #[cfg(feature = "model")]
        EmbeddingSource::Model => Ok(Arc::new(ModelEmbeddings::new(config)?)),
        #[cfg(not(feature = "model"))]
        EmbeddingSource::Model => Err(DocAlignError::config_field(
            "model embeddings require building with the `model` feature",
            "embedding.source",
        )),
    }
}
