//! Static word-vector table in GloVe text format.
//!
//! One entry per line: the word followed by its space-separated components.
//! A leading `<count> <dimension>` header (word2vec text format) is skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::core::errors::{DocAlignError, Result, ResultExt};

use super::EmbeddingLookup;

/// In-memory word-vector table keyed by lowercase word.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl EmbeddingTable {
    /// Load a table from a GloVe text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DocAlignError::io(format!("Failed to open embedding table: {}", path.display()), e)
        })?;
        let table = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        info!(
            words = table.len(),
            dimension = table.dimension,
            "Loaded embedding table from {}",
            path.display()
        );
        Ok(table)
    }

    /// Parse a table from any buffered reader. `label` names the source in errors.
    pub fn from_reader<R: BufRead>(reader: R, label: &str) -> Result<Self> {
        let mut table = Self::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DocAlignError::io(format!("Failed to read {label}"), e))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            if line_no == 0 && values.len() == 1 && is_header(word, values[0]) {
                debug!("Skipping word2vec header in {}", label);
                continue;
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    DocAlignError::embedding_for(
                        format!("{label}:{}: invalid component: {e}", line_no + 1),
                        word,
                    )
                })?;
            table
                .insert(word, vector)
                .with_context(|| format!("{label}:{}", line_no + 1))?;
        }

        Ok(table)
    }

    /// Build a table from in-memory entries.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for (word, vector) in entries {
            table.insert(word.as_ref(), vector)?;
        }
        Ok(table)
    }

    /// Insert a vector. The first vector fixes the table dimension; the first
    /// occurrence of a word wins. Components must be finite.
    pub fn insert(&mut self, word: &str, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(DocAlignError::embedding_for("empty vector", word));
        }
        if let Some(position) = vector.iter().position(|v| !v.is_finite()) {
            return Err(DocAlignError::embedding_for(
                format!("non-finite component at position {position}"),
                word,
            ));
        }
        if self.vectors.is_empty() && self.dimension == 0 {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(DocAlignError::embedding_for(
                format!(
                    "dimension mismatch: expected {}, found {}",
                    self.dimension,
                    vector.len()
                ),
                word,
            ));
        }
        self.vectors.entry(word.to_lowercase()).or_insert(vector);
        Ok(())
    }

    /// Number of words in the table.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Borrowing lookup.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(&word.to_lowercase()).map(Vec::as_slice)
    }
}

fn is_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

impl EmbeddingLookup for EmbeddingTable {
    fn lookup(&self, word: &str) -> Option<Vec<f32>> {
        self.get(word).map(<[f32]>::to_vec)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
