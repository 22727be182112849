//! Word mover's distance between two short texts.
//!
//! Each text becomes a normalized bag of words over the embedding space and
//! the distance is the cheapest way to move one bag onto the other, paying the
//! Euclidean distance between word vectors. Small problems are solved exactly
//! as an assignment between replicated unit masses; beyond
//! `max_exact_units` the relaxed lower bound is used instead.

use std::sync::Arc;

use indexmap::IndexMap;
use pathfinding::prelude::{kuhn_munkres_min, Matrix};
use thiserror::Error;
use tracing::trace;

use crate::core::config::TransportConfig;
use crate::embedding::EmbeddingLookup;

/// Fixed-point scale for assignment costs.
const COST_SCALE: f64 = 1e6;

/// Raised when one side of a comparison has no word with a vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no known words in {side:?}")]
pub struct VocabularyGap {
    /// Text whose vocabulary could not be resolved
    pub side: String,
}

/// Distance between two space-separated word strings.
pub trait WordTransport: Send + Sync {
    /// Transport cost from `comment` to `candidate`.
    fn distance(&self, comment: &str, candidate: &str) -> Result<f64, VocabularyGap>;
}

/// Bag of known words with normalized weights.
struct WordBag {
    vectors: Vec<Vec<f32>>,
    counts: Vec<usize>,
    total: usize,
}

impl WordBag {
    fn weight(&self, idx: usize) -> f64 {
        self.counts[idx] as f64 / self.total as f64
    }
}

/// Word mover's distance over an [`EmbeddingLookup`].
pub struct WordMoversDistance {
    lookup: Arc<dyn EmbeddingLookup>,
    max_exact_units: usize,
}

impl WordMoversDistance {
    /// Create a solver over `lookup`.
    pub fn new(lookup: Arc<dyn EmbeddingLookup>, config: &TransportConfig) -> Self {
        Self {
            lookup,
            max_exact_units: config.max_exact_units,
        }
    }

    fn bag(&self, text: &str) -> Result<WordBag, VocabularyGap> {
        let mut words: IndexMap<String, (Vec<f32>, usize)> = IndexMap::new();
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            if let Some((_, count)) = words.get_mut(&word) {
                *count += 1;
                continue;
            }
            match self.lookup.lookup(&word) {
                Some(vector) => {
                    words.insert(word, (vector, 1));
                }
                None => trace!("word transport: no vector for {:?}", word),
            }
        }

        if words.is_empty() {
            return Err(VocabularyGap {
                side: text.to_string(),
            });
        }
        let (vectors, counts): (Vec<_>, Vec<_>) = words.into_values().unzip();
        let total = counts.iter().sum();
        Ok(WordBag {
            vectors,
            counts,
            total,
        })
    }

    /// Exact transport; `None` when the unit count exceeds the cap.
    fn exact(&self, from: &WordBag, to: &WordBag, costs: &[Vec<f64>]) -> Option<f64> {
        let units = lcm(from.total, to.total);
        if units > self.max_exact_units {
            return None;
        }

        let rows = replicate(&from.counts, units / from.total);
        let cols = replicate(&to.counts, units / to.total);
        let scaled: Vec<i64> = rows
            .iter()
            .flat_map(|&r| cols.iter().map(move |&c| (costs[r][c] * COST_SCALE).round() as i64))
            .collect();
        let matrix = Matrix::from_vec(units, units, scaled).ok()?;
        let (_, assignment) = kuhn_munkres_min(&matrix);

        let total: f64 = assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| costs[rows[row]][cols[col]])
            .sum();
        Some(total / units as f64)
    }

    /// Relaxed lower bound: each side moves all its mass to the nearest word.
    fn relaxed(from: &WordBag, to: &WordBag, costs: &[Vec<f64>]) -> f64 {
        let forward: f64 = (0..from.counts.len())
            .map(|i| from.weight(i) * costs[i].iter().copied().fold(f64::INFINITY, f64::min))
            .sum();
        let backward: f64 = (0..to.counts.len())
            .map(|j| {
                to.weight(j)
                    * costs
                        .iter()
                        .map(|row| row[j])
                        .fold(f64::INFINITY, f64::min)
            })
            .sum();
        forward.max(backward)
    }
}

impl WordTransport for WordMoversDistance {
    fn distance(&self, comment: &str, candidate: &str) -> Result<f64, VocabularyGap> {
        let from = self.bag(comment)?;
        let to = self.bag(candidate)?;

        let costs: Vec<Vec<f64>> = from
            .vectors
            .iter()
            .map(|a| to.vectors.iter().map(|b| euclidean(a, b)).collect())
            .collect();

        Ok(self
            .exact(&from, &to, &costs)
            .unwrap_or_else(|| Self::relaxed(&from, &to, &costs)))
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Word index of every unit mass, `factor` units per occurrence.
fn replicate(counts: &[usize], factor: usize) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(idx, &count)| std::iter::repeat(idx).take(count * factor))
        .collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingTable;
    use approx::assert_relative_eq;

    fn solver(max_exact_units: usize) -> WordMoversDistance {
        let table = EmbeddingTable::from_entries(vec![
            ("origin", vec![0.0, 0.0]),
            ("right", vec![2.0, 0.0]),
            ("middle", vec![1.0, 0.0]),
            ("far", vec![3.0, 4.0]),
        ])
        .unwrap();
        WordMoversDistance::new(Arc::new(table), &TransportConfig { max_exact_units })
    }

    #[test]
    fn identical_texts_have_zero_distance() {
        let wmd = solver(256);
        assert_relative_eq!(wmd.distance("origin right", "right origin").unwrap(), 0.0);
    }

    #[test]
    fn single_words_cost_their_euclidean_distance() {
        let wmd = solver(256);
        assert_relative_eq!(wmd.distance("origin", "far").unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn mass_is_split_across_words() {
        let wmd = solver(256);
        assert_relative_eq!(wmd.distance("origin right", "middle").unwrap(), 1.0, epsilon = 1e-9);
        // origin x2 and far x1 onto middle x1 and right x1
        let d = wmd.distance("origin origin far", "middle right").unwrap();
        assert!(d > 0.0);
        assert_relative_eq!(d, wmd.distance("middle right", "origin origin far").unwrap(), epsilon = 1e-6);
    }

    #[test]
    fn relaxed_bound_never_exceeds_exact() {
        let exact = solver(256).distance("origin origin far", "middle right").unwrap();
        let relaxed = solver(1).distance("origin origin far", "middle right").unwrap();
        assert!(relaxed <= exact + 1e-9);
        assert!(relaxed > 0.0);
    }

    #[test]
    fn unknown_vocabulary_is_reported() {
        let wmd = solver(256);
        assert!(wmd.distance("origin", "unknown words").is_err());
        assert!(wmd.distance("", "origin").is_err());
        // Unknown words are ignored as long as one word resolves
        assert_relative_eq!(wmd.distance("origin mystery", "far").unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn lcm_of_counts() {
        assert_eq!(lcm(3, 2), 6);
        assert_eq!(lcm(4, 4), 4);
        assert_eq!(replicate(&[2, 1], 2), vec![0, 0, 0, 0, 1, 1]);
    }
}
