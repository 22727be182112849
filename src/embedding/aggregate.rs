//! Vector aggregation and cosine distance.

use tracing::trace;

use super::EmbeddingLookup;

/// Element-wise `acc += v`.
pub fn add_assign(acc: &mut [f32], v: &[f32]) {
    for (a, x) in acc.iter_mut().zip(v) {
        *a += x;
    }
}

/// Sum of the vectors of every word known to `lookup`.
///
/// Unknown words are skipped. Returns `None` when no word resolves, never a
/// zero vector.
pub fn aggregate<'w, I>(words: I, lookup: &dyn EmbeddingLookup) -> Option<Vec<f32>>
where
    I: IntoIterator<Item = &'w str>,
{
    let mut sum: Option<Vec<f32>> = None;
    for word in words {
        let Some(vector) = lookup.lookup(word) else {
            trace!("no vector for {:?}", word);
            continue;
        };
        match sum.as_mut() {
            Some(acc) if acc.len() == vector.len() => add_assign(acc, &vector),
            Some(_) => trace!("dimension mismatch for {:?}; skipped", word),
            None => sum = Some(vector),
        }
    }
    sum
}

/// L2-normalize a vector.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < 1e-10 {
        v.to_vec()
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}

/// Cosine similarity in [-1, 1]; 0 for mismatched, empty or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    checked_cosine(a, b).unwrap_or(0.0)
}

/// Cosine distance `1 - cos`, in [0, 2].
///
/// A zero, empty or mismatched vector has no direction, so the distance is
/// 0 rather than the 1 that `1 - cosine_similarity` would give.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    checked_cosine(a, b).map_or(0.0, |cos| 1.0 - cos)
}

fn checked_cosine(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
    let norm_a: f64 = a.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();

    if norm_a < 1e-10 || norm_b < 1e-10 {
        None
    } else {
        Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}
