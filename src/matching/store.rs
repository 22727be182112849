//! Run-scoped result accumulation and append-only export.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::errors::{DocAlignError, Result, ResultExt};
use crate::core::model::SemanticMatch;

/// Collects the matches of one run.
///
/// `add` may be called from any worker thread. Export happens once, after
/// every producer has finished.
#[derive(Debug, Default)]
pub struct ResultStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    entries: Vec<(usize, SemanticMatch)>,
    /// Always greater than every ordinal stored so far
    next_ordinal: usize,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match after everything stored so far, including matches placed
    /// with [`insert_at`](Self::insert_at).
    pub fn add(&self, m: SemanticMatch) {
        let mut state = self.state.lock();
        let ordinal = state.next_ordinal;
        state.next_ordinal += 1;
        state.entries.push((ordinal, m));
    }

    /// Add a match under an explicit ordinal; export sorts by ordinal so
    /// parallel producers still yield a deterministic file. Equal ordinals
    /// keep insertion order.
    pub fn insert_at(&self, ordinal: usize, m: SemanticMatch) {
        let mut state = self.state.lock();
        state.next_ordinal = state.next_ordinal.max(ordinal.saturating_add(1));
        state.entries.push((ordinal, m));
    }

    /// Number of stored matches.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no match was stored.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Stored matches in ordinal order.
    pub fn matches(&self) -> Vec<SemanticMatch> {
        let mut entries = self.state.lock().entries.clone();
        entries.sort_by_key(|(ordinal, _)| *ordinal);
        entries.into_iter().map(|(_, m)| m).collect()
    }

    /// Drop everything stored so far.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.next_ordinal = 0;
    }

    /// Append every match to `destination`, one JSON record per entry, each
    /// followed by a newline. Returns the number of records written.
    pub fn export_all(&self, destination: impl AsRef<Path>, pretty: bool) -> Result<usize> {
        let destination = destination.as_ref();
        let matches = self.matches();

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DocAlignError::io(
                    format!("Failed to create output directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .map_err(|e| {
                DocAlignError::io(
                    format!("Failed to open results file: {}", destination.display()),
                    e,
                )
            })?;
        let mut writer = BufWriter::new(file);
        let context = || format!("Failed to write results file {}", destination.display());

        for m in &matches {
            if pretty {
                serde_json::to_writer_pretty(&mut writer, m).with_context(context)?;
            } else {
                serde_json::to_writer(&mut writer, m).with_context(context)?;
            }
            writer.write_all(b"\n").with_context(context)?;
        }
        writer.flush().with_context(context)?;

        info!(
            records = matches.len(),
            "Exported results to {}",
            destination.display()
        );
        Ok(matches.len())
    }

    /// Summary of the stored matches.
    pub fn summary(&self, tags_analyzed: usize) -> RunSummary {
        RunSummary::from_matches(&self.matches(), tags_analyzed)
    }
}

/// Remove the results file so the next export starts from scratch.
pub fn clear_destination(destination: impl AsRef<Path>) -> Result<()> {
    let destination = destination.as_ref();
    match std::fs::remove_file(destination) {
        Ok(()) => {
            debug!("Removed previous results at {}", destination.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocAlignError::io(
            format!("Failed to remove results file: {}", destination.display()),
            e,
        )),
    }
}

/// Aggregate counts for a run or a results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tags that took part in matching
    pub tags_analyzed: usize,
    /// Matches produced
    pub matches: usize,
    /// Matches carrying a ground truth
    pub with_ground_truth: usize,
    /// Matches whose top candidate equals the ground truth
    pub correct: usize,
    /// Matches with the ground truth anywhere in the list
    pub partially_correct: usize,
    /// Records written by the last export
    #[serde(default)]
    pub exported: usize,
}

impl RunSummary {
    /// Summarize `matches`; `tags_analyzed` is the number of tags attempted.
    pub fn from_matches(matches: &[SemanticMatch], tags_analyzed: usize) -> Self {
        let with_truth = matches.iter().filter(|m| m.ground_truth.is_some());
        Self {
            tags_analyzed,
            matches: matches.len(),
            with_ground_truth: with_truth.clone().count(),
            correct: with_truth.clone().filter(|m| m.is_correct).count(),
            partially_correct: with_truth.filter(|m| m.is_partially_correct).count(),
            exported: 0,
        }
    }

    /// Share of ground-truth matches whose top candidate is right.
    pub fn precision(&self) -> f64 {
        ratio(self.correct, self.with_ground_truth)
    }

    /// Share of ground-truth matches listing the right candidate anywhere.
    pub fn partial_precision(&self) -> f64 {
        ratio(self.partially_correct, self.with_ground_truth)
    }

    /// Share of analysed tags that produced a match.
    pub fn coverage(&self) -> f64 {
        ratio(self.matches, self.tags_analyzed)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StrategyKind;
    use crate::core::model::{CandidateElement, Tag, TagKind};
    use indexmap::IndexMap;
    use std::sync::Arc;

    fn sample(comment: &str, correct: bool) -> SemanticMatch {
        let mut candidates = IndexMap::new();
        candidates.insert(CandidateElement::new("m()", ["isEmpty"], "isEmpty()"), 0.1);
        SemanticMatch {
            tag: Tag::new(TagKind::Return, comment, "isEmpty()"),
            method_name: "m".into(),
            method_signature: "m()".into(),
            parsed_comment: comment.into(),
            threshold_used: -1.0,
            strategy: StrategyKind::Cosine,
            candidates,
            is_correct: correct,
            is_partially_correct: true,
            ground_truth: Some("isEmpty()".into()),
        }
    }

    #[test]
    fn export_appends_newline_terminated_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("semantic_List_results.json");

        let store = ResultStore::new();
        store.add(sample("first", true));
        store.add(sample("second", false));
        assert_eq!(store.export_all(&path, false).unwrap(), 2);
        assert_eq!(store.export_all(&path, false).unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
        assert!(content.ends_with('\n'));
        assert!(content.lines().next().unwrap().contains("\"first\""));
    }

    #[test]
    fn pretty_export_is_multiline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let store = ResultStore::new();
        store.add(sample("only", true));
        store.export_all(&path, true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().count() > 1);
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn ordinals_fix_export_order() {
        let store = Arc::new(ResultStore::new());
        std::thread::scope(|s| {
            for i in (0..8).rev() {
                let store = Arc::clone(&store);
                s.spawn(move || store.insert_at(i, sample(&format!("c{i}"), true)));
            }
        });
        let comments: Vec<String> = store.matches().into_iter().map(|m| m.parsed_comment).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("c{i}")).collect();
        assert_eq!(comments, expected);
    }

    #[test]
    fn add_lands_after_explicit_ordinals() {
        let store = ResultStore::new();
        store.insert_at(5, sample("five", true));
        store.add(sample("added", true));
        store.insert_at(2, sample("two", true));
        store.add(sample("last", true));

        let comments: Vec<String> = store.matches().into_iter().map(|m| m.parsed_comment).collect();
        assert_eq!(comments, ["two", "five", "added", "last"]);

        store.clear();
        store.add(sample("fresh", true));
        store.insert_at(0, sample("zero", true));
        let comments: Vec<String> = store.matches().into_iter().map(|m| m.parsed_comment).collect();
        assert_eq!(comments, ["fresh", "zero"]);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new();
        store.add(sample("x", true));
        // a directory cannot be opened for appending
        let err = store.export_all(dir.path(), false).unwrap_err();
        assert!(matches!(err, DocAlignError::Io { .. }));
    }

    #[test]
    fn clear_destination_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.json");
        clear_destination(&path).unwrap();
        std::fs::write(&path, "x").unwrap();
        clear_destination(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn summary_counts_and_ratios() {
        let store = ResultStore::new();
        store.add(sample("a", true));
        store.add(sample("b", false));
        let summary = store.summary(4);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.partially_correct, 2);
        assert!((summary.precision() - 0.5).abs() < 1e-12);
        assert!((summary.coverage() - 0.5).abs() < 1e-12);
    }
}
