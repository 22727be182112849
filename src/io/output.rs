//! Reading results files back.
//!
//! Records may be pretty-printed or compact; they are read as a stream of
//! concatenated JSON values, so files appended by several runs parse as one.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Deserializer;

use crate::core::errors::{DocAlignError, Result};
use crate::core::model::SemanticMatch;
use crate::matching::RunSummary;

/// Every record in a results file, in file order.
pub fn read_results(path: impl AsRef<Path>) -> Result<Vec<SemanticMatch>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        DocAlignError::io(format!("Failed to open results file: {}", path.display()), e)
    })?;

    Deserializer::from_reader(BufReader::new(file))
        .into_iter::<SemanticMatch>()
        .enumerate()
        .map(|(idx, record)| {
            record.map_err(|e| {
                DocAlignError::input(path.display().to_string(), format!("record #{idx}: {e}"))
            })
        })
        .collect()
}

/// Summary of a results file. Tags that produced no match are not recorded,
/// so `tags_analyzed` equals the number of records.
pub fn summarize_results(path: impl AsRef<Path>) -> Result<RunSummary> {
    let matches = read_results(path)?;
    Ok(RunSummary::from_matches(&matches, matches.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StrategyKind;
    use crate::core::model::{CandidateElement, Tag, TagKind};
    use crate::matching::ResultStore;
    use indexmap::IndexMap;

    fn sample(correct: bool) -> SemanticMatch {
        let mut candidates = IndexMap::new();
        candidates.insert(CandidateElement::new("m()", ["size"], "size()"), 0.2);
        candidates.insert(CandidateElement::new("m()", ["isEmpty"], "isEmpty()"), 0.3);
        SemanticMatch {
            tag: Tag::new(TagKind::Return, "c", "isEmpty()"),
            method_name: "m".into(),
            method_signature: "m()".into(),
            parsed_comment: "c".into(),
            threshold_used: 0.5,
            strategy: StrategyKind::Cosine,
            candidates,
            is_correct: correct,
            is_partially_correct: true,
            ground_truth: Some("isEmpty()".into()),
        }
    }

    #[test]
    fn reads_mixed_pretty_and_compact_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");

        let store = ResultStore::new();
        store.add(sample(false));
        store.export_all(&path, true).unwrap();
        store.export_all(&path, false).unwrap();

        let records = read_results(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
        let order: Vec<_> = records[0].candidates.keys().map(|c| c.expression.as_str()).collect();
        assert_eq!(order, vec!["size()", "isEmpty()"]);
    }

    #[test]
    fn summary_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let store = ResultStore::new();
        store.add(sample(true));
        store.add(sample(false));
        store.add(sample(true));
        store.export_all(&path, false).unwrap();

        let summary = summarize_results(&path).unwrap();
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.correct, 2);
        assert!((summary.precision() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn truncated_record_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        std::fs::write(&path, "{\"tag\": ").unwrap();
        assert!(matches!(read_results(&path), Err(DocAlignError::InputData { .. })));
    }
}
