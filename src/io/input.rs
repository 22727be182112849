//! Loaders for extractor output.
//!
//! Malformed input is fatal: every loader returns
//! [`DocAlignError::InputData`] naming the offending file.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::core::errors::{DocAlignError, Result};
use crate::core::model::{CandidateElement, DocumentedMethod, GroundTruth, GroundTruthEntry};

/// Everything a run consumes besides configuration.
#[derive(Debug, Clone, Default)]
pub struct MatchInputs {
    /// Documented methods
    pub methods: Vec<DocumentedMethod>,
    /// Candidate expressions of every method
    pub candidates: Vec<CandidateElement>,
    /// Expected expressions, possibly empty
    pub ground_truth: GroundTruth,
}

impl MatchInputs {
    /// Load methods and candidates, plus ground truth when a path is given.
    pub fn load(
        methods: impl AsRef<Path>,
        candidates: impl AsRef<Path>,
        ground_truth: Option<&Path>,
    ) -> Result<Self> {
        let ground_truth = match ground_truth {
            Some(path) => load_ground_truth(path)?,
            None => GroundTruth::default(),
        };
        Ok(Self {
            methods: load_methods(methods)?,
            candidates: load_candidates(candidates)?,
            ground_truth,
        })
    }
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DocAlignError::io(format!("Failed to read input file: {}", path.display()), e)
    })?;
    serde_json::from_str(&content)
        .map_err(|e| DocAlignError::input(path.display().to_string(), e.to_string()))
}

/// Load documented methods from a JSON list.
pub fn load_methods(path: impl AsRef<Path>) -> Result<Vec<DocumentedMethod>> {
    let path = path.as_ref();
    let methods: Vec<DocumentedMethod> = read_json_list(path)?;

    if let Some(idx) = methods.iter().position(|m| m.signature.trim().is_empty()) {
        return Err(DocAlignError::input(
            path.display().to_string(),
            format!("method #{idx} has an empty signature"),
        ));
    }

    let tags: usize = methods.iter().map(|m| m.tags.len()).sum();
    info!(methods = methods.len(), tags, "Loaded methods from {}", path.display());
    Ok(methods)
}

/// Load candidate expressions from a JSON list.
pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<CandidateElement>> {
    let path = path.as_ref();
    let candidates: Vec<CandidateElement> = read_json_list(path)?;

    if let Some(idx) = candidates.iter().position(|c| c.identifiers.is_empty()) {
        return Err(DocAlignError::input(
            path.display().to_string(),
            format!("candidate #{idx} has no identifiers"),
        ));
    }

    info!(candidates = candidates.len(), "Loaded candidates from {}", path.display());
    Ok(candidates)
}

/// Load ground-truth entries from a JSON list.
pub fn load_ground_truth(path: impl AsRef<Path>) -> Result<GroundTruth> {
    let path = path.as_ref();
    let entries: Vec<GroundTruthEntry> = read_json_list(path)?;
    info!(entries = entries.len(), "Loaded ground truth from {}", path.display());
    Ok(GroundTruth::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TagKind;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_methods_with_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "methods.json",
            r#"[{"signature":"java.util.List.get(int)","tags":[
                {"kind":"THROWS","comment":"if the index is out of range","condition":"index < 0","exception":"IndexOutOfBoundsException"},
                {"kind":"return","comment":"the element"}
            ]}]"#,
        );

        let methods = load_methods(&path).unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name(), "get");
        assert_eq!(methods[0].tags[0].kind, TagKind::Throws);
        assert_eq!(methods[0].analyzable_tags().count(), 1);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "methods.json", r#"[{"tags":[]}]"#);
        let err = load_methods(&path).unwrap_err();
        match err {
            DocAlignError::InputData { source_name, .. } => assert!(source_name.ends_with("methods.json")),
            other => panic!("expected InputData, got {other:?}"),
        }
    }

    #[test]
    fn empty_signature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "methods.json", r#"[{"signature":"  "}]"#);
        assert!(matches!(load_methods(&path), Err(DocAlignError::InputData { .. })));
    }

    #[test]
    fn candidates_need_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write(
            &dir,
            "ok.json",
            r#"[{"owner_method_signature":"m()","identifiers":["isEmpty"],"expression":"isEmpty()"}]"#,
        );
        assert_eq!(load_candidates(&ok).unwrap().len(), 1);

        let bad = write(
            &dir,
            "bad.json",
            r#"[{"owner_method_signature":"m()","identifiers":[],"expression":"x"}]"#,
        );
        assert!(load_candidates(&bad).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_candidates("/no/such/candidates.json"),
            Err(DocAlignError::Io { .. })
        ));
    }

    #[test]
    fn inputs_load_optional_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let methods = write(&dir, "m.json", r#"[{"signature":"m()"}]"#);
        let candidates = write(&dir, "c.json", "[]");
        let truth = write(
            &dir,
            "t.json",
            r#"[{"method_signature":"m()","kind":"RETURN","expression":"size()"}]"#,
        );

        let without = MatchInputs::load(&methods, &candidates, None).unwrap();
        assert!(without.ground_truth.is_empty());
        let with = MatchInputs::load(&methods, &candidates, Some(truth.as_path())).unwrap();
        assert_eq!(with.ground_truth.len(), 1);
    }
}
