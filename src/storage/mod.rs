use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::errors::PipelineError;

/// Regular files directly under `dir`, sorted by file name so every stage walks
/// the same order on every run. Subdirectories are ignored.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| PipelineError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} files in {}", files.len(), dir.display());
    Ok(files)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let data = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_slice(&data).map_err(|e| PipelineError::parse(path, e))
}

/// Writes `value` as compact JSON to `dir/file_name`, replacing any previous file.
pub fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf, PipelineError> {
    let path = dir.join(file_name);
    let data = serde_json::to_vec(value).map_err(|source| PipelineError::Serialize {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, data).map_err(|e| PipelineError::io(&path, e))?;
    Ok(path)
}

pub fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn lists_sorted_regular_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0xc.json"), "{}").unwrap();
        fs::write(dir.path().join("0xa.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("dedupped")).unwrap();
        fs::write(dir.path().join("0xb.json"), "{}").unwrap();

        let names: Vec<_> = list_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["0xa.json", "0xb.json", "0xc.json"]);
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "trace.json", &json!({"gas": 21000})).unwrap();
        let value: Value = read_json(&path).unwrap();
        assert_eq!(value, json!({"gas": 21000}));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json::<Value>(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }
}
