//! Mod list loading
//!
//! The mod list is a JSON array of `{"name": ..., "url"?: ...}` objects.
//! Only the top-level structure is checked here; each entry is validated
//! individually by the coordinator so one bad entry never aborts the batch.
//! Batch-fatal errors are only logged at debug level; the caller reports them.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::{BatchError, BatchResult};

/// Read and parse the mod list, returning its raw entries in order
///
/// # Errors
///
/// Returns `BatchError` if the file cannot be read, is not valid JSON,
/// or its top-level value is not an array
pub async fn load_mod_list(path: &Path) -> BatchResult<Vec<Value>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        debug!("Failed to read mod list {}: {}", path.display(), source);
        BatchError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let entries = parse_mod_list(&content).map_err(|e| match e {
        BatchError::Parse { source, .. } => BatchError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse mod list content
pub fn parse_mod_list(content: &str) -> BatchResult<Vec<Value>> {
    let document: Value = serde_json::from_str(content).map_err(|source| {
        debug!("Mod list is not valid JSON: {}", source);
        BatchError::Parse {
            path: Default::default(),
            source,
        }
    })?;

    match document {
        Value::Array(entries) => Ok(entries),
        _ => {
            debug!("Mod list is not a JSON array");
            Err(BatchError::NotAnArray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing::Level;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_parse_array_keeps_order_and_bad_entries() {
        let entries =
            parse_mod_list(r#"[{"name":"sodium"}, {"url":"x"}, 3, {"name":"lithium"}]"#).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["name"], "sodium");
        assert_eq!(entries[3]["name"], "lithium");
    }

    #[test]
    fn test_parse_object_is_rejected() {
        let result = parse_mod_list(r#"{"name":"sodium"}"#);
        assert!(matches!(result, Err(BatchError::NotAnArray)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_mod_list("[{\"name\":");
        assert!(matches!(result, Err(BatchError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_mod_list(&temp_dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(BatchError::Read { .. })));
    }

    #[tokio::test]
    async fn test_load_reports_path_on_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mods.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        match load_mod_list(&path).await {
            Err(BatchError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected BatchError::Parse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fatal_input_errors_stay_below_warn() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let temp_dir = TempDir::new().unwrap();
        let object = temp_dir.path().join("object.json");
        let broken = temp_dir.path().join("broken.json");
        tokio::fs::write(&object, r#"{"name":"sodium"}"#).await.unwrap();
        tokio::fs::write(&broken, "[{").await.unwrap();

        assert!(load_mod_list(&object).await.is_err());
        assert!(load_mod_list(&broken).await.is_err());
        assert!(load_mod_list(&temp_dir.path().join("missing.json"))
            .await
            .is_err());

        assert_eq!(logs.contents(), "");
    }
}
