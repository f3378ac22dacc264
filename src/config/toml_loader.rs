//! TOML document loading.
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Deserialize `content`, naming `origin` in any error.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the document is not valid TOML for `T`.
pub fn parse<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Read and deserialize the TOML file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Parse`] if it cannot be deserialized.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content, &path.display().to_string())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default)]
        items: Vec<String>,
    }

    #[test]
    fn parse_valid_document() {
        let s: Sample = parse("name = \"x\"\nitems = [\"a\"]\n", "inline").unwrap();
        assert_eq!(s.name, "x");
        assert_eq!(s.items, ["a"]);
    }

    #[test]
    fn parse_error_names_origin() {
        let err = parse::<Sample>("items = []", "inline").unwrap_err();
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config::<Sample>(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "name = \"from-file\"\n").unwrap();
        let s: Sample = load_config(&path).unwrap();
        assert_eq!(s.name, "from-file");
        assert!(s.items.is_empty());
    }
}
