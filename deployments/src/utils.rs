//! Helpers for reading and writing the persisted JSON documents

use std::{
    fs,
    io::ErrorKind,
    path::{Path, MAIN_SEPARATOR},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{constants::CONFIG_FILE_STEM, errors::StoreError};

/// Read and parse the JSON document at `path`, returning `None` if it does not exist
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::ReadFile(format!("{}: {}", path.display(), e))),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StoreError::Serde(format!("{}: {}", path.display(), e)))
}

/// Pretty-print `value` to the file at `path`, creating its parent directory if absent
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| StoreError::WriteFile(format!("{}: {}", dir.display(), e)))?;
    }

    let mut contents = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::Serde(format!("{}: {}", path.display(), e)))?;
    contents.push('\n');

    fs::write(path, contents)
        .map_err(|e| StoreError::WriteFile(format!("{}: {}", path.display(), e)))
}

/// Check that `name` can be used as a single path segment
pub fn validate_segment(name: &str) -> Result<(), StoreError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains(MAIN_SEPARATOR)
    {
        return Err(StoreError::InvalidName(format!("`{name}` is not a valid file name")));
    }

    Ok(())
}

/// Check that `name` can address a deployment record without colliding
/// with the network configuration document
pub fn validate_record_name(name: &str) -> Result<(), StoreError> {
    validate_segment(name)?;
    if name == CONFIG_FILE_STEM {
        return Err(StoreError::InvalidName(format!(
            "`{name}` is reserved for the network configuration"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_record_name, validate_segment};

    #[test]
    fn test_validate_names() {
        assert!(validate_segment("sepolia").is_ok());
        assert!(validate_segment("").is_err());
        assert!(validate_segment("..").is_err());
        assert!(validate_segment("a/b").is_err());

        assert!(validate_record_name("Token-proxy").is_ok());
        assert!(validate_record_name("config").is_err());
    }
}
