use serde::{Deserialize, Serialize};
use std::path::Path;

use homologset_core::{DEFAULT_PREFIX, DEFAULT_SECONDARY_KEY, ID_TAG, IdPrefix};
use homologset_dataio::{AdapterOptions, EntrezOptions, files};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Two uppercase letters prepended to allocated ids.
    pub id_prefix: String,
    /// Attributes tried, in order, when a record carries no `id`.
    pub secondary_keys: Vec<String>,
    /// Header tags used for sequence exports when the caller passes none.
    pub default_tags: Vec<String>,
    pub csv_delimiter: char,
    pub entrez: EntrezOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_PREFIX.to_string(),
            secondary_keys: vec![DEFAULT_SECONDARY_KEY.to_string()],
            default_tags: vec![ID_TAG.to_string()],
            csv_delimiter: ',',
            entrez: EntrezOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = files::read_text(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.prefix()?;
        self.delimiter()?;
        if self.default_tags.is_empty() {
            return Err(EngineError::Config("default_tags must not be empty".into()));
        }
        if self.secondary_keys.iter().any(|k| k.is_empty() || k == ID_TAG) {
            return Err(EngineError::Config(format!(
                "secondary keys must be non-empty attribute names other than `{ID_TAG}`"
            )));
        }
        if self.entrez.post_chunk_size == 0 || self.entrez.batch_download_size == 0 {
            return Err(EngineError::Config(
                "entrez chunk sizes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn prefix(&self) -> Result<IdPrefix, EngineError> {
        IdPrefix::parse(&self.id_prefix).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn adapter_options(&self) -> Result<AdapterOptions, EngineError> {
        Ok(AdapterOptions {
            csv_delimiter: self.delimiter()?,
            entrez_root_tag: self.entrez.root_tag.clone(),
            entrez_tag_prefix: self.entrez.tag_prefix.clone(),
        })
    }

    fn delimiter(&self) -> Result<u8, EngineError> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                EngineError::Config(format!(
                    "csv delimiter must be a single ASCII character, got {:?}",
                    self.csv_delimiter
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.prefix().unwrap().as_str(), "XX");
        assert_eq!(config.secondary_keys, vec!["accver"]);
        assert_eq!(config.adapter_options().unwrap().csv_delimiter, b',');
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"id_prefix": "HS", "entrez": {"db": "nuccore"}}"#)
                .unwrap();
        assert_eq!(config.id_prefix, "HS");
        assert_eq!(config.entrez.db, "nuccore");
        assert_eq!(config.entrez.post_chunk_size, 500);
        assert_eq!(config.default_tags, vec!["id"]);
    }

    #[test]
    fn bad_prefix_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"id_prefix": "hs1"}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err =
            EngineConfig::from_json_str(r#"{"entrez": {"batch_download_size": 0}}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let config = EngineConfig {
            csv_delimiter: '§',
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn id_is_not_a_secondary_key() {
        let config = EngineConfig {
            secondary_keys: vec!["id".into()],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{"),
            Err(EngineError::Config(_))
        ));
    }
}
