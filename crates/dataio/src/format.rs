use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::DataIoError;

/// Serialization formats a homolog set can be exchanged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Fasta,
    Csv,
    Json,
    Snapshot,
    EntrezXml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fasta => "fasta",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Snapshot => "snapshot",
            Self::EntrezXml => "entrez_xml",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DataIoError> {
        match s.to_ascii_lowercase().as_str() {
            "fasta" | "fa" | "faa" | "fna" => Ok(Self::Fasta),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "snapshot" | "hset" => Ok(Self::Snapshot),
            "entrez_xml" | "entrez" | "xml" => Ok(Self::EntrezXml),
            _ => Err(DataIoError::UnknownFormat(s.to_string())),
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DataIoError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| DataIoError::UnknownFormat(path.display().to_string()))
            .and_then(|ext| {
                Self::parse(ext)
                    .map_err(|_| DataIoError::UnknownFormat(path.display().to_string()))
            })
    }

    /// Whether the format is read and written as bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Snapshot)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
