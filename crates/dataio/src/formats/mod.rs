pub mod delimited;
pub mod entrez;
pub mod fasta;
pub mod json;
pub mod snapshot;

use crate::error::DataIoError;
use crate::format::Format;
use crate::traits::FormatAdapter;

pub use delimited::CsvAdapter;
pub use entrez::EntrezXmlAdapter;
pub use fasta::FastaAdapter;
pub use json::JsonAdapter;

/// Settings the text adapters need beyond the raw input.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub csv_delimiter: u8,
    pub entrez_root_tag: String,
    pub entrez_tag_prefix: String,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            csv_delimiter: delimited::DEFAULT_DELIMITER,
            entrez_root_tag: entrez::DEFAULT_ROOT_TAG.to_string(),
            entrez_tag_prefix: entrez::DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

/// The record adapter for a text format. Snapshots are whole-set binaries
/// and go through [`snapshot`] instead.
pub fn adapter_for(
    format: Format,
    options: &AdapterOptions,
) -> Result<Box<dyn FormatAdapter>, DataIoError> {
    match format {
        Format::Fasta => Ok(Box::new(FastaAdapter)),
        Format::Csv => Ok(Box::new(CsvAdapter::new(options.csv_delimiter))),
        Format::Json => Ok(Box::new(JsonAdapter)),
        Format::EntrezXml => Ok(Box::new(EntrezXmlAdapter::new(
            options.entrez_root_tag.clone(),
            options.entrez_tag_prefix.clone(),
        ))),
        Format::Snapshot => Err(DataIoError::Unsupported {
            format,
            operation: "record adapters",
        }),
    }
}
