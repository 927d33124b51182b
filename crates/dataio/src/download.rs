//! Batched Entrez downloads.
//!
//! The HTTP client is supplied by the caller through [`EntrezClient`]; this
//! module only decides how accessions are chunked and how the concatenated
//! XML is turned back into records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use homologset_core::{AttrValue, Fields};

use crate::error::DataIoError;
use crate::formats::entrez::{DEFAULT_ROOT_TAG, DEFAULT_TAG_PREFIX, EntrezXmlAdapter};

/// Server-side history handle returned by `epost`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHandle {
    pub web_env: String,
    pub query_key: String,
}

/// The three E-utilities calls a download needs.
pub trait EntrezClient {
    /// `esearch`: resolve a space-separated accession query to UIDs.
    fn search(&self, db: &str, term: &str) -> Result<Vec<String>, DataIoError>;

    /// `epost`: upload UIDs to the history server.
    fn post(&self, db: &str, uids: &[String]) -> Result<PostHandle, DataIoError>;

    /// `efetch` of `max` records starting at `start`, as TSeq XML.
    fn fetch(
        &self,
        db: &str,
        handle: &PostHandle,
        start: usize,
        max: usize,
    ) -> Result<String, DataIoError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrezOptions {
    pub db: String,
    /// Accessions per `esearch`/`epost` round.
    pub post_chunk_size: usize,
    /// Records per `efetch` call.
    pub batch_download_size: usize,
    pub root_tag: String,
    pub tag_prefix: String,
}

impl Default for EntrezOptions {
    fn default() -> Self {
        Self {
            db: "protein".to_string(),
            post_chunk_size: 500,
            batch_download_size: 50,
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

impl EntrezOptions {
    pub fn adapter(&self) -> EntrezXmlAdapter {
        EntrezXmlAdapter::new(self.root_tag.clone(), self.tag_prefix.clone())
    }
}

/// Fetch every accession and return the raw, concatenated XML.
pub fn download_xml<C: EntrezClient + ?Sized>(
    client: &C,
    accessions: &[String],
    options: &EntrezOptions,
) -> Result<String, DataIoError> {
    if options.post_chunk_size == 0 || options.batch_download_size == 0 {
        return Err(DataIoError::Client("chunk sizes must be positive".to_string()));
    }

    let mut total_xml = String::new();
    for chunk in accessions.chunks(options.post_chunk_size) {
        let uids = client.search(&options.db, &chunk.join(" "))?;
        if uids.is_empty() {
            tracing::warn!(accessions = chunk.len(), "entrez search returned no uids");
            continue;
        }
        let handle = client.post(&options.db, &uids)?;

        for start in (0..uids.len()).step_by(options.batch_download_size) {
            let data = client.fetch(&options.db, &handle, start, options.batch_download_size)?;
            tracing::debug!(start, bytes = data.len(), "fetched entrez batch");
            total_xml.push_str(&data);
            total_xml.push('\n');
        }
    }
    Ok(total_xml)
}

/// Fetch and parse every accession into attribute mappings.
pub fn download<C: EntrezClient + ?Sized>(
    client: &C,
    accessions: &[String],
    options: &EntrezOptions,
) -> Result<Vec<Fields>, DataIoError> {
    let xml = download_xml(client, accessions, options)?;
    let records = options.adapter().parse(&xml)?;
    tracing::info!(
        requested = accessions.len(),
        received = records.len(),
        "entrez download complete"
    );
    Ok(records)
}

/// Map each requested accession to its downloaded sequence.
///
/// Records are matched on `accver`, either exactly or by the accession
/// without its version suffix, so a reordered or partial response never
/// assigns a sequence to the wrong accession.
pub fn sequences_by_accession(
    records: &[Fields],
    accessions: &[String],
) -> BTreeMap<String, String> {
    let mut by_accver: BTreeMap<&str, &str> = BTreeMap::new();
    for record in records {
        let accver = record.get("accver").and_then(AttrValue::as_text);
        let sequence = record.get("sequence").and_then(AttrValue::as_text);
        if let (Some(accver), Some(sequence)) = (accver, sequence) {
            by_accver.insert(accver, sequence);
            if let Some((base, _)) = accver.rsplit_once('.') {
                by_accver.entry(base).or_insert(sequence);
            }
        }
    }

    accessions
        .iter()
        .filter_map(|accession| {
            by_accver
                .get(accession.as_str())
                .map(|sequence| (accession.clone(), sequence.to_string()))
        })
        .collect()
}
