//! Delimited tables: a header row of tag names, one record per row.

use homologset_core::{AttrValue, Fields, TaggedRecord};

use crate::error::DataIoError;
use crate::format::Format;
use crate::traits::{FormatAdapter, restrict_fields};

pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Copy)]
pub struct CsvAdapter {
    delimiter: u8,
}

impl Default for CsvAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl CsvAdapter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

fn csv_error(e: csv::Error) -> DataIoError {
    DataIoError::format(Format::Csv, e)
}

impl FormatAdapter for CsvAdapter {
    fn format(&self) -> Format {
        Format::Csv
    }

    fn read(&self, raw: &str, tags: &[String]) -> Result<Vec<TaggedRecord>, DataIoError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(raw.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if let Some(missing) = tags
            .iter()
            .find(|t| !headers.is_empty() && !headers.contains(*t))
        {
            return Err(DataIoError::format(
                Format::Csv,
                format!("column {missing:?} not in header"),
            ));
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            let fields: Fields = headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.clone(), AttrValue::Text(v.to_string())))
                .collect();
            records.push(restrict_fields(TaggedRecord::Named(fields), tags));
        }
        tracing::debug!(records = records.len(), "parsed csv");
        Ok(records)
    }

    /// The header is the union of all record keys in first-seen order;
    /// cells a record lacks are left empty.
    fn write_records(&self, records: &[TaggedRecord]) -> Result<String, DataIoError> {
        let rows = records
            .iter()
            .cloned()
            .map(TaggedRecord::into_fields)
            .collect::<Result<Vec<_>, _>>()?;

        let mut header: Vec<&str> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !header.contains(&key.as_str()) {
                    header.push(key);
                }
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        if !rows.is_empty() {
            writer.write_record(&header).map_err(csv_error)?;
        }
        for row in &rows {
            let cells: Vec<String> = header
                .iter()
                .map(|key| row.get(*key).map(ToString::to_string).unwrap_or_default())
                .collect();
            writer.write_record(&cells).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DataIoError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| DataIoError::Serialization(e.to_string()))
    }
}
