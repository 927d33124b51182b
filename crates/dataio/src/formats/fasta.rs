//! FASTA: `>field0|field1|...` header lines followed by sequence lines of
//! uppercase residues and gaps.

use std::sync::LazyLock;

use homologset_core::{AttrValue, TaggedRecord};
use regex::Regex;

use crate::error::DataIoError;
use crate::format::Format;
use crate::traits::FormatAdapter;

pub const FIELD_SEPARATOR: &str = "|";

static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">.+\n[A-Z\-\n]+").expect("FASTA block pattern is valid")
});

/// Header fields and sequence of one FASTA block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaBlock {
    pub header: Vec<String>,
    pub sequence: String,
}

/// Split FASTA text into blocks. Anything that is not part of a well-formed
/// block is reported, never skipped.
pub fn parse_blocks(data: &str) -> Result<Vec<FastaBlock>, DataIoError> {
    let data = data.replace("\r\n", "\n");
    let mut blocks = Vec::new();
    let mut last_end = 0;

    for m in BLOCK.find_iter(&data) {
        check_gap(&data, last_end, m.start())?;
        last_end = m.end();

        let text = m.as_str();
        let Some(newline) = text.find('\n') else {
            continue;
        };
        let header = text[1..newline]
            .trim()
            .split(FIELD_SEPARATOR)
            .map(|field| field.trim().to_string())
            .collect();
        let sequence = text[newline + 1..].trim().replace('\n', "");
        blocks.push(FastaBlock { header, sequence });
    }
    check_gap(&data, last_end, data.len())?;

    tracing::debug!(blocks = blocks.len(), "parsed fasta");
    Ok(blocks)
}

fn check_gap(data: &str, start: usize, end: usize) -> Result<(), DataIoError> {
    let gap = &data[start..end];
    if gap.trim().is_empty() {
        return Ok(());
    }
    let line = data[..start].matches('\n').count() + 1;
    let snippet: String = gap.trim().chars().take(40).collect();
    Err(DataIoError::format(
        Format::Fasta,
        format!("unparsable content near line {line}: {snippet:?}"),
    ))
}

/// Render blocks as FASTA text, without a trailing newline.
pub fn render_blocks(blocks: &[FastaBlock]) -> String {
    let mut data = String::new();
    for block in blocks {
        let header = block.header.join(FIELD_SEPARATOR);
        data.push('>');
        data.push_str(header.trim());
        data.push('\n');
        data.push_str(&block.sequence);
        data.push('\n');
    }
    data.trim().to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastaAdapter;

impl FormatAdapter for FastaAdapter {
    fn format(&self) -> Format {
        Format::Fasta
    }

    /// Header fields map positionally onto `tags`. A header with a different
    /// number of fields still yields a record; the arity is checked when the
    /// record is merged.
    fn read(&self, raw: &str, tags: &[String]) -> Result<Vec<TaggedRecord>, DataIoError> {
        Ok(parse_blocks(raw)?
            .into_iter()
            .map(|block| TaggedRecord::Positional {
                tags: tags.to_vec(),
                values: block.header.into_iter().map(AttrValue::Text).collect(),
                sequence: block.sequence,
            })
            .collect())
    }

    fn write_records(&self, records: &[TaggedRecord]) -> Result<String, DataIoError> {
        let blocks = records
            .iter()
            .map(|record| match record {
                TaggedRecord::Positional {
                    values, sequence, ..
                } => Ok(FastaBlock {
                    header: values.iter().map(ToString::to_string).collect(),
                    sequence: sequence.clone(),
                }),
                TaggedRecord::Named(_) => Err(DataIoError::Unsupported {
                    format: Format::Fasta,
                    operation: "named records",
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(render_blocks(&blocks))
    }
}
