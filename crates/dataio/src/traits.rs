use std::borrow::Cow;
use std::ops::Deref;

use homologset_core::{SEQUENCE_ATTR, TaggedRecord};

use crate::error::DataIoError;
use crate::format::Format;

/// One or many records handed to [`FormatAdapter::write`].
#[derive(Debug, Clone)]
pub struct RecordBatch<'a>(Cow<'a, [TaggedRecord]>);

impl Deref for RecordBatch<'_> {
    type Target = [TaggedRecord];

    fn deref(&self) -> &[TaggedRecord] {
        &self.0
    }
}

impl From<TaggedRecord> for RecordBatch<'_> {
    fn from(record: TaggedRecord) -> Self {
        Self(Cow::Owned(vec![record]))
    }
}

impl<'a> From<&'a TaggedRecord> for RecordBatch<'a> {
    fn from(record: &'a TaggedRecord) -> Self {
        Self(Cow::Borrowed(std::slice::from_ref(record)))
    }
}

impl From<Vec<TaggedRecord>> for RecordBatch<'_> {
    fn from(records: Vec<TaggedRecord>) -> Self {
        Self(Cow::Owned(records))
    }
}

impl<'a> From<&'a [TaggedRecord]> for RecordBatch<'a> {
    fn from(records: &'a [TaggedRecord]) -> Self {
        Self(Cow::Borrowed(records))
    }
}

impl<'a> From<&'a Vec<TaggedRecord>> for RecordBatch<'a> {
    fn from(records: &'a Vec<TaggedRecord>) -> Self {
        Self(Cow::Borrowed(records.as_slice()))
    }
}

/// A text format that converts between raw input and tagged records.
///
/// Both directions are pure. For values free of the format's reserved
/// characters, `read(write(records), tags) == records`.
pub trait FormatAdapter {
    fn format(&self) -> Format;

    /// Parse `raw` into records. `tags` names the positional header fields
    /// for formats that have them and restricts the columns kept otherwise;
    /// an empty slice keeps everything.
    fn read(&self, raw: &str, tags: &[String]) -> Result<Vec<TaggedRecord>, DataIoError>;

    fn write_records(&self, records: &[TaggedRecord]) -> Result<String, DataIoError>;

    fn write<'a>(&self, records: impl Into<RecordBatch<'a>>) -> Result<String, DataIoError>
    where
        Self: Sized,
    {
        self.write_records(&records.into())
    }
}

/// Keep the sequence plus the fields named in `tags`; an empty list keeps
/// everything.
pub(crate) fn restrict_fields(record: TaggedRecord, tags: &[String]) -> TaggedRecord {
    match record {
        TaggedRecord::Named(fields) if !tags.is_empty() => TaggedRecord::Named(
            fields
                .into_iter()
                .filter(|(k, _)| k == SEQUENCE_ATTR || tags.iter().any(|t| t == k))
                .collect(),
        ),
        other => other,
    }
}
