//! Conversion between homolog attributes and the flat records the format
//! adapters exchange.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::attr_value::AttrValue;
use crate::collection::HomologSet;
use crate::error::CoreError;
use crate::homolog::{Homolog, ID_TAG, SEQUENCE_ATTR};

pub type Fields = BTreeMap<String, AttrValue>;

/// A record on its way into or out of a format adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaggedRecord {
    /// Values addressed by a parallel tag list, plus the sequence
    /// (the FASTA header shape).
    Positional {
        tags: Vec<String>,
        values: Vec<AttrValue>,
        sequence: String,
    },
    /// Attribute name to value (the CSV / JSON / XML shape).
    Named(Fields),
}

impl TaggedRecord {
    pub fn positional<T: AsRef<str>>(
        tags: &[T],
        values: Vec<AttrValue>,
        sequence: impl Into<String>,
    ) -> Self {
        TaggedRecord::Positional {
            tags: tags.iter().map(|t| t.as_ref().to_string()).collect(),
            values,
            sequence: sequence.into(),
        }
    }

    pub fn named<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
    {
        TaggedRecord::Named(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Normalize to an attribute mapping, checking positional arity.
    pub fn into_fields(self) -> Result<Fields, CoreError> {
        match self {
            TaggedRecord::Positional {
                tags,
                values,
                sequence,
            } => from_tagged(values, sequence, &tags),
            TaggedRecord::Named(fields) => Ok(fields),
        }
    }
}

/// Project `homolog` onto `tags`, returning the tag values and the sequence.
pub fn to_tagged<T: AsRef<str>>(
    homolog: &Homolog,
    tags: &[T],
) -> Result<(Vec<AttrValue>, String), CoreError> {
    let values = tags
        .iter()
        .map(|tag| require(homolog, tag.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let sequence = require(homolog, SEQUENCE_ATTR)?.to_string();
    Ok((values, sequence))
}

/// Pair positional `values` with `tags` and add the sequence.
pub fn from_tagged<T: AsRef<str>>(
    values: Vec<AttrValue>,
    sequence: String,
    tags: &[T],
) -> Result<Fields, CoreError> {
    if values.len() != tags.len() {
        return Err(CoreError::ArityMismatch {
            tags: tags.len(),
            values: values.len(),
        });
    }
    let mut fields: Fields = tags
        .iter()
        .map(|t| t.as_ref().to_string())
        .zip(values)
        .collect();
    fields.insert(SEQUENCE_ATTR.to_string(), AttrValue::Text(sequence));
    Ok(fields)
}

/// Named projection of a homolog. `None` selects every attribute plus the id.
pub fn to_metadata<T: AsRef<str>>(
    homolog: &Homolog,
    tags: Option<&[T]>,
) -> Result<Fields, CoreError> {
    match tags {
        None => {
            let mut fields = homolog.attributes().clone();
            fields.insert(ID_TAG.to_string(), AttrValue::Text(homolog.id().to_string()));
            Ok(fields)
        }
        Some(tags) => tags
            .iter()
            .map(|tag| -> Result<(String, AttrValue), CoreError> {
                Ok((tag.as_ref().to_string(), require(homolog, tag.as_ref())?))
            })
            .collect(),
    }
}

/// Positional records for every homolog, in id order.
pub fn project_sequences<T: AsRef<str>>(
    set: &HomologSet,
    tags: &[T],
) -> Result<Vec<TaggedRecord>, CoreError> {
    set.iter()
        .map(|homolog| {
            let (values, sequence) = to_tagged(homolog, tags)?;
            Ok(TaggedRecord::positional(tags, values, sequence))
        })
        .collect()
}

/// Named records for every homolog, in id order.
pub fn project_metadata<T: AsRef<str>>(
    set: &HomologSet,
    tags: Option<&[T]>,
) -> Result<Vec<TaggedRecord>, CoreError> {
    set.iter()
        .map(|homolog| to_metadata(homolog, tags).map(TaggedRecord::Named))
        .collect()
}

fn require(homolog: &Homolog, tag: &str) -> Result<AttrValue, CoreError> {
    homolog
        .tag_value(tag)
        .ok_or_else(|| CoreError::MissingAttribute {
            id: homolog.id().to_string(),
            attribute: tag.to_string(),
        })
}
