use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::attr_value::AttrValue;
use crate::error::CoreError;
use crate::ids::HomologId;

/// Reserved attribute holding the residue string.
pub const SEQUENCE_ATTR: &str = "sequence";

/// Tag that addresses a homolog's id rather than one of its attributes.
pub const ID_TAG: &str = "id";

/// A single sequence record: an immutable id plus a schema-less attribute bag.
///
/// Two homologs are equal when their ids are equal, whatever their attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Homolog {
    id: HomologId,
    attributes: BTreeMap<String, AttrValue>,
}

impl Homolog {
    pub fn new(id: HomologId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_sequence(id: HomologId, sequence: impl Into<String>) -> Self {
        let mut homolog = Self::new(id);
        homolog.set(SEQUENCE_ATTR, AttrValue::Text(sequence.into()));
        homolog
    }

    pub fn id(&self) -> &HomologId {
        &self.id
    }

    pub fn get(&self, name: &str) -> Result<&AttrValue, CoreError> {
        self.attributes
            .get(name)
            .ok_or_else(|| CoreError::AttributeNotFound(name.to_string()))
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Overwrite or insert an attribute. Returns the replaced value, if any.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        self.attributes.insert(name.into(), value)
    }

    pub fn sequence(&self) -> Option<&str> {
        self.attr(SEQUENCE_ATTR).and_then(AttrValue::as_text)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Value addressed by `tag`: the id for [`ID_TAG`], otherwise the attribute.
    pub fn tag_value(&self, tag: &str) -> Option<AttrValue> {
        if tag == ID_TAG {
            return Some(AttrValue::Text(self.id.to_string()));
        }
        self.attributes.get(tag).cloned()
    }
}

impl PartialEq for Homolog {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Homolog {}

impl Hash for Homolog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
