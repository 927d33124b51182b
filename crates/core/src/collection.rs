use std::collections::{BTreeMap, BTreeSet};

use crate::attr_value::AttrValue;
use crate::error::CoreError;
use crate::homolog::Homolog;
use crate::ids::{HomologId, IdPrefix, MAX_COUNTER};

/// Attribute that identifies a record across NCBI downloads.
pub const DEFAULT_SECONDARY_KEY: &str = "accver";

/// Incrementally maintained `attribute -> value -> ids` lookup for the
/// attributes a set was asked to index.
#[derive(Debug, Clone, Default)]
struct SecondaryIndex {
    entries: BTreeMap<String, BTreeMap<String, BTreeSet<HomologId>>>,
}

impl SecondaryIndex {
    fn is_indexed(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    fn track(&mut self, attribute: &str) {
        self.entries.entry(attribute.to_string()).or_default();
    }

    fn insert(&mut self, attribute: &str, value: &AttrValue, id: &HomologId) {
        let (Some(values), Some(key)) = (self.entries.get_mut(attribute), value.index_key())
        else {
            return;
        };
        values.entry(key).or_default().insert(id.clone());
    }

    fn remove(&mut self, attribute: &str, value: &AttrValue, id: &HomologId) {
        let (Some(values), Some(key)) = (self.entries.get_mut(attribute), value.index_key())
        else {
            return;
        };
        if let Some(ids) = values.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                values.remove(&key);
            }
        }
    }

    fn lookup(&self, attribute: &str, value: &AttrValue) -> Option<&BTreeSet<HomologId>> {
        let key = value.index_key()?;
        self.entries.get(attribute)?.get(&key)
    }
}

/// In-memory set of homologs keyed by id.
///
/// `max_id` only ever grows: it tracks the highest counter ever seen under
/// this set's prefix, so ids freed by an external edit are never handed out
/// again.
#[derive(Debug, Clone)]
pub struct HomologSet {
    prefix: IdPrefix,
    max_id: u64,
    homologs: BTreeMap<HomologId, Homolog>,
    index: SecondaryIndex,
}

impl Default for HomologSet {
    fn default() -> Self {
        Self::new()
    }
}

impl HomologSet {
    /// Empty set with the default prefix, indexing [`DEFAULT_SECONDARY_KEY`].
    pub fn new() -> Self {
        Self::with_prefix(IdPrefix::default())
    }

    pub fn with_prefix(prefix: IdPrefix) -> Self {
        let mut set = Self {
            prefix,
            max_id: 0,
            homologs: BTreeMap::new(),
            index: SecondaryIndex::default(),
        };
        set.index_attribute(DEFAULT_SECONDARY_KEY);
        set
    }

    /// Rebuild a set from persisted parts. The counter is raised to cover
    /// every id present, so a stale `max_id` can never cause a reissue.
    pub fn from_parts(
        prefix: IdPrefix,
        max_id: u64,
        homologs: impl IntoIterator<Item = Homolog>,
    ) -> Result<Self, CoreError> {
        if max_id > MAX_COUNTER {
            return Err(CoreError::IdSpaceExhausted(prefix.to_string()));
        }
        let mut set = Self::with_prefix(prefix);
        set.max_id = max_id;
        for homolog in homologs {
            set.add(homolog)?;
        }
        Ok(set)
    }

    pub fn prefix(&self) -> IdPrefix {
        self.prefix
    }

    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    pub fn len(&self) -> usize {
        self.homologs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homologs.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.homologs.contains_key(id)
    }

    /// Homologs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Homolog> {
        self.homologs.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &HomologId> {
        self.homologs.keys()
    }

    /// Start maintaining a secondary index for `attribute`.
    pub fn index_attribute(&mut self, attribute: &str) {
        if self.index.is_indexed(attribute) {
            return;
        }
        self.index.track(attribute);
        for homolog in self.homologs.values() {
            if let Some(value) = homolog.attr(attribute) {
                self.index.insert(attribute, value, homolog.id());
            }
        }
    }

    pub fn is_indexed(&self, attribute: &str) -> bool {
        self.index.is_indexed(attribute)
    }

    pub fn add(&mut self, homolog: Homolog) -> Result<(), CoreError> {
        if self.homologs.contains_key(homolog.id().as_str()) {
            return Err(CoreError::DuplicateId(homolog.id().to_string()));
        }
        if let Some(counter) = homolog.id().numeric_suffix(&self.prefix) {
            self.max_id = self.max_id.max(counter);
        }
        for (name, value) in homolog.attributes() {
            self.index.insert(name, value, homolog.id());
        }
        self.homologs.insert(homolog.id().clone(), homolog);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Homolog> {
        self.homologs.get(id)
    }

    pub fn get_by_id(&self, id: &str) -> Result<&Homolog, CoreError> {
        self.get(id).ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Set an attribute on a member homolog, keeping the index current.
    /// Returns the replaced value, if any.
    pub fn set_attribute(
        &mut self,
        id: &str,
        name: &str,
        value: AttrValue,
    ) -> Result<Option<AttrValue>, CoreError> {
        let homolog = self
            .homologs
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let homolog_id = homolog.id().clone();
        self.index.insert(name, &value, &homolog_id);
        let previous = homolog.set(name, value);
        if let Some(old) = &previous {
            let still_same = homolog
                .attr(name)
                .and_then(AttrValue::index_key)
                .zip(old.index_key())
                .is_some_and(|(new, old)| new == old);
            if !still_same {
                self.index.remove(name, old, &homolog_id);
            }
        }
        Ok(previous)
    }

    /// First homolog (in id order) whose `name` equals `value`.
    pub fn find_by_attribute(&self, name: &str, value: &AttrValue) -> Option<&Homolog> {
        self.find_all_by_attribute(name, value)
            .into_iter()
            .next()
            .and_then(|id| self.homologs.get(id.as_str()))
    }

    /// Every homolog id whose `name` equals `value`, in id order.
    pub fn find_all_by_attribute(&self, name: &str, value: &AttrValue) -> Vec<&HomologId> {
        if self.index.is_indexed(name) {
            // Index keys are text, so `Integer(1)` and `Text("1")` share a bucket.
            return self
                .index
                .lookup(name, value)
                .into_iter()
                .flatten()
                .filter(|id| {
                    self.homologs
                        .get(id.as_str())
                        .and_then(|h| h.attr(name))
                        == Some(value)
                })
                .collect();
        }
        self.homologs
            .values()
            .filter(|h| h.attr(name) == Some(value))
            .map(Homolog::id)
            .collect()
    }

    /// The id the next fresh homolog would receive. Does not reserve it.
    pub fn next_id(&self) -> Result<HomologId, CoreError> {
        let counter = self
            .max_id
            .checked_add(1)
            .ok_or_else(|| CoreError::IdSpaceExhausted(self.prefix.to_string()))?;
        self.prefix.format(counter)
    }
}
