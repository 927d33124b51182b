//! Identity resolution for imported records.
//!
//! Every incoming record is matched to at most one homolog, in this order:
//! its explicit `id`, then a unique match on a secondary key, and otherwise a
//! freshly allocated id. Matching fields are then written onto the homolog,
//! last write wins.

use homologset_core::{
    AttrValue, BatchId, CoreError, Fields, HomologId, HomologSet, ID_TAG, TaggedRecord,
};

use crate::factory::{DefaultFactory, HomologFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Updated(HomologId),
    Created(HomologId),
    /// The record was skipped and left the set untouched.
    Rejected(CoreError),
}

impl RecordOutcome {
    pub fn id(&self) -> Option<&HomologId> {
        match self {
            Self::Updated(id) | Self::Created(id) => Some(id),
            Self::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Per-record outcomes of one merged batch, in input order.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub batch_id: BatchId,
    pub outcomes: Vec<RecordOutcome>,
}

impl MergeReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Created(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Updated(_)))
    }

    pub fn rejected(&self) -> usize {
        self.count(RecordOutcome::is_rejected)
    }

    pub fn created_ids(&self) -> Vec<&HomologId> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RecordOutcome::Created(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = (usize, &CoreError)> {
        self.outcomes.iter().enumerate().filter_map(|(i, o)| match o {
            RecordOutcome::Rejected(e) => Some((i, e)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(*o)).count()
    }
}

/// Which homolog a record resolved to, before anything is written.
enum Target {
    Existing(HomologId),
    New(HomologId),
}

pub struct Resolver<F = DefaultFactory> {
    factory: F,
    secondary_keys: Vec<String>,
}

impl Resolver<DefaultFactory> {
    pub fn new(secondary_keys: Vec<String>) -> Self {
        Self::with_factory(DefaultFactory, secondary_keys)
    }
}

impl<F: HomologFactory> Resolver<F> {
    pub fn with_factory(factory: F, secondary_keys: Vec<String>) -> Self {
        Self {
            factory,
            secondary_keys,
        }
    }

    pub fn secondary_keys(&self) -> &[String] {
        &self.secondary_keys
    }

    /// Merge `records` into `set` in order. A rejected record does not stop
    /// the batch and earlier records stay applied.
    pub fn merge(
        &self,
        set: &mut HomologSet,
        records: impl IntoIterator<Item = TaggedRecord>,
    ) -> MergeReport {
        for key in &self.secondary_keys {
            set.index_attribute(key);
        }

        let batch_id = BatchId::new();
        let outcomes: Vec<RecordOutcome> = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let outcome = self
                    .merge_record(set, record)
                    .unwrap_or_else(RecordOutcome::Rejected);
                match &outcome {
                    RecordOutcome::Rejected(error) => {
                        tracing::warn!(%batch_id, position, %error, "record rejected");
                    }
                    RecordOutcome::Created(id) => {
                        tracing::debug!(%batch_id, position, %id, "homolog created");
                    }
                    RecordOutcome::Updated(id) => {
                        tracing::debug!(%batch_id, position, %id, "homolog updated");
                    }
                }
                outcome
            })
            .collect();

        let report = MergeReport { batch_id, outcomes };
        if !report.outcomes.is_empty() {
            tracing::info!(
                %batch_id,
                created = report.created(),
                updated = report.updated(),
                rejected = report.rejected(),
                max_id = set.max_id(),
                "merged batch"
            );
        }
        report
    }

    /// Resolve and apply a single record.
    pub fn merge_record(
        &self,
        set: &mut HomologSet,
        record: TaggedRecord,
    ) -> Result<RecordOutcome, CoreError> {
        let fields = record.into_fields()?;
        match self.resolve(set, &fields)? {
            Target::Existing(id) => {
                apply(set, &id, fields)?;
                Ok(RecordOutcome::Updated(id))
            }
            Target::New(id) => {
                let homolog = self.factory.create(id.clone());
                if homolog.id() != &id {
                    return Err(CoreError::FactoryIdMismatch {
                        expected: id.to_string(),
                        actual: homolog.id().to_string(),
                    });
                }
                set.add(homolog)?;
                apply(set, &id, fields)?;
                Ok(RecordOutcome::Created(id))
            }
        }
    }

    fn resolve(&self, set: &HomologSet, fields: &Fields) -> Result<Target, CoreError> {
        if let Some(id) = explicit_id(fields)? {
            return Ok(if set.contains(id.as_str()) {
                Target::Existing(id)
            } else {
                Target::New(id)
            });
        }

        if let Some((key, value)) = self.secondary_key(fields) {
            let matches = set.find_all_by_attribute(key, value);
            match matches.as_slice() {
                [only] => return Ok(Target::Existing((*only).clone())),
                [] => {}
                many => {
                    tracing::warn!(
                        key,
                        value = %value,
                        matches = many.len(),
                        "ambiguous secondary key, creating a new homolog"
                    );
                }
            }
        }

        Ok(Target::New(set.next_id()?))
    }

    /// The first configured secondary key the record carries a value for.
    fn secondary_key<'a>(&'a self, fields: &'a Fields) -> Option<(&'a str, &'a AttrValue)> {
        self.secondary_keys.iter().find_map(|key| {
            fields
                .get(key)
                .filter(|value| value.index_key().is_some_and(|k| !k.is_empty()))
                .map(|value| (key.as_str(), value))
        })
    }
}

/// The record's `id` field, if it carries a usable one. Null or blank ids
/// count as absent so that rows exported without ids resolve like new ones.
fn explicit_id(fields: &Fields) -> Result<Option<HomologId>, CoreError> {
    let Some(value) = fields.get(ID_TAG) else {
        return Ok(None);
    };
    let raw = value.to_string();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    HomologId::parse(&raw).map(Some)
}

fn apply(set: &mut HomologSet, id: &HomologId, fields: Fields) -> Result<(), CoreError> {
    for (name, value) in fields {
        if name == ID_TAG {
            continue;
        }
        set.set_attribute(id.as_str(), &name, value)?;
    }
    Ok(())
}
