use std::sync::{Arc, Mutex, MutexGuard};

use homologset_core::TaggedRecord;
use homologset_dataio::Format;

use crate::error::EngineError;
use crate::factory::{DefaultFactory, HomologFactory};
use crate::resolver::MergeReport;
use crate::Engine;

/// An [`Engine`] shared across threads. Each batch holds the lock from first
/// record to last, so id allocation never interleaves between batches.
pub struct SharedEngine<F = DefaultFactory> {
    inner: Arc<Mutex<Engine<F>>>,
}

impl<F> Clone for SharedEngine<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: HomologFactory> SharedEngine<F> {
    pub fn new(engine: Engine<F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Engine<F>>, EngineError> {
        self.inner.lock().map_err(|_| EngineError::LockPoisoned)
    }

    pub fn merge_batch(
        &self,
        records: impl IntoIterator<Item = TaggedRecord>,
    ) -> Result<MergeReport, EngineError> {
        Ok(self.lock()?.merge_records(records))
    }

    pub fn import_str(
        &self,
        format: Format,
        raw: &str,
        tags: Option<&[String]>,
    ) -> Result<MergeReport, EngineError> {
        self.lock()?.import_str(format, raw, tags)
    }

    pub fn len(&self) -> Result<usize, EngineError> {
        Ok(self.lock()?.set().len())
    }

    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.lock()?.set().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use std::collections::BTreeSet;
    use std::thread;

    #[test]
    fn concurrent_batches_get_distinct_ids() {
        let shared = SharedEngine::new(Engine::new(EngineConfig::default()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let records: Vec<_> = (0..25)
                        .map(|i| TaggedRecord::named([("label", format!("w{worker}-{i}"))]))
                        .collect();
                    shared.merge_batch(records).unwrap()
                })
            })
            .collect();

        let mut ids = BTreeSet::new();
        for handle in handles {
            let report = handle.join().unwrap();
            assert_eq!(report.created(), 25);
            ids.extend(report.created_ids().into_iter().cloned());
        }
        assert_eq!(ids.len(), 100);
        assert_eq!(shared.len().unwrap(), 100);
        assert_eq!(shared.lock().unwrap().set().max_id(), 100);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let shared = SharedEngine::new(Engine::new(EngineConfig::default()).unwrap());
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(shared.len(), Err(EngineError::LockPoisoned)));
    }
}
