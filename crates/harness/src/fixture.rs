use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Once;

use homologset_core::{AttrValue, Fields, Homolog, HomologSet, ID_TAG};
use homologset_dataio::Format;
use homologset_engine::{Engine, EngineConfig, EngineError, MergeReport};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
/// Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// An engine plus a scratch directory for file round trips.
pub struct TestCollection {
    pub engine: Engine,
    dir: TempDir,
}

impl TestCollection {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        init_tracing();
        Ok(Self {
            engine: Engine::new(config)?,
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    pub fn import(
        &mut self,
        format: Format,
        raw: &str,
        header: &[&str],
    ) -> Result<MergeReport, EngineError> {
        let header = tags(header);
        let header = (!header.is_empty()).then_some(header.as_slice());
        self.engine.import_str(format, raw, header)
    }

    pub fn set(&self) -> &HomologSet {
        self.engine.set()
    }

    pub fn homolog(&self, id: &str) -> Result<&Homolog, EngineError> {
        Ok(self.engine.set().get_by_id(id)?)
    }

    pub fn text(&self, id: &str, attribute: &str) -> Option<String> {
        self.engine
            .set()
            .get(id)
            .and_then(|h| h.attr(attribute))
            .map(AttrValue::to_string)
    }

    pub fn ids(&self) -> Vec<String> {
        self.engine.set().ids().map(ToString::to_string).collect()
    }

    /// Every homolog's attributes keyed by id, for whole-set comparisons.
    pub fn state(&self) -> BTreeMap<String, Fields> {
        state_of(self.engine.set())
    }
}

pub fn state_of(set: &HomologSet) -> BTreeMap<String, Fields> {
    set.iter()
        .map(|h| {
            let mut fields = h.attributes().clone();
            fields.remove(ID_TAG);
            (h.id().to_string(), fields)
        })
        .collect()
}
