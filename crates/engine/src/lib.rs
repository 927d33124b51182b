pub mod config;
pub mod error;
pub mod factory;
pub mod resolver;
pub mod shared;

pub use config::EngineConfig;
pub use error::EngineError;
pub use factory::{DefaultFactory, HomologFactory};
pub use resolver::{MergeReport, RecordOutcome, Resolver};
pub use shared::SharedEngine;

use std::path::Path;

use homologset_core::{HomologSet, TaggedRecord, tags};
use homologset_dataio::{
    AdapterOptions, DataIoError, EntrezClient, Format, adapter_for, download, files,
    formats::snapshot,
};

/// A homolog set together with the resolver and adapter settings used to
/// grow it. All imports go through the same merge, whatever their format.
pub struct Engine<F = DefaultFactory> {
    config: EngineConfig,
    adapters: AdapterOptions,
    resolver: Resolver<F>,
    set: HomologSet,
}

impl Engine<DefaultFactory> {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_factory(config, DefaultFactory)
    }

    /// Open a file as a new engine. Snapshots restore the set as saved,
    /// other formats are merged into an empty set.
    pub fn load(path: &Path, config: EngineConfig) -> Result<Self, EngineError> {
        let format = Format::from_path(path)?;
        let engine = if format.is_binary() {
            let set = snapshot::read(&files::read_bytes(path)?)?;
            Self::new(config)?.with_set(set)
        } else {
            let mut engine = Self::new(config)?;
            engine.import_file(path, None)?;
            engine
        };
        tracing::info!(
            path = %path.display(),
            %format,
            homologs = engine.set.len(),
            "loaded homolog set"
        );
        Ok(engine)
    }
}

impl<F: HomologFactory> Engine<F> {
    pub fn with_factory(config: EngineConfig, factory: F) -> Result<Self, EngineError> {
        config.validate()?;
        let adapters = config.adapter_options()?;
        let set = HomologSet::with_prefix(config.prefix()?);
        let resolver = Resolver::with_factory(factory, config.secondary_keys.clone());
        Ok(Self {
            config,
            adapters,
            resolver,
            set,
        })
    }

    /// Replace the working set, keeping its own prefix and counter.
    pub fn with_set(mut self, set: HomologSet) -> Self {
        if set.prefix().as_str() != self.config.id_prefix {
            tracing::warn!(
                configured = %self.config.id_prefix,
                loaded = %set.prefix(),
                "loaded set uses a different id prefix"
            );
        }
        self.set = set;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set(&self) -> &HomologSet {
        &self.set
    }

    pub fn into_set(self) -> HomologSet {
        self.set
    }

    pub fn merge_records(
        &mut self,
        records: impl IntoIterator<Item = TaggedRecord>,
    ) -> MergeReport {
        self.resolver.merge(&mut self.set, records)
    }

    /// Parse `raw` and merge it. For FASTA, `tags` names the header fields and
    /// defaults to the configured tags; elsewhere it restricts the columns
    /// taken, with `None` taking all of them.
    pub fn import_str(
        &mut self,
        format: Format,
        raw: &str,
        tags: Option<&[String]>,
    ) -> Result<MergeReport, EngineError> {
        let records = self.read_records(format, raw, tags)?;
        Ok(self.merge_records(records))
    }

    /// Merge another set's homologs, ids included.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> Result<MergeReport, EngineError> {
        let other = snapshot::read(bytes)?;
        let records = tags::project_metadata::<String>(&other, None)?;
        Ok(self.merge_records(records))
    }

    pub fn import_file(
        &mut self,
        path: &Path,
        tags: Option<&[String]>,
    ) -> Result<MergeReport, EngineError> {
        let format = Format::from_path(path)?;
        let report = if format.is_binary() {
            self.import_snapshot(&files::read_bytes(path)?)?
        } else {
            self.import_str(format, &files::read_text(path)?, tags)?
        };
        tracing::info!(
            path = %path.display(),
            %format,
            batch_id = %report.batch_id,
            "imported file"
        );
        Ok(report)
    }

    /// Download accessions through `client` and merge the resulting records.
    pub fn import_entrez<C: EntrezClient + ?Sized>(
        &mut self,
        client: &C,
        accessions: &[String],
    ) -> Result<MergeReport, EngineError> {
        let records = download::download(client, accessions, &self.config.entrez)?;
        Ok(self.merge_records(records.into_iter().map(TaggedRecord::Named)))
    }

    /// Render the whole set. FASTA writes one block per homolog with `tags`
    /// (or the configured tags) as header; other formats write metadata,
    /// every attribute when `tags` is `None`.
    pub fn export_string(
        &self,
        format: Format,
        tags: Option<&[String]>,
    ) -> Result<String, EngineError> {
        let adapter = adapter_for(format, &self.adapters)?;
        let records = match format {
            Format::Fasta => {
                tags::project_sequences(&self.set, tags.unwrap_or(&self.config.default_tags))?
            }
            _ => tags::project_metadata(&self.set, tags)?,
        };
        Ok(adapter.write_records(&records)?)
    }

    pub fn export_bytes(
        &self,
        format: Format,
        tags: Option<&[String]>,
    ) -> Result<Vec<u8>, EngineError> {
        if format.is_binary() {
            return Ok(snapshot::write(&self.set)?);
        }
        Ok(self.export_string(format, tags)?.into_bytes())
    }

    /// Write the set to `path` in the format its extension names.
    pub fn write(&self, path: &Path, tags: Option<&[String]>) -> Result<(), EngineError> {
        let format = Format::from_path(path)?;
        files::write_bytes(path, &self.export_bytes(format, tags)?)?;
        tracing::info!(
            path = %path.display(),
            %format,
            homologs = self.set.len(),
            "wrote homolog set"
        );
        Ok(())
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), EngineError> {
        files::write_bytes(path, &snapshot::write(&self.set)?)?;
        tracing::info!(path = %path.display(), homologs = self.set.len(), "saved snapshot");
        Ok(())
    }

    fn read_records(
        &self,
        format: Format,
        raw: &str,
        tags: Option<&[String]>,
    ) -> Result<Vec<TaggedRecord>, EngineError> {
        if format.is_binary() {
            return Err(DataIoError::Unsupported {
                format,
                operation: "text import",
            }
            .into());
        }
        let tags: &[String] = match (format, tags) {
            (_, Some(tags)) => tags,
            (Format::Fasta, None) => &self.config.default_tags,
            (_, None) => &[],
        };
        Ok(adapter_for(format, &self.adapters)?.read(raw, tags)?)
    }
}
