use homologset_core::CoreError;
use homologset_dataio::DataIoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("data io error: {0}")]
    DataIo(#[from] DataIoError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("homolog set lock poisoned")]
    LockPoisoned,
}
