pub mod download;
pub mod error;
pub mod files;
pub mod format;
pub mod formats;
pub mod traits;

pub use download::{EntrezClient, EntrezOptions, PostHandle};
pub use error::DataIoError;
pub use format::Format;
pub use formats::{AdapterOptions, adapter_for};
pub use traits::*;
