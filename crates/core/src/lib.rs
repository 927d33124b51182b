pub mod attr_value;
pub mod collection;
pub mod error;
pub mod homolog;
pub mod ids;
pub mod tags;

pub use attr_value::AttrValue;
pub use collection::{DEFAULT_SECONDARY_KEY, HomologSet};
pub use error::CoreError;
pub use homolog::{Homolog, ID_TAG, SEQUENCE_ATTR};
pub use ids::*;
pub use tags::{Fields, TaggedRecord};
