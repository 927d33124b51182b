mod entrez;
mod fixture;

pub use entrez::FakeEntrez;
pub use fixture::{TestCollection, init_tracing, state_of, tags};
