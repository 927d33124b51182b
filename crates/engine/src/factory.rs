use homologset_core::{Homolog, HomologId};

/// Builds the empty homolog a merge creates before applying record fields.
pub trait HomologFactory {
    fn create(&self, id: HomologId) -> Homolog;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl HomologFactory for DefaultFactory {
    fn create(&self, id: HomologId) -> Homolog {
        Homolog::new(id)
    }
}

impl<F> HomologFactory for F
where
    F: Fn(HomologId) -> Homolog,
{
    fn create(&self, id: HomologId) -> Homolog {
        self(id)
    }
}
