use std::cell::RefCell;
use std::collections::BTreeMap;

use homologset_dataio::{DataIoError, EntrezClient, PostHandle};

/// In-memory E-utilities stand-in. Serves one `TSeq` document per fetch
/// batch and records every call it receives.
#[derive(Default)]
pub struct FakeEntrez {
    sequences: BTreeMap<String, (String, String)>,
    pub calls: RefCell<Vec<String>>,
    posted: RefCell<Vec<Vec<String>>>,
}

impl FakeEntrez {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record served for `accver`.
    pub fn with_record(mut self, accver: &str, organism: &str, sequence: &str) -> Self {
        self.sequences.insert(
            accver.to_string(),
            (organism.to_string(), sequence.to_string()),
        );
        self
    }

    fn document(&self, accvers: &[String]) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<TSeqSet>\n");
        for accver in accvers {
            if let Some((organism, sequence)) = self.sequences.get(accver) {
                xml.push_str(&format!(
                    "<TSeq><TSeq_accver>{accver}</TSeq_accver>\
                     <TSeq_orgname>{organism}</TSeq_orgname>\
                     <TSeq_sequence>{sequence}</TSeq_sequence></TSeq>\n"
                ));
            }
        }
        xml.push_str("</TSeqSet>");
        xml
    }
}

impl EntrezClient for FakeEntrez {
    fn search(&self, _db: &str, term: &str) -> Result<Vec<String>, DataIoError> {
        self.calls.borrow_mut().push(format!("search {term}"));
        Ok(term
            .split_whitespace()
            .filter(|a| self.sequences.contains_key(*a))
            .map(str::to_string)
            .collect())
    }

    fn post(&self, _db: &str, uids: &[String]) -> Result<PostHandle, DataIoError> {
        let mut posted = self.posted.borrow_mut();
        posted.push(uids.to_vec());
        self.calls.borrow_mut().push(format!("post {}", uids.len()));
        Ok(PostHandle {
            web_env: "fake".to_string(),
            query_key: posted.len().to_string(),
        })
    }

    fn fetch(
        &self,
        _db: &str,
        handle: &PostHandle,
        start: usize,
        max: usize,
    ) -> Result<String, DataIoError> {
        self.calls.borrow_mut().push(format!("fetch {start}+{max}"));
        let key: usize = handle
            .query_key
            .parse()
            .map_err(|_| DataIoError::Client(format!("bad query key {}", handle.query_key)))?;
        let posted = self.posted.borrow();
        let uids = key
            .checked_sub(1)
            .and_then(|index| posted.get(index))
            .ok_or_else(|| DataIoError::Client(format!("unknown query key {key}")))?;
        let end = (start + max).min(uids.len());
        Ok(self.document(&uids[start.min(end)..end]))
    }
}
