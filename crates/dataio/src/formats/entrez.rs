//! NCBI Entrez TSeq XML, as returned by `efetch` with `rettype=fasta` and
//! `retmode=xml`.
//!
//! Batched downloads are concatenated verbatim, so the input may hold several
//! complete documents. They are folded into one `TSeqSet` before parsing.

use homologset_core::{AttrValue, Fields, TaggedRecord};
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use crate::error::DataIoError;
use crate::format::Format;
use crate::traits::{FormatAdapter, restrict_fields};

pub const DEFAULT_ROOT_TAG: &str = "TSeqSet";
pub const DEFAULT_TAG_PREFIX: &str = "TSeq_";

/// Strip XML declarations, doctypes and every `root` boundary from a
/// concatenation of documents, then wrap the remainder in a single `root`.
pub fn flatten_concatenated_xml(xml: &str, root: &str) -> Result<String, DataIoError> {
    let name = regex::escape(root);
    let pattern = format!(
        r"(?s)<\?xml.*?\?>|<!DOCTYPE[^>\[]*(?:\[.*?\])?[^>]*>|<{name}(?:\s[^>]*)?/>|<{name}(?:\s[^>]*)?>|</{name}\s*>"
    );
    let boundaries =
        Regex::new(&pattern).map_err(|e| DataIoError::format(Format::EntrezXml, e))?;
    let body = boundaries.replace_all(xml, "");
    Ok(format!("<{root}>{}</{root}>", body.trim()))
}

#[derive(Debug, Clone)]
pub struct EntrezXmlAdapter {
    root_tag: String,
    tag_prefix: String,
}

impl Default for EntrezXmlAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TAG, DEFAULT_TAG_PREFIX)
    }
}

impl EntrezXmlAdapter {
    pub fn new(root_tag: impl Into<String>, tag_prefix: impl Into<String>) -> Self {
        Self {
            root_tag: root_tag.into(),
            tag_prefix: tag_prefix.into(),
        }
    }

    /// One attribute mapping per child of the root element. Grandchild tag
    /// names lose the known prefix (`TSeq_accver` becomes `accver`); empty
    /// elements become [`AttrValue::Null`].
    pub fn parse(&self, raw: &str) -> Result<Vec<Fields>, DataIoError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let xml = flatten_concatenated_xml(raw, &self.root_tag)?;
        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut records = Vec::new();
        let mut current: Option<Fields> = None;
        let mut field: Option<(String, String)> = None;
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| DataIoError::format(Format::EntrezXml, e))?;
            match event {
                Event::Start(e) => {
                    depth += 1;
                    match depth {
                        2 => current = Some(Fields::new()),
                        3 => field = Some((self.attribute_name(e.local_name().as_ref())?, String::new())),
                        _ => {}
                    }
                }
                Event::Empty(e) => match depth {
                    1 => records.push(Fields::new()),
                    2 => {
                        let name = self.attribute_name(e.local_name().as_ref())?;
                        if let Some(fields) = current.as_mut() {
                            fields.insert(name, AttrValue::Null);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| DataIoError::format(Format::EntrezXml, e))?;
                    self.push_text(depth, &text, &mut field)?;
                }
                Event::CData(c) => {
                    let bytes = c.into_inner();
                    self.push_text(depth, &String::from_utf8_lossy(&bytes), &mut field)?;
                }
                Event::End(_) => {
                    match depth {
                        2 => {
                            if let Some(fields) = current.take() {
                                records.push(fields);
                            }
                        }
                        3 => {
                            if let (Some((name, text)), Some(fields)) =
                                (field.take(), current.as_mut())
                            {
                                let value = if text.is_empty() {
                                    AttrValue::Null
                                } else {
                                    AttrValue::Text(text.trim().to_string())
                                };
                                fields.insert(name, value);
                            }
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(DataIoError::format(Format::EntrezXml, "unexpected end of document"));
        }
        tracing::debug!(records = records.len(), "parsed entrez xml");
        Ok(records)
    }

    fn attribute_name(&self, tag: &[u8]) -> Result<String, DataIoError> {
        let tag = std::str::from_utf8(tag).map_err(|e| DataIoError::format(Format::EntrezXml, e))?;
        Ok(tag.strip_prefix(self.tag_prefix.as_str()).unwrap_or(tag).to_string())
    }

    fn push_text(
        &self,
        depth: usize,
        text: &str,
        field: &mut Option<(String, String)>,
    ) -> Result<(), DataIoError> {
        match (depth, field.as_mut()) {
            (3, Some((_, buffer))) => {
                buffer.push_str(text);
                Ok(())
            }
            _ if depth > 3 => Ok(()),
            _ if text.trim().is_empty() => Ok(()),
            _ => Err(DataIoError::format(
                Format::EntrezXml,
                format!("unexpected text {:?}", text.trim()),
            )),
        }
    }
}

impl FormatAdapter for EntrezXmlAdapter {
    fn format(&self) -> Format {
        Format::EntrezXml
    }

    fn read(&self, raw: &str, tags: &[String]) -> Result<Vec<TaggedRecord>, DataIoError> {
        Ok(self
            .parse(raw)?
            .into_iter()
            .map(|fields| restrict_fields(TaggedRecord::Named(fields), tags))
            .collect())
    }

    fn write_records(&self, _records: &[TaggedRecord]) -> Result<String, DataIoError> {
        Err(DataIoError::Unsupported {
            format: Format::EntrezXml,
            operation: "writing",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_A: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE TSeqSet PUBLIC "-//NCBI//NCBI TSeq/EN" "https://www.ncbi.nlm.nih.gov/dtd/NCBI_TSeq.dtd">
<TSeqSet>
<TSeq>
  <TSeq_seqtype value="protein"/>
  <TSeq_gi>1234</TSeq_gi>
  <TSeq_accver>XP_000001.1</TSeq_accver>
  <TSeq_orgname>Canis lupus</TSeq_orgname>
  <TSeq_sequence>MASH</TSeq_sequence>
</TSeq>
</TSeqSet>"#;

    const DOC_B: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE TSeqSet PUBLIC "-//NCBI//NCBI TSeq/EN" "https://www.ncbi.nlm.nih.gov/dtd/NCBI_TSeq.dtd">
<TSeqSet>
<TSeq>
  <TSeq_accver>XP_000002.1</TSeq_accver>
  <TSeq_defline>kinase &amp; friends</TSeq_defline>
  <TSeq_sequence>MCAT</TSeq_sequence>
</TSeq>
</TSeqSet>"#;

    #[test]
    fn flatten_wraps_concatenated_documents() {
        let joined = format!("{DOC_A}\n{DOC_B}\n");
        let flat = flatten_concatenated_xml(&joined, "TSeqSet").unwrap();
        assert!(flat.starts_with("<TSeqSet><TSeq>"));
        assert!(flat.ends_with("</TSeq></TSeqSet>"));
        assert_eq!(flat.matches("<TSeqSet>").count(), 1);
        assert!(!flat.contains("<?xml"));
        assert!(!flat.contains("DOCTYPE"));
    }

    #[test]
    fn parses_concatenated_batches() {
        let joined = format!("{DOC_A}\n{DOC_B}\n");
        let records = EntrezXmlAdapter::default().parse(&joined).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].get("accver"), Some(&AttrValue::from("XP_000001.1")));
        assert_eq!(records[0].get("orgname"), Some(&AttrValue::from("Canis lupus")));
        assert_eq!(records[0].get("sequence"), Some(&AttrValue::from("MASH")));
        assert_eq!(records[0].get("seqtype"), Some(&AttrValue::Null));

        assert_eq!(records[1].get("defline"), Some(&AttrValue::from("kinase & friends")));
        assert_eq!(records[1].get("sequence"), Some(&AttrValue::from("MCAT")));
    }

    #[test]
    fn single_document_without_declaration() {
        let raw = "<TSeqSet><TSeq><TSeq_accver>A.1</TSeq_accver></TSeq></TSeqSet>";
        let records = EntrezXmlAdapter::default().parse(raw).unwrap();
        assert_eq!(records, vec![Fields::from([("accver".to_string(), AttrValue::from("A.1"))])]);
    }

    #[test]
    fn read_restricts_to_tags() {
        let tags = vec!["accver".to_string()];
        let records = EntrezXmlAdapter::default().read(DOC_A, &tags).unwrap();
        assert_eq!(
            records,
            vec![TaggedRecord::named([("accver", "XP_000001.1"), ("sequence", "MASH")])]
        );
    }

    #[test]
    fn malformed_xml_is_a_format_error() {
        let err = EntrezXmlAdapter::default()
            .parse("<TSeqSet><TSeq><TSeq_accver>A</TSeq_gi></TSeq></TSeqSet>")
            .unwrap_err();
        assert!(matches!(err, DataIoError::Format { format: Format::EntrezXml, .. }));
    }

    #[test]
    fn stray_text_is_a_format_error() {
        assert!(EntrezXmlAdapter::default().parse("this is not xml").is_err());
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(EntrezXmlAdapter::default().parse("  ").unwrap().is_empty());
    }

    #[test]
    fn writing_is_unsupported() {
        let record = TaggedRecord::named([("accver", "A.1")]);
        assert!(matches!(
            EntrezXmlAdapter::default().write(record),
            Err(DataIoError::Unsupported { .. })
        ));
    }
}
