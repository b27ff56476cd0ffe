//! Package core properties (`docProps/core.xml`).

use crate::parser::local_name;
use quick_xml::events::Event;
use quick_xml::Reader;
use slides_core::{Error, Result};

/// Title and author from the core properties part.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CoreProperties {
    pub title: String,
    pub creator: String,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Creator,
}

/// Parse `dc:title` and `dc:creator` out of a core properties document.
pub(crate) fn parse_core_properties(xml: &str) -> Result<CoreProperties> {
    let mut props = CoreProperties::default();
    let mut reader = Reader::from_str(xml);
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                field = match local_name(e.name().as_ref()) {
                    b"title" => Some(Field::Title),
                    b"creator" => Some(Field::Creator),
                    _ => None,
                };
            }
            Ok(Event::Text(ref e)) => {
                if let Some(field) = field {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad core property text: {}", e)))?;
                    match field {
                        Field::Title => props.title.push_str(&text),
                        Field::Creator => props.creator.push_str(&text),
                    }
                }
            }
            Ok(Event::End(_)) => field = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing core properties: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    props.title = props.title.trim().to_string();
    props.creator = props.creator.trim().to_string();
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_core_properties() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Siku 16 za Uanaharakati</dc:title>
  <dc:creator>Amani &amp; Co</dc:creator>
  <cp:lastModifiedBy>someone</cp:lastModifiedBy>
</cp:coreProperties>"#;

        let props = parse_core_properties(xml).unwrap();
        assert_eq!(props.title, "Siku 16 za Uanaharakati");
        assert_eq!(props.creator, "Amani & Co");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let xml = r#"<cp:coreProperties xmlns:cp="x"><cp:revision>3</cp:revision></cp:coreProperties>"#;
        assert_eq!(parse_core_properties(xml).unwrap(), CoreProperties::default());
    }
}
