//! PPTX file parser implementation.

use crate::core_props::parse_core_properties;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slides_core::{CellNormalizer, Error, ParsedPresentation, PresentationFormat, Result, SlideUnit};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";
const CORE_PROPERTIES_PATH: &str = "docProps/core.xml";

/// Parser for PPTX (Office Open XML) files.
#[derive(Debug, Clone, Default)]
pub struct PptxParser {
    normalizer: CellNormalizer,
}

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom normalizer for extracted cell text.
    pub fn with_normalizer(mut self, normalizer: CellNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Parse a PPTX package held in memory.
    ///
    /// Legacy PPT and non-ZIP input are rejected before the archive is opened.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedPresentation> {
        match PresentationFormat::from_magic(bytes) {
            Some(PresentationFormat::Pptx) => self.parse(Cursor::new(bytes)),
            Some(PresentationFormat::Ppt) => Err(Error::UnsupportedFormat(
                "legacy PPT (OLE/CFB) containers are not extracted".to_string(),
            )),
            None => Err(Error::CorruptedFile("not a ZIP container".to_string())),
        }
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<ParsedPresentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let (title, author) = match self.read_optional_file(&mut archive, CORE_PROPERTIES_PATH)? {
            Some(xml) => {
                let props = parse_core_properties(&xml)?;
                (props.title, props.creator)
            }
            None => {
                log::debug!("No core properties part; title and author left empty");
                (String::new(), String::new())
            }
        };

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slide parts", slide_order.len());

        let mut units = Vec::with_capacity(slide_order.len());
        for slide_path in &slide_order {
            units.push(self.parse_slide(&mut archive, slide_path)?);
        }

        Ok(ParsedPresentation::new(title, author, units))
    }

    /// Get the ordered list of slide paths.
    ///
    /// The order comes from `p:sldIdLst` in `presentation.xml`. When that part
    /// is absent or lists nothing known, slides are sorted by the number in
    /// their part name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels = parse_slide_relationships(&rels_content)?;

        if let Some(xml) = self.read_optional_file(archive, PRESENTATION_PATH)? {
            let ids = parse_slide_id_list(&xml)?;
            let ordered: Vec<String> = ids
                .iter()
                .filter_map(|id| slide_rels.get(id).cloned())
                .collect();
            if !ordered.is_empty() {
                return Ok(ordered);
            }
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_values()
            .map(|path| {
                let number = extract_slide_number(part_stem(&path));
                (path, number)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide part into a unit.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<SlideUnit> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut blocks = self.extract_blocks_from_xml(&content)?;

        // Top-to-bottom, then left-to-right
        blocks.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut unit = SlideUnit::new(part_stem(slide_path));
        for block in blocks {
            for row in block.rows {
                unit.add_row(row);
            }
        }

        Ok(unit)
    }

    /// Extract positioned blocks of rows from slide XML.
    ///
    /// A text shape contributes one single-cell row per non-empty paragraph.
    /// A table contributes one row per `a:tr`, one cell per `a:tc`.
    /// Of an `mc:AlternateContent` pair only `mc:Choice` is read; `mc:Fallback`
    /// repeats the same shapes for older readers.
    fn extract_blocks_from_xml(&self, xml_content: &str) -> Result<Vec<BlockInfo>> {
        let mut blocks = Vec::new();
        let mut reader = Reader::from_str(xml_content);

        let mut current_block: Option<BlockInfo> = None;
        let mut current_row: Option<Vec<String>> = None;
        let mut current_cell: Option<String> = None;
        let mut current_paragraph: Option<String> = None;
        let mut in_text_body = false;
        let mut in_text_run = false;
        let mut fallback_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Start(ref e)) if fallback_depth > 0 => {
                    if local_name(e.name().as_ref()) == b"Fallback" {
                        fallback_depth += 1;
                    }
                }
                Ok(Event::End(ref e)) if fallback_depth > 0 => {
                    if local_name(e.name().as_ref()) == b"Fallback" {
                        fallback_depth -= 1;
                    }
                }
                Ok(_) if fallback_depth > 0 => {}
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"Fallback" => {
                        fallback_depth = 1;
                    }
                    b"sp" | b"graphicFrame" => {
                        current_block = Some(BlockInfo::default());
                    }
                    b"off" => {
                        if let Some(ref mut block) = current_block {
                            block.set_offset(e);
                        }
                    }
                    b"tr" if current_block.is_some() => {
                        current_row = Some(Vec::new());
                    }
                    b"tc" if current_row.is_some() => {
                        current_cell = Some(String::new());
                    }
                    b"txBody" => {
                        in_text_body = true;
                    }
                    b"p" if in_text_body => {
                        current_paragraph = Some(String::new());
                    }
                    b"t" if current_paragraph.is_some() => {
                        in_text_run = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    b"off" => {
                        if let Some(ref mut block) = current_block {
                            block.set_offset(e);
                        }
                    }
                    b"br" => {
                        if let Some(ref mut paragraph) = current_paragraph {
                            paragraph.push('\n');
                        }
                    }
                    b"tc" => {
                        if let Some(ref mut row) = current_row {
                            row.push(String::new());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_text_run {
                        if let Some(ref mut paragraph) = current_paragraph {
                            let text = e.unescape().map_err(|e| {
                                Error::XmlError(format!("Bad text in slide: {}", e))
                            })?;
                            paragraph.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"t" => {
                        in_text_run = false;
                    }
                    b"p" => {
                        if let Some(paragraph) = current_paragraph.take() {
                            if let Some(ref mut cell) = current_cell {
                                if !cell.is_empty() {
                                    cell.push('\n');
                                }
                                cell.push_str(&paragraph);
                            } else if let Some(ref mut block) = current_block {
                                let text = self.normalizer.normalize_cell(&paragraph);
                                if !text.is_empty() {
                                    block.rows.push(vec![text]);
                                }
                            }
                        }
                    }
                    b"txBody" => {
                        in_text_body = false;
                    }
                    b"tc" => {
                        if let (Some(cell), Some(row)) = (current_cell.take(), current_row.as_mut()) {
                            row.push(self.normalizer.normalize_cell(&cell));
                        }
                    }
                    b"tr" => {
                        if let (Some(row), Some(block)) = (current_row.take(), current_block.as_mut()) {
                            block.rows.push(row);
                        }
                    }
                    b"sp" | b"graphicFrame" => {
                        if let Some(block) = current_block.take() {
                            if !block.rows.is_empty() {
                                blocks.push(block);
                            }
                        }
                        current_row = None;
                        current_cell = None;
                        current_paragraph = None;
                        in_text_body = false;
                        in_text_run = false;
                    }
                    _ => {}
                },
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing slide at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(blocks)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        self.read_optional_file(archive, path)?.ok_or_else(|| {
            Error::PptxParseError(format!("Required part '{}' not found in archive", path))
        })
    }

    /// Read a file from the ZIP archive, returning `None` if it is absent.
    fn read_optional_file<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Option<String>> {
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(Error::ZipError(format!("Failed to open '{}': {}", path, e)));
            }
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(Some(content))
    }
}

/// Rows extracted from one shape or table, with its offset on the slide.
#[derive(Debug, Default)]
struct BlockInfo {
    rows: Vec<Vec<String>>,
    x: f64,
    y: f64,
    positioned: bool,
}

impl BlockInfo {
    /// Take the first offset seen inside the block; later ones belong to children.
    fn set_offset(&mut self, e: &BytesStart) {
        if self.positioned {
            return;
        }
        for attr in e.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value);
            match attr.key.as_ref() {
                b"x" => {
                    if let Ok(x) = value.parse::<f64>() {
                        self.x = x;
                    }
                }
                b"y" => {
                    if let Ok(y) = value.parse::<f64>() {
                        self.y = y;
                    }
                }
                _ => {}
            }
        }
        self.positioned = true;
    }
}

/// Map slide relationship ids to archive paths.
fn parse_slide_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut slides = HashMap::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"Id" => id = value,
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") && !id.is_empty() {
                    slides.insert(id, resolve_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is the namespaced `r:id`, not the numeric `id`
                let rel_id = e.attributes().flatten().find(|attr| {
                    let key = attr.key.as_ref();
                    key.contains(&b':') && local_name(key) == b"id"
                });
                if let Some(attr) = rel_id {
                    ids.push(String::from_utf8_lossy(&attr.value).to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation part: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Resolve a relationship target relative to the `ppt/` folder.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

/// File name of a part without folder or extension, e.g. `slide3`.
fn part_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.trim_end_matches(".xml")
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{write_package, PptxFixture};

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(part_stem("ppt/slides/slide2.xml"), "slide2");
    }

    #[test]
    fn test_parse_metadata_and_text_slides() {
        let bytes = PptxFixture::new()
            .with_title("Role of a Man in Reproductive Health")
            .with_author("Outreach Team")
            .with_text_slide(&["Welcome", "Karibu"])
            .with_text_slide(&["Agenda"])
            .build();

        let parsed = PptxParser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(parsed.title, "Role of a Man in Reproductive Health");
        assert_eq!(parsed.author, "Outreach Team");
        assert_eq!(parsed.units().len(), 2);
        assert_eq!(parsed.units()[0].name, "slide1");
        assert_eq!(
            parsed.units()[0].rows,
            vec![vec!["Welcome".to_string()], vec!["Karibu".to_string()]]
        );
        assert_eq!(parsed.units()[1].rows, vec![vec!["Agenda".to_string()]]);
    }

    #[test]
    fn test_parse_table_slide() {
        let bytes = PptxFixture::new()
            .with_table_slide(&[&["Week", "Topic"], &["1", ""]])
            .build();

        let parsed = PptxParser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(parsed.title, "");
        assert_eq!(
            parsed.units()[0].rows,
            vec![
                vec!["Week".to_string(), "Topic".to_string()],
                vec!["1".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_runs_keep_inner_spaces() {
        let slide = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="0"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>
<a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>world</a:t></a:r><a:br/><a:r><a:t>again</a:t></a:r></a:p>
</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

        let blocks = PptxParser::new().extract_blocks_from_xml(slide).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows, vec![vec!["Hello world\nagain".to_string()]]);
    }

    #[test]
    fn test_alternate_content_read_once() {
        let slide = r#"<p:sld xmlns:a="a" xmlns:p="p" xmlns:mc="mc"><p:cSld><p:spTree>
<mc:AlternateContent><mc:Choice Requires="a14">
<p:sp><p:spPr><a:xfrm><a:off x="0" y="0"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Equation</a:t></a:r></a:p></p:txBody></p:sp>
</mc:Choice><mc:Fallback>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="0"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Equation</a:t></a:r></a:p></p:txBody></p:sp>
</mc:Fallback></mc:AlternateContent>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="900"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>After</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let blocks = PptxParser::new().extract_blocks_from_xml(slide).unwrap();
        let rows: Vec<Vec<String>> = blocks.into_iter().flat_map(|b| b.rows).collect();
        assert_eq!(
            rows,
            vec![vec!["Equation".to_string()], vec!["After".to_string()]]
        );
    }

    #[test]
    fn test_blocks_sorted_by_position() {
        let slide = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="500"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>bottom</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:spPr><a:xfrm><a:off x="900" y="100"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>top right</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:spPr><a:xfrm><a:off x="10" y="100"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>top left</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let bytes = write_package(&[
            (
                PRESENTATION_RELS_PATH,
                r#"<Relationships><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#.to_string(),
            ),
            ("ppt/slides/slide1.xml", slide.to_string()),
        ]);

        let parsed = PptxParser::new().parse_bytes(&bytes).unwrap();
        let texts: Vec<&str> = parsed.units()[0].rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(texts, vec!["top left", "top right", "bottom"]);
    }

    #[test]
    fn test_slide_order_follows_presentation_part() {
        let rels = r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;
        let presentation = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
<p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
</p:sldIdLst></p:presentation>"#;

        let bytes = write_package(&[
            (PRESENTATION_RELS_PATH, rels.to_string()),
            (PRESENTATION_PATH, presentation.to_string()),
            ("ppt/slides/slide1.xml", "<p:sld xmlns:p=\"p\"/>".to_string()),
            ("ppt/slides/slide2.xml", "<p:sld xmlns:p=\"p\"/>".to_string()),
        ]);

        let parsed = PptxParser::new().parse_bytes(&bytes).unwrap();
        let names: Vec<&str> = parsed.units().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["slide2", "slide1"]);
    }

    #[test]
    fn test_zero_slides_yields_default_unit() {
        let bytes = PptxFixture::new().with_title("Empty deck").build();

        let parsed = PptxParser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(parsed.units().len(), 1);
        assert!(parsed.units()[0].is_blank());
    }

    #[test]
    fn test_rejects_non_zip_and_legacy() {
        let parser = PptxParser::new();
        assert!(matches!(
            parser.parse_bytes(b"not a presentation at all"),
            Err(Error::CorruptedFile(_))
        ));
        assert!(matches!(
            parser.parse_bytes(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0]),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_zip_without_presentation_parts_fails() {
        let bytes = write_package(&[("word/document.xml", "<w:document/>".to_string())]);
        assert!(matches!(
            PptxParser::new().parse_bytes(&bytes),
            Err(Error::PptxParseError(_))
        ));
    }

    #[test]
    fn test_truncated_zip_fails() {
        let bytes = PptxFixture::new().with_text_slide(&["x"]).build();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(PptxParser::new().parse_bytes(truncated).is_err());
    }
}
