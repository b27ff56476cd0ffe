//! In-memory PPTX packages for tests.
//!
//! Produces the minimal set of parts the parser reads: core properties,
//! `presentation.xml`, its relationships, and one part per slide.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Builder for a small but well-formed PPTX package.
#[derive(Debug, Clone, Default)]
pub struct PptxFixture {
    title: Option<String>,
    author: Option<String>,
    slides: Vec<String>,
}

impl PptxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    /// Add a slide with one text shape holding one paragraph per entry.
    pub fn with_text_slide(mut self, paragraphs: &[&str]) -> Self {
        let body: String = paragraphs
            .iter()
            .map(|text| paragraph_xml(text))
            .collect();
        let shape = format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Text\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
             <p:spPr><a:xfrm><a:off x=\"457200\" y=\"274638\"/><a:ext cx=\"8229600\" cy=\"1143000\"/></a:xfrm></p:spPr>\
             <p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>",
            body
        );
        self.slides.push(slide_xml(&shape));
        self
    }

    /// Add a slide holding a single table.
    pub fn with_table_slide(mut self, rows: &[&[&str]]) -> Self {
        let rows_xml: String = rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|text| {
                        format!(
                            "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr/></a:tc>",
                            paragraph_xml(text)
                        )
                    })
                    .collect();
                format!("<a:tr h=\"370840\">{}</a:tr>", cells)
            })
            .collect();
        let frame = format!(
            "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"4\" name=\"Table\"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>\
             <p:xfrm><a:off x=\"457200\" y=\"1600200\"/><a:ext cx=\"8229600\" cy=\"741680\"/></p:xfrm>\
             <a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/table\">\
             <a:tbl><a:tblPr/><a:tblGrid/>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>",
            rows_xml
        );
        self.slides.push(slide_xml(&frame));
        self
    }

    /// Serialize the package to ZIP bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();

        parts.push(("[Content_Types].xml".to_string(), self.content_types_xml()));

        if self.title.is_some() || self.author.is_some() {
            parts.push(("docProps/core.xml".to_string(), self.core_xml()));
        }

        let mut rels = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
        );
        let mut id_list = String::new();
        for number in 1..=self.slides.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{}\" Target=\"slides/slide{}.xml\"/>",
                number + 1,
                REL_SLIDE,
                number
            ));
            id_list.push_str(&format!(
                "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
                255 + number,
                number + 1
            ));
        }
        rels.push_str("</Relationships>");

        parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels));
        parts.push((
            "ppt/presentation.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
                 <p:presentation xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">\
                 <p:sldIdLst>{}</p:sldIdLst><p:sldSz cx=\"9144000\" cy=\"6858000\"/></p:presentation>",
                NS_A, NS_R, NS_P, id_list
            ),
        ));

        for (idx, slide) in self.slides.iter().enumerate() {
            parts.push((format!("ppt/slides/slide{}.xml", idx + 1), slide.clone()));
        }

        let borrowed: Vec<(&str, String)> = parts
            .iter()
            .map(|(name, body)| (name.as_str(), body.clone()))
            .collect();
        write_package(&borrowed)
    }

    fn core_xml(&self) -> String {
        let mut fields = String::new();
        if let Some(ref title) = self.title {
            fields.push_str(&format!("<dc:title>{}</dc:title>", escape(title)));
        }
        if let Some(ref author) = self.author {
            fields.push_str(&format!("<dc:creator>{}</dc:creator>", escape(author)));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
             xmlns:dc=\"http://purl.org/dc/elements/1.1/\">{}</cp:coreProperties>",
            fields
        )
    }

    fn content_types_xml(&self) -> String {
        let overrides: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    "<Override PartName=\"/ppt/slides/slide{}.xml\" \
                     ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
                    n
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>{}</Types>",
            overrides
        )
    }
}

/// Write named parts into a ZIP archive held in memory.
pub fn write_package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    for (name, body) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(body.as_bytes()).expect("write zip entry");
    }

    zip.finish().expect("finish zip").into_inner()
}

fn slide_xml(shapes: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\"><p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
         {}</p:spTree></p:cSld></p:sld>",
        NS_A, NS_R, NS_P, shapes
    )
}

fn paragraph_xml(text: &str) -> String {
    if text.is_empty() {
        "<a:p><a:endParaRPr lang=\"en-US\"/></a:p>".to_string()
    } else {
        format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(text))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
