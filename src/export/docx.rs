use super::package::{write_package, PackagePart};
use super::ExportError;
use crate::typesetting::{Paragraph, TextStyle};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const WORD_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = concat!(
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

/// Writes one `w:p` block per paragraph, in order. Empty paragraphs become
/// empty blocks so blank lines survive the round trip into a word processor.
pub fn write_docx(paragraphs: &[Paragraph<'_>], style: TextStyle) -> Result<Vec<u8>, ExportError> {
    let parts = [
        PackagePart::new("[Content_Types].xml", with_declaration(CONTENT_TYPES)),
        PackagePart::new("_rels/.rels", with_declaration(PACKAGE_RELS)),
        PackagePart::new("word/document.xml", document_xml(paragraphs)),
        PackagePart::new("word/styles.xml", styles_xml(style)),
        PackagePart::new(
            "word/_rels/document.xml.rels",
            with_declaration(DOCUMENT_RELS),
        ),
    ];

    write_package(&parts)
}

fn with_declaration(body: &str) -> String {
    format!("{XML_DECLARATION}\n{body}")
}

fn document_xml(paragraphs: &[Paragraph<'_>]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:document xmlns:w="{WORD_NAMESPACE}"><w:body>"#));
    for paragraph in paragraphs {
        push_paragraph(&mut xml, paragraph.text);
    }
    xml.push_str("</w:body></w:document>");
    xml
}

fn push_paragraph(xml: &mut String, text: &str) {
    if text.is_empty() {
        xml.push_str("<w:p/>");
        return;
    }

    xml.push_str("<w:p><w:r>");
    for (index, segment) in text.split('\t').enumerate() {
        if index > 0 {
            xml.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            xml.push_str(r#"<w:t xml:space="preserve">"#);
            push_escaped(xml, segment);
            xml.push_str("</w:t>");
        }
    }
    xml.push_str("</w:r></w:p>");
}

fn push_escaped(xml: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => xml.push_str("&amp;"),
            '<' => xml.push_str("&lt;"),
            '>' => xml.push_str("&gt;"),
            '"' => xml.push_str("&quot;"),
            // Control characters are not representable in XML 1.0 text.
            c if c.is_control() => {}
            c => xml.push(c),
        }
    }
}

fn styles_xml(style: TextStyle) -> String {
    let family = style.font.word_family();
    let half_points = (style.size_pt * 2.0).round().max(1.0) as u32;

    format!(
        concat!(
            "{decl}\n",
            r#"<w:styles xmlns:w="{ns}"><w:docDefaults>"#,
            r#"<w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{family}" w:hAnsi="{family}" w:cs="{family}" w:eastAsia="{family}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
            r#"</w:rPr></w:rPrDefault>"#,
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
            r#"</w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
            r#"</w:styles>"#
        ),
        decl = XML_DECLARATION,
        ns = WORD_NAMESPACE,
        family = family,
        size = half_points,
    )
}
