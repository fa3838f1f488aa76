use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::ExportError;
use crate::typesetting::{win_ansi_code, Page, PaginatedText, REPLACEMENT_CHAR, TAB_SPACES};

const PDF_HEADER: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;
const INFO_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// Writes one PDF page per laid-out page. Each line is drawn with its baseline
/// one font ascent below the top of its line box.
pub fn write_pdf(layout: &PaginatedText<'_>) -> Result<Vec<u8>, ExportError> {
    let metrics = layout.metrics;
    let font = layout.style.font;
    let size_pt = layout.style.size_pt;
    let ascent_pt = f32::from(font.metrics().ascent) * size_pt / 1000.0;

    let page_count = layout.pages.len();
    let object_count = FIRST_PAGE_ID + page_count * 2;
    let mut offsets = vec![0usize; object_count];
    let mut output = Vec::new();
    output.extend_from_slice(PDF_HEADER);

    offsets[CATALOG_ID] = write_object(
        &mut output,
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
    );

    let kids = (0..page_count)
        .map(|index| format!("{} 0 R", page_object_id(index)))
        .collect::<Vec<_>>()
        .join(" ");
    offsets[PAGES_ID] = write_object(
        &mut output,
        PAGES_ID,
        format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").as_bytes(),
    );

    offsets[FONT_ID] = write_object(
        &mut output,
        FONT_ID,
        format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font.base_font_name()
        )
        .as_bytes(),
    );

    offsets[INFO_ID] = write_object(
        &mut output,
        INFO_ID,
        b"<< /Title (Demand Letter) /Producer (demand-letter) >>",
    );

    for page in &layout.pages {
        let page_id = page_object_id(page.index);
        let content_id = page_id + 1;

        let page_body = format!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {:.2} {:.2}] \
/Resources << /Font << /F1 {FONT_ID} 0 R >> >> /Contents {content_id} 0 R >>",
            metrics.page_width_pt, metrics.page_height_pt
        );
        offsets[page_id] = write_object(&mut output, page_id, page_body.as_bytes());

        let content = page_content(page, layout, ascent_pt);
        let compressed = deflate(&content)?;
        let mut stream = format!(
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        )
        .into_bytes();
        stream.extend_from_slice(&compressed);
        stream.extend_from_slice(b"\nendstream");
        offsets[content_id] = write_object(&mut output, content_id, &stream);
    }

    let xref_offset = output.len();
    output.extend_from_slice(b"xref\n");
    output.extend_from_slice(format!("0 {}\n", offsets.len()).as_bytes());
    output.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        output.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    output.extend_from_slice(b"trailer\n");
    output.extend_from_slice(
        format!(
            "<< /Size {} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\n",
            offsets.len()
        )
        .as_bytes(),
    );
    output.extend_from_slice(b"startxref\n");
    output.extend_from_slice(format!("{}\n", xref_offset).as_bytes());
    output.extend_from_slice(b"%%EOF\n");

    Ok(output)
}

fn page_object_id(page_index: usize) -> usize {
    FIRST_PAGE_ID + page_index * 2
}

fn page_content(page: &Page<'_>, layout: &PaginatedText<'_>, ascent_pt: f32) -> Vec<u8> {
    let metrics = layout.metrics;
    let mut content = Vec::new();

    for (index, line) in page.lines.iter().enumerate() {
        let encoded = encode_pdf_string(line.visible_text());
        if encoded.is_empty() {
            continue;
        }
        let baseline = metrics.page_height_pt - (metrics.line_top_pt(index) + ascent_pt);
        content.extend_from_slice(
            format!(
                "BT /F1 {:.2} Tf {:.2} {:.2} Td (",
                layout.style.size_pt, metrics.margin_pt, baseline
            )
            .as_bytes(),
        );
        content.extend_from_slice(&encoded);
        content.extend_from_slice(b") Tj ET\n");
    }

    content
}

fn write_object(output: &mut Vec<u8>, id: usize, body: &[u8]) -> usize {
    let offset = output.len();
    output.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    output.extend_from_slice(body);
    output.extend_from_slice(b"\nendobj\n");
    offset
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Encodes text for a literal string drawn with a WinAnsi font. Tabs expand
/// to spaces, control characters are skipped and anything outside the
/// encoding is drawn as `?`.
fn encode_pdf_string(text: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\t' {
            encoded.extend(std::iter::repeat(b' ').take(TAB_SPACES));
            continue;
        }
        if ch.is_control() {
            continue;
        }
        match win_ansi_code(ch).unwrap_or(REPLACEMENT_CHAR as u8) {
            byte @ (b'(' | b')' | b'\\') => {
                encoded.push(b'\\');
                encoded.push(byte);
            }
            byte if byte >= 0x80 => {
                encoded.extend_from_slice(format!("\\{:03o}", byte).as_bytes());
            }
            byte => encoded.push(byte),
        }
    }
    encoded
}

/// Inflated content streams of a PDF written by [`write_pdf`].
#[cfg(test)]
pub(crate) fn content_streams(pdf: &[u8]) -> Vec<String> {
    use std::io::Read;

    fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
        haystack[from..]
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|pos| pos + from)
    }

    let mut streams = Vec::new();
    let mut at = 0usize;
    while let Some(start) = find(pdf, b"stream\n", at) {
        let data_start = start + b"stream\n".len();
        let Some(end) = find(pdf, b"\nendstream", data_start) else {
            break;
        };
        let mut text = String::new();
        flate2::read::ZlibDecoder::new(&pdf[data_start..end])
            .read_to_string(&mut text)
            .expect("inflate content stream");
        streams.push(text);
        at = end + b"\nendstream".len();
    }
    streams
}
