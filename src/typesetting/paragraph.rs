/// The only character treated as an explicit break.
pub const PARAGRAPH_BREAK: char = '\n';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub index: usize,
    /// Byte offset of the paragraph inside the source text.
    pub offset: usize,
    pub text: &'a str,
}

impl Paragraph<'_> {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Splits `text` on explicit breaks. Empty paragraphs are kept, so the result
/// always has one more entry than there are breaks.
pub fn split_paragraphs(text: &str) -> Vec<Paragraph<'_>> {
    let mut paragraphs = Vec::with_capacity(text.matches(PARAGRAPH_BREAK).count() + 1);
    let mut offset = 0usize;

    for (index, piece) in text.split(PARAGRAPH_BREAK).enumerate() {
        paragraphs.push(Paragraph {
            index,
            offset,
            text: piece,
        });
        offset += piece.len() + PARAGRAPH_BREAK.len_utf8();
    }

    paragraphs
}
