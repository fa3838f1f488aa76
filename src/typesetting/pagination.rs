use super::{
    break_paragraph, split_paragraphs, BreakKind, LayoutMetrics, MeasurementError, PageGeometry,
    TextStyle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSlice {
    pub start: usize,
    pub end: usize,
    pub used_height: u32,
}

/// A measured line of the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    pub paragraph: usize,
    /// Byte offset of `text` inside the source.
    pub offset: usize,
    /// The exact source characters of this line, including whitespace a
    /// soft wrap left hanging at its end.
    pub text: &'a str,
    /// Width of the visible part in 1/1000 em.
    pub width: u32,
    pub kind: BreakKind,
}

impl<'a> Line<'a> {
    /// What gets drawn: the hanging whitespace of a soft wrap is dropped.
    pub fn visible_text(&self) -> &'a str {
        match self.kind {
            BreakKind::Soft => self.text.trim_end(),
            BreakKind::Hard | BreakKind::End => self.text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<'a> {
    pub index: usize,
    pub lines: Vec<Line<'a>>,
    pub used_height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaginatedText<'a> {
    pub metrics: LayoutMetrics,
    pub style: TextStyle,
    pub pages: Vec<Page<'a>>,
}

impl PaginatedText<'_> {
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }
}

/// Slices a flow of item heights into pages. A page breaks before an item
/// when it already holds something and the item would overflow it, so an
/// oversized item still gets a page of its own. At least one page is always
/// returned.
pub fn paginate_flow(items: &[u32], page_height: u32) -> Vec<PageSlice> {
    let mut pages = Vec::new();
    let mut start = 0usize;
    let mut used = 0u32;

    for (index, height) in items.iter().copied().enumerate() {
        let next_used = used.saturating_add(height);
        let should_break = index > start && next_used > page_height;

        if should_break {
            pages.push(PageSlice {
                start,
                end: index,
                used_height: used,
            });
            start = index;
            used = height;
        } else {
            used = next_used;
        }
    }

    pages.push(PageSlice {
        start,
        end: items.len(),
        used_height: used,
    });

    pages
}

/// Lays `text` out into pages of measured lines.
pub fn paginate<'a>(
    text: &'a str,
    style: TextStyle,
    geometry: PageGeometry,
) -> Result<PaginatedText<'a>, MeasurementError> {
    let metrics = geometry.layout(style)?;

    let mut lines = Vec::new();
    for paragraph in split_paragraphs(text) {
        for brk in break_paragraph(&style.font, paragraph.text, metrics.max_line_units) {
            lines.push(Line {
                paragraph: paragraph.index,
                offset: paragraph.offset + brk.start,
                text: &paragraph.text[brk.start..brk.end],
                width: brk.width,
                kind: brk.kind,
            });
        }
    }

    let heights = vec![metrics.line_height; lines.len()];
    let slices = paginate_flow(&heights, metrics.body_height);
    let pages = slices
        .iter()
        .enumerate()
        .map(|(index, slice)| Page {
            index,
            lines: lines[slice.start..slice.end].to_vec(),
            used_height: slice.used_height,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        lines = lines.len(),
        pages = pages.len(),
        font = %style.font,
        "paginated letter text"
    );

    Ok(PaginatedText {
        metrics,
        style,
        pages,
    })
}
