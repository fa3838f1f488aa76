use super::{fit_line, BreakKind, TextMeasurer};

/// One wrapped line of a paragraph, as byte offsets into the paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineBreak {
    pub start: usize,
    pub end: usize,
    pub width: u32,
    pub kind: BreakKind,
}

/// Wraps a single paragraph. An empty paragraph produces exactly one empty
/// line so blank lines keep their height on the page.
pub fn break_paragraph<M>(measurer: &M, paragraph: &str, max_width: u32) -> Vec<LineBreak>
where
    M: TextMeasurer + ?Sized,
{
    if paragraph.is_empty() {
        return vec![LineBreak {
            start: 0,
            end: 0,
            width: 0,
            kind: BreakKind::End,
        }];
    }

    let mut lines = Vec::new();
    let mut start = 0usize;

    while start < paragraph.len() {
        let rest = &paragraph[start..];
        let fit = fit_line(measurer, rest, max_width);

        if fit.prefix.is_empty() {
            // No width at all: keep the remainder together instead of looping.
            lines.push(LineBreak {
                start,
                end: paragraph.len(),
                width: measurer.measure(rest.trim_end()),
                kind: BreakKind::End,
            });
            break;
        }

        let end = start + fit.prefix.len();
        lines.push(LineBreak {
            start,
            end,
            width: fit.width,
            kind: fit.kind,
        });
        start = end;
    }

    lines
}
