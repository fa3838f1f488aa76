use super::FontSpec;

/// Width source for line fitting. Advances are in thousandths of an em.
pub trait TextMeasurer {
    fn advance(&self, ch: char) -> u32;

    fn measure(&self, text: &str) -> u32 {
        text.chars()
            .fold(0u32, |width, ch| width.saturating_add(self.advance(ch)))
    }
}

impl TextMeasurer for FontSpec {
    fn advance(&self, ch: char) -> u32 {
        self.char_advance(ch)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakKind {
    /// Wrapped after whitespace; the whitespace stays on the line but hangs.
    Soft,
    /// Forced break inside a word wider than the line.
    Hard,
    /// The fragment ended.
    End,
}

/// Result of fitting one line. `prefix` followed by `suffix` is always the
/// original fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineFit<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub width: u32,
    pub kind: BreakKind,
}

/// Finds the longest prefix of `fragment` that fits in `max_width`.
///
/// Breaks after a whitespace run that follows visible text. A hard break is
/// only taken when the first word does not fit on its own, and always
/// consumes at least one character so callers make progress.
pub fn fit_line<'a, M>(measurer: &M, fragment: &'a str, max_width: u32) -> LineFit<'a>
where
    M: TextMeasurer + ?Sized,
{
    if fragment.is_empty() || max_width == 0 {
        return LineFit {
            prefix: "",
            suffix: fragment,
            width: 0,
            kind: BreakKind::End,
        };
    }

    let mut width = 0u32;
    let mut visible_width = 0u32;
    let mut seen_visible = false;
    // (byte end of the whitespace run, visible width before it)
    let mut last_soft_break: Option<(usize, u32)> = None;

    for (index, ch) in fragment.char_indices() {
        let advance = measurer.advance(ch);

        if ch.is_whitespace() {
            width = width.saturating_add(advance);
            if seen_visible {
                last_soft_break = Some((index + ch.len_utf8(), visible_width));
            }
            continue;
        }

        let next_width = width.saturating_add(advance);
        if next_width > max_width {
            if let Some((end, break_width)) = last_soft_break {
                return split(fragment, end, break_width, BreakKind::Soft);
            }
            if index == 0 {
                let end = ch.len_utf8();
                return split(fragment, end, advance, BreakKind::Hard);
            }
            return split(fragment, index, visible_width, BreakKind::Hard);
        }

        width = next_width;
        visible_width = width;
        seen_visible = true;
    }

    LineFit {
        prefix: fragment,
        suffix: "",
        width: visible_width,
        kind: BreakKind::End,
    }
}

fn split(fragment: &str, end: usize, width: u32, kind: BreakKind) -> LineFit<'_> {
    let (prefix, suffix) = fragment.split_at(end);
    if suffix.is_empty() {
        return LineFit {
            prefix,
            suffix,
            width,
            kind: BreakKind::End,
        };
    }
    LineFit {
        prefix,
        suffix,
        width,
        kind,
    }
}
