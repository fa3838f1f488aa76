pub mod font_metrics;
pub mod line_break;
pub mod measure;
pub mod page_model;
pub mod pagination;
pub mod paragraph;

pub use font_metrics::{
    win_ansi_code, FontMetrics, FontSpec, UnknownFontFamily, REPLACEMENT_CHAR, TAB_SPACES,
};
pub use line_break::{break_paragraph, LineBreak};
pub use measure::{fit_line, BreakKind, LineFit, TextMeasurer};
pub use page_model::{
    mm_to_pt, LayoutMetrics, MeasurementError, PageBox, PageGeometry, PageSize, TextStyle,
};
pub use pagination::{paginate, paginate_flow, Line, Page, PageSlice, PaginatedText};
pub use paragraph::{split_paragraphs, Paragraph, PARAGRAPH_BREAK};
