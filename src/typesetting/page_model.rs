use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FontSpec;

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

const DEFAULT_MARGIN_MM: f32 = 20.0;
const DEFAULT_LINE_HEIGHT_MM: f32 = 6.5;
const DEFAULT_FONT_SIZE_PT: f32 = 12.0;

/// Slack when counting whole lines in the body, so float error in the mm
/// inputs never drops an exactly fitting line.
const LINE_FIT_EPSILON: f64 = 1e-4;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("invalid page size")]
    InvalidPageSize,
    #[error("margins leave no room on the page")]
    InvalidMargin,
    #[error("margins leave no usable line width")]
    ZeroUsableWidth,
    #[error("line height must be positive and fit inside the page body")]
    InvalidLineHeight,
    #[error("font size must be positive")]
    InvalidFontSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBox {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Fixed page layout for the paginated export. A single margin applies to
/// all four sides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margin_mm: f32,
    pub line_height_mm: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontSpec,
    pub size_pt: f32,
}

/// Geometry resolved into integer units. Heights are in thousandths of a
/// point, `max_line_units` is in thousandths of an em at the style's size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub line_height_pt: f32,
    /// Whole lines that fit in the body.
    pub lines_per_page: u32,
    /// `lines_per_page * line_height`, so rounding never costs a line.
    pub body_height: u32,
    pub line_height: u32,
    pub max_line_units: u32,
}

impl PageSize {
    pub fn dimensions_mm(self) -> PageBox {
        let (width_mm, height_mm) = match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        };

        PageBox {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: width_mm.max(0.0),
            height_mm: height_mm.max(0.0),
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
            line_height_mm: DEFAULT_LINE_HEIGHT_MM,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            size_pt: DEFAULT_FONT_SIZE_PT,
        }
    }
}

impl TextStyle {
    pub fn new(font: FontSpec, size_pt: f32) -> Self {
        Self { font, size_pt }
    }

    /// Converts a width in points into em-thousandths at this style's size,
    /// rounding down so that anything measured within the result fits.
    pub fn max_units(self, width_pt: f32) -> u32 {
        let size = to_milli(self.size_pt);
        if size == 0 {
            return 0;
        }
        let width = u64::from(to_milli(width_pt));
        u32::try_from(width * 1000 / u64::from(size)).unwrap_or(u32::MAX)
    }

    pub fn validate(self) -> Result<(), MeasurementError> {
        if self.size_pt.is_finite() && self.size_pt > 0.0 {
            Ok(())
        } else {
            Err(MeasurementError::InvalidFontSize)
        }
    }
}

impl PageGeometry {
    pub fn page_box(self) -> PageBox {
        self.size.dimensions_mm()
    }

    pub fn body_box(self) -> PageBox {
        let page = self.page_box();
        let margin = self.margin_mm.max(0.0);

        PageBox {
            x_mm: margin,
            y_mm: margin,
            width_mm: (page.width_mm - 2.0 * margin).max(0.0),
            height_mm: (page.height_mm - 2.0 * margin).max(0.0),
        }
    }

    pub fn validate(self) -> Result<(), MeasurementError> {
        let page = self.page_box();
        if !(page.width_mm.is_finite() && page.height_mm.is_finite())
            || page.width_mm <= 0.0
            || page.height_mm <= 0.0
        {
            return Err(MeasurementError::InvalidPageSize);
        }
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            return Err(MeasurementError::InvalidMargin);
        }
        if 2.0 * self.margin_mm >= page.width_mm {
            return Err(MeasurementError::ZeroUsableWidth);
        }
        if 2.0 * self.margin_mm >= page.height_mm {
            return Err(MeasurementError::InvalidMargin);
        }
        if !self.line_height_mm.is_finite()
            || self.line_height_mm <= 0.0
            || self.line_height_mm > self.body_box().height_mm
        {
            return Err(MeasurementError::InvalidLineHeight);
        }
        Ok(())
    }

    /// Validates the geometry against `style` and resolves the integer
    /// quantities pagination works with.
    pub fn layout(self, style: TextStyle) -> Result<LayoutMetrics, MeasurementError> {
        self.validate()?;
        style.validate()?;

        let page = self.page_box();
        let body = self.body_box();
        let max_line_units = style.max_units(mm_to_pt(body.width_mm));
        if max_line_units == 0 {
            return Err(MeasurementError::ZeroUsableWidth);
        }

        let line_height = to_milli(mm_to_pt(self.line_height_mm)).max(1);
        let lines_per_page = lines_per_page(body.height_mm, self.line_height_mm);

        Ok(LayoutMetrics {
            page_width_pt: mm_to_pt(page.width_mm),
            page_height_pt: mm_to_pt(page.height_mm),
            margin_pt: mm_to_pt(self.margin_mm),
            line_height_pt: mm_to_pt(self.line_height_mm),
            lines_per_page,
            body_height: lines_per_page.saturating_mul(line_height),
            line_height,
            max_line_units,
        })
    }
}

impl LayoutMetrics {
    /// Distance from the top edge of the page to the top of the `index`-th
    /// line box on a page.
    pub fn line_top_pt(&self, index: usize) -> f32 {
        self.margin_pt + index as f32 * self.line_height_pt
    }
}

pub fn mm_to_pt(mm: f32) -> f32 {
    let mm = mm.max(0.0);
    let pt = mm * POINTS_PER_INCH / MM_PER_INCH;
    if pt.is_finite() {
        pt
    } else {
        0.0
    }
}

fn lines_per_page(body_mm: f32, line_height_mm: f32) -> u32 {
    let ratio = f64::from(body_mm) / f64::from(line_height_mm);
    let lines = (ratio + LINE_FIT_EPSILON).floor();
    if lines >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (lines as u32).max(1)
    }
}

fn to_milli(value: f32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let scaled = (value * 1000.0).round();
    if scaled >= u32::MAX as f32 {
        u32::MAX
    } else {
        scaled as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(value: f32, expected: f32) {
        assert!((value - expected).abs() < 0.01, "{value} != {expected}");
    }

    fn custom(width_mm: f32, height_mm: f32, margin_mm: f32, line_height_mm: f32) -> PageGeometry {
        PageGeometry {
            size: PageSize::Custom {
                width_mm,
                height_mm,
            },
            margin_mm,
            line_height_mm,
        }
    }

    #[test]
    fn a4_dimensions_are_standard_mm() {
        let page = PageSize::A4.dimensions_mm();
        approx_eq(page.width_mm, 210.0);
        approx_eq(page.height_mm, 297.0);
    }

    #[test]
    fn letter_dimensions_are_standard_mm() {
        let page = PageSize::Letter.dimensions_mm();
        approx_eq(page.width_mm, 215.9);
        approx_eq(page.height_mm, 279.4);
    }

    #[test]
    fn body_box_subtracts_margin_on_every_side() {
        let body = PageGeometry::default().body_box();
        approx_eq(body.x_mm, 20.0);
        approx_eq(body.y_mm, 20.0);
        approx_eq(body.width_mm, 170.0);
        approx_eq(body.height_mm, 257.0);
    }

    #[test]
    fn default_geometry_is_valid() {
        assert_eq!(PageGeometry::default().validate(), Ok(()));
        assert!(PageGeometry::default()
            .layout(TextStyle::default())
            .is_ok());
    }

    #[test]
    fn margin_wider_than_page_has_zero_usable_width() {
        let geometry = custom(100.0, 300.0, 50.0, 5.0);
        assert_eq!(geometry.validate(), Err(MeasurementError::ZeroUsableWidth));
    }

    #[test]
    fn margin_taller_than_page_is_rejected() {
        let geometry = custom(300.0, 100.0, 50.0, 5.0);
        assert_eq!(geometry.validate(), Err(MeasurementError::InvalidMargin));
    }

    #[test]
    fn rejects_degenerate_sizes_and_line_heights() {
        assert_eq!(
            custom(0.0, 100.0, 1.0, 5.0).validate(),
            Err(MeasurementError::InvalidPageSize)
        );
        assert_eq!(
            custom(100.0, 100.0, 10.0, 0.0).validate(),
            Err(MeasurementError::InvalidLineHeight)
        );
        assert_eq!(
            custom(100.0, 100.0, 10.0, 81.0).validate(),
            Err(MeasurementError::InvalidLineHeight)
        );
        assert_eq!(
            PageGeometry::default().layout(TextStyle::new(FontSpec::Serif, 0.0)),
            Err(MeasurementError::InvalidFontSize)
        );
    }

    #[test]
    fn huge_font_leaves_zero_usable_width() {
        let geometry = custom(10.0, 100.0, 4.99, 5.0);
        let style = TextStyle::new(FontSpec::Serif, 1.0e9);
        assert_eq!(
            geometry.layout(style),
            Err(MeasurementError::ZeroUsableWidth)
        );
    }

    #[test]
    fn max_units_scales_inversely_with_font_size() {
        let small = TextStyle::new(FontSpec::Serif, 10.0);
        let large = TextStyle::new(FontSpec::Serif, 20.0);
        assert_eq!(small.max_units(100.0), 10_000);
        assert_eq!(large.max_units(100.0), 5_000);
    }

    #[test]
    fn exact_fit_keeps_every_line_despite_rounding() {
        // 100 mm body at 1 mm lines: the line height rounds up to 2835
        // milli-points while the body rounds down, which alone would fit 99.
        let metrics = custom(100.0, 120.0, 10.0, 1.0)
            .layout(TextStyle::default())
            .expect("layout");

        assert_eq!(metrics.lines_per_page, 100);
        assert_eq!(metrics.body_height, 100 * metrics.line_height);
    }

    #[test]
    fn partial_lines_do_not_count() {
        let metrics = PageGeometry::default()
            .layout(TextStyle::default())
            .expect("default layout");

        // 257 mm / 6.5 mm = 39.5
        assert_eq!(metrics.lines_per_page, 39);
        assert_eq!(
            custom(100.0, 110.0, 10.0, 10.0)
                .layout(TextStyle::default())
                .expect("layout")
                .lines_per_page,
            9
        );
    }

    #[test]
    fn line_tops_start_at_margin_and_step_by_line_height() {
        let metrics = PageGeometry::default()
            .layout(TextStyle::default())
            .expect("default layout");
        approx_eq(metrics.line_top_pt(0), mm_to_pt(20.0));
        approx_eq(metrics.line_top_pt(3), mm_to_pt(20.0) + 3.0 * mm_to_pt(6.5));
    }
}
