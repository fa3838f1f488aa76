use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;
use crate::typesetting::{FontSpec, PageGeometry, PageSize, TextStyle};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub out_dir: PathBuf,
    pub font: FontSpec,
    pub font_size_pt: f32,
    pub page_size: PageSize,
    pub margin_mm: f32,
    pub line_height_mm: f32,
}

impl Default for Config {
    fn default() -> Self {
        let geometry = PageGeometry::default();
        let style = TextStyle::default();
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            out_dir: PathBuf::from("."),
            font: style.font,
            font_size_pt: style.size_pt,
            page_size: geometry.size,
            margin_mm: geometry.margin_mm,
            line_height_mm: geometry.line_height_mm,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset or blank keys keep their
    /// defaults; values that fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let api_url = var("LETTER_API_URL").unwrap_or(defaults.api_url);
        let out_dir = var("LETTER_OUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.out_dir);
        let font = match var("LETTER_FONT") {
            Some(raw) => raw
                .parse::<FontSpec>()
                .map_err(|err| AppError::Config(format!("LETTER_FONT: {err}")))?,
            None => defaults.font,
        };
        let page_size = match var("LETTER_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => defaults.page_size,
        };

        Ok(Self {
            api_url,
            out_dir,
            font,
            font_size_pt: parse_number(&var, "LETTER_FONT_SIZE", defaults.font_size_pt)?,
            page_size,
            margin_mm: parse_number(&var, "LETTER_MARGIN_MM", defaults.margin_mm)?,
            line_height_mm: parse_number(
                &var,
                "LETTER_LINE_HEIGHT_MM",
                defaults.line_height_mm,
            )?,
        })
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font, self.font_size_pt)
    }

    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry {
            size: self.page_size,
            margin_mm: self.margin_mm,
            line_height_mm: self.line_height_mm,
        }
    }
}

fn parse_number<T, F>(var: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("{key}={raw}: {err}"))),
        None => Ok(default),
    }
}

pub fn parse_page_size(raw: &str) -> Result<PageSize, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "a4" => Ok(PageSize::A4),
        "letter" | "us-letter" => Ok(PageSize::Letter),
        other => Err(AppError::Config(format!(
            "unknown page size '{other}', expected a4 or letter"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.text_style(), TextStyle::default());
        assert_eq!(config.page_geometry(), PageGeometry::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("LETTER_API_URL", "https://letters.example"),
            ("LETTER_OUT_DIR", "/tmp/out"),
            ("LETTER_FONT", "monospace"),
            ("LETTER_FONT_SIZE", "10.5"),
            ("LETTER_PAGE_SIZE", "Letter"),
            ("LETTER_MARGIN_MM", "25"),
            ("LETTER_LINE_HEIGHT_MM", "5"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://letters.example");
        assert_eq!(config.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.text_style(), TextStyle::new(FontSpec::Monospace, 10.5));
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.margin_mm, 25.0);
        assert_eq!(config.line_height_mm, 5.0);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("LETTER_FONT", "  "), ("LETTER_MARGIN_MM", "")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn rejects_unparsable_values() {
        assert!(matches!(
            config_from(&[("LETTER_FONT_SIZE", "large")]),
            Err(AppError::Config(msg)) if msg.starts_with("LETTER_FONT_SIZE=large")
        ));
        assert!(matches!(
            config_from(&[("LETTER_PAGE_SIZE", "a3")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("LETTER_FONT", "comic")]),
            Err(AppError::Config(_))
        ));
    }
}
