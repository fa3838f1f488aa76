//! Paginated (PDF) and flowed (DOCX) exporters.
//!
//! Both exporters are pure functions of a text snapshot and style settings.
//! Neither keeps state between calls, so repeated or concurrent exports of
//! the same snapshot produce identical bytes.

pub mod docx;
pub mod package;
pub mod pdf;

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::store::Snapshot;
use crate::typesetting::{paginate, split_paragraphs, MeasurementError, PageGeometry, TextStyle};

pub const PAGINATED_FILE_NAME: &str = "demand-letter.pdf";
pub const FLOWED_FILE_NAME: &str = "demand-letter.docx";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("layout failed: {0}")]
    Measurement(#[from] MeasurementError),
    #[error("failed to serialize document: {0}")]
    Serialization(#[from] std::io::Error),
    #[error("document package exceeds zip size limits")]
    PackageTooLarge,
    #[error("export task failed: {0}")]
    TaskFailed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Paginated,
    Flowed,
}

impl ExportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Paginated => PAGINATED_FILE_NAME,
            ExportKind::Flowed => FLOWED_FILE_NAME,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportKind::Paginated => PDF_CONTENT_TYPE,
            ExportKind::Flowed => DOCX_CONTENT_TYPE,
        }
    }
}

/// A finished document, ready to be handed to whoever saves or downloads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    kind: ExportKind,
    bytes: Vec<u8>,
    /// Pages for a paginated export, paragraph blocks for a flowed one.
    sections: usize,
}

impl ExportArtifact {
    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Writes the artifact under its suggested file name inside `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Lays the text out into pages and renders them as a PDF.
pub fn export_paginated(
    text: &str,
    style: TextStyle,
    geometry: PageGeometry,
) -> Result<ExportArtifact, ExportError> {
    let layout = paginate(text, style, geometry)?;
    let bytes = pdf::write_pdf(&layout)?;

    tracing::info!(
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "exported paginated document"
    );

    Ok(ExportArtifact {
        kind: ExportKind::Paginated,
        bytes,
        sections: layout.pages.len(),
    })
}

/// Splits the text into paragraphs and renders them as a DOCX package.
pub fn export_flowed(text: &str, style: TextStyle) -> Result<ExportArtifact, ExportError> {
    style.validate()?;
    let paragraphs = split_paragraphs(text);
    let bytes = docx::write_docx(&paragraphs, style)?;

    tracing::info!(
        paragraphs = paragraphs.len(),
        bytes = bytes.len(),
        "exported flowed document"
    );

    Ok(ExportArtifact {
        kind: ExportKind::Flowed,
        bytes,
        sections: paragraphs.len(),
    })
}

/// Runs [`export_paginated`] on the blocking pool. The snapshot is owned, so
/// edits made while the export is in flight cannot reach it.
pub async fn export_paginated_async(
    snapshot: Snapshot,
    style: TextStyle,
    geometry: PageGeometry,
) -> Result<ExportArtifact, ExportError> {
    tokio::task::spawn_blocking(move || export_paginated(snapshot.as_str(), style, geometry))
        .await
        .map_err(|err| ExportError::TaskFailed(err.to_string()))?
}

/// Runs [`export_flowed`] on the blocking pool.
pub async fn export_flowed_async(
    snapshot: Snapshot,
    style: TextStyle,
) -> Result<ExportArtifact, ExportError> {
    tokio::task::spawn_blocking(move || export_flowed(snapshot.as_str(), style))
        .await
        .map_err(|err| ExportError::TaskFailed(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EditableTextStore;
    use crate::typesetting::FontSpec;

    #[test]
    fn artifacts_carry_suggested_names_and_types() {
        let pdf = export_paginated("x", TextStyle::default(), PageGeometry::default()).unwrap();
        let docx = export_flowed("x", TextStyle::default()).unwrap();

        assert_eq!(pdf.file_name(), "demand-letter.pdf");
        assert_eq!(pdf.content_type(), "application/pdf");
        assert_eq!(docx.file_name(), "demand-letter.docx");
        assert_eq!(docx.content_type(), DOCX_CONTENT_TYPE);
    }

    #[test]
    fn empty_text_yields_minimal_documents() {
        let pdf = export_paginated("", TextStyle::default(), PageGeometry::default()).unwrap();
        let docx = export_flowed("", TextStyle::default()).unwrap();

        assert_eq!(pdf.sections(), 1);
        assert_eq!(docx.sections(), 1);
    }

    #[test]
    fn flowed_sections_follow_paragraph_count() {
        let docx = export_flowed("a\n\nb\n", TextStyle::default()).unwrap();
        assert_eq!(docx.sections(), 4);
    }

    #[test]
    fn measurement_errors_fail_the_export() {
        let geometry = PageGeometry {
            margin_mm: 150.0,
            ..PageGeometry::default()
        };
        let err = export_paginated("x", TextStyle::default(), geometry).unwrap_err();

        assert!(matches!(
            err,
            ExportError::Measurement(MeasurementError::ZeroUsableWidth)
        ));
        assert!(matches!(
            export_flowed("x", TextStyle::new(FontSpec::Serif, -1.0)),
            Err(ExportError::Measurement(MeasurementError::InvalidFontSize))
        ));
    }

    #[test]
    fn exports_are_repeatable() {
        let text = "To whom it may concern,\n\nPlease pay.";
        let first = export_paginated(text, TextStyle::default(), PageGeometry::default()).unwrap();
        let second = export_paginated(text, TextStyle::default(), PageGeometry::default()).unwrap();

        assert_eq!(first.sha256_hex(), second.sha256_hex());
        assert_eq!(
            export_flowed(text, TextStyle::default()).unwrap(),
            export_flowed(text, TextStyle::default()).unwrap()
        );
    }

    #[test]
    fn base64_hand_off_encodes_the_bytes() {
        let pdf = export_paginated("x", TextStyle::default(), PageGeometry::default()).unwrap();
        let decoded = STANDARD.decode(pdf.to_base64()).unwrap();

        assert_eq!(decoded, pdf.bytes());
    }

    #[test]
    fn writes_artifact_under_its_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let docx = export_flowed("hello", TextStyle::default()).unwrap();
        let path = docx.write_to_dir(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("demand-letter.docx"));
        assert_eq!(std::fs::read(path).unwrap(), docx.bytes());
    }

    #[tokio::test]
    async fn async_export_uses_the_snapshot_taken_at_invocation() {
        let mut store = EditableTextStore::new();
        store.load("Original letter");
        store.begin_edit();
        let snapshot = store.snapshot();

        let export = tokio::spawn(export_flowed_async(snapshot.clone(), TextStyle::default()));
        store.on_view_change("Edited letter");
        let artifact = export.await.unwrap().unwrap();

        let expected = export_flowed("Original letter", TextStyle::default()).unwrap();
        assert_eq!(artifact, expected);
        assert_eq!(store.snapshot().as_str(), "Edited letter");
    }

    #[tokio::test]
    async fn async_paginated_export_matches_sync_export() {
        let snapshot = Snapshot::from("Line one\nLine two");
        let artifact =
            export_paginated_async(snapshot, TextStyle::default(), PageGeometry::default())
                .await
                .unwrap();
        let expected =
            export_paginated("Line one\nLine two", TextStyle::default(), PageGeometry::default())
                .unwrap();

        assert_eq!(artifact, expected);
    }
}
