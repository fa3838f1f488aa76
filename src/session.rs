//! One letter being worked on: the text store plus the transient choices
//! (font, page layout) and service metadata that travel with it.

use crate::export::{
    export_flowed, export_flowed_async, export_paginated, export_paginated_async, ExportArtifact,
    ExportError,
};
use crate::service::{GenerationResponse, LetterMetadata, ServiceError};
use crate::store::{EditableTextStore, Snapshot};
use crate::typesetting::{FontSpec, PageGeometry, TextStyle};

#[derive(Debug, Default)]
pub struct LetterSession {
    store: EditableTextStore,
    metadata: Option<LetterMetadata>,
    style: TextStyle,
    geometry: PageGeometry,
}

impl LetterSession {
    pub fn new(style: TextStyle, geometry: PageGeometry) -> Self {
        Self {
            style,
            geometry,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &EditableTextStore {
        &self.store
    }

    pub fn metadata(&self) -> Option<&LetterMetadata> {
        self.metadata.as_ref()
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Loads a generated letter into the store. A failed or empty response
    /// leaves the current text and metadata untouched.
    pub fn apply_response(&mut self, response: GenerationResponse) -> Result<(), ServiceError> {
        match response.into_letter() {
            Ok((letter, metadata)) => {
                tracing::info!(chars = letter.chars().count(), "loaded generated letter");
                self.store.load(letter);
                self.metadata = metadata;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "generation response not applied");
                Err(err)
            }
        }
    }

    /// Loads text that did not come from the service, e.g. a file on disk.
    pub fn load_text(&mut self, text: impl Into<String>) {
        self.store.load(text);
        self.metadata = None;
    }

    /// Clears the letter and its metadata.
    pub fn reset(&mut self) {
        self.load_text(String::new());
    }

    pub fn begin_edit(&mut self) -> &str {
        self.store.begin_edit()
    }

    pub fn on_view_change(&mut self, new_text: impl Into<String>) {
        self.store.on_view_change(new_text);
    }

    pub fn end_edit(&mut self) {
        self.store.end_edit();
    }

    /// Font choice applies to exports only and is never written into the text.
    pub fn select_font(&mut self, font: FontSpec) {
        self.style.font = font;
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// The current text, edits included, for the clipboard.
    pub fn clipboard_text(&self) -> String {
        self.store.text().to_string()
    }

    pub fn export_pdf(&self) -> Result<ExportArtifact, ExportError> {
        export_paginated(self.store.text(), self.style, self.geometry)
    }

    pub fn export_docx(&self) -> Result<ExportArtifact, ExportError> {
        export_flowed(self.store.text(), self.style)
    }

    /// Starts a PDF export of the text as it is now. The returned future owns
    /// its snapshot, so the session stays free for edits meanwhile.
    pub fn export_pdf_async(
        &self,
    ) -> impl std::future::Future<Output = Result<ExportArtifact, ExportError>> + Send + 'static
    {
        export_paginated_async(self.snapshot(), self.style, self.geometry)
    }

    pub fn export_docx_async(
        &self,
    ) -> impl std::future::Future<Output = Result<ExportArtifact, ExportError>> + Send + 'static
    {
        export_flowed_async(self.snapshot(), self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::docx;
    use crate::store::EditState;

    fn success(letter: &str) -> GenerationResponse {
        GenerationResponse {
            success: true,
            demand_letter: Some(letter.to_string()),
            metadata: Some(LetterMetadata {
                client: "ABC".into(),
                opposing_party: "XYZ".into(),
                deadline_date: "2024-06-01".into(),
                generated_at: "2024-05-18T10:30:00".into(),
            }),
            error: None,
        }
    }

    #[test]
    fn successful_response_loads_the_store() {
        let mut session = LetterSession::default();
        session.apply_response(success("Dear XYZ,")).unwrap();

        assert_eq!(session.snapshot().as_str(), "Dear XYZ,");
        assert_eq!(session.metadata().map(|m| m.client.as_str()), Some("ABC"));
        assert_eq!(session.store().state(), EditState::Idle);
    }

    #[test]
    fn failed_response_leaves_text_untouched() {
        let mut session = LetterSession::default();
        session.apply_response(success("Keep me")).unwrap();
        session.begin_edit();
        session.on_view_change("Keep me, edited");

        let failure = GenerationResponse {
            success: false,
            error: Some("quota exceeded".into()),
            ..GenerationResponse::default()
        };
        assert!(session.apply_response(failure).is_err());
        assert_eq!(session.snapshot().as_str(), "Keep me, edited");
        assert!(session.store().is_editing());
        assert!(session.metadata().is_some());
    }

    #[test]
    fn reset_clears_text_and_metadata() {
        let mut session = LetterSession::default();
        session.apply_response(success("Letter")).unwrap();
        session.reset();

        assert_eq!(session.snapshot().as_str(), "");
        assert!(session.metadata().is_none());
    }

    #[test]
    fn clipboard_reflects_edits() {
        let mut session = LetterSession::default();
        session.apply_response(success("Draft")).unwrap();
        session.on_view_change("Draft v2");

        assert_eq!(session.clipboard_text(), "Draft v2");
    }

    #[test]
    fn font_selection_changes_exports_not_text() {
        let mut session = LetterSession::default();
        session.load_text("Same words");
        let serif = session.export_docx().unwrap();
        session.select_font(FontSpec::SansSerif);
        let sans = session.export_docx().unwrap();

        assert_eq!(session.snapshot().as_str(), "Same words");
        assert_ne!(serif.bytes(), sans.bytes());
        let expected = docx::write_docx(
            &crate::typesetting::split_paragraphs("Same words"),
            TextStyle::new(FontSpec::SansSerif, 12.0),
        )
        .unwrap();
        assert_eq!(sans.bytes(), expected.as_slice());
    }

    #[test]
    fn export_after_edit_uses_edited_text() {
        let mut session = LetterSession::default();
        session.apply_response(success("A")).unwrap();
        session.begin_edit();
        session.on_view_change("AB");

        let exported = session.export_pdf().unwrap();
        let direct =
            export_paginated("AB", TextStyle::default(), PageGeometry::default()).unwrap();
        assert_eq!(exported, direct);
    }

    #[tokio::test]
    async fn async_export_ignores_edits_made_while_pending() {
        let mut session = LetterSession::default();
        session.load_text("Before");
        let pending = tokio::spawn(session.export_pdf_async());
        session.on_view_change("After");

        let artifact = pending.await.unwrap().unwrap();
        let expected =
            export_paginated("Before", TextStyle::default(), PageGeometry::default()).unwrap();
        assert_eq!(artifact, expected);

        let docx = session.export_docx_async().await.unwrap();
        assert_eq!(docx, export_flowed("After", TextStyle::default()).unwrap());
    }
}
