//! Demand letter export pipeline.
//!
//! Generated letter text lives in an [`EditableTextStore`]; exporters lay an
//! immutable [`Snapshot`] of it out into a paginated PDF or a flowed DOCX.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod service;
pub mod session;
pub mod store;
pub mod typesetting;

pub use config::Config;
pub use error::AppError;
pub use export::{
    export_flowed, export_flowed_async, export_paginated, export_paginated_async, ExportArtifact,
    ExportError, ExportKind,
};
pub use session::LetterSession;
pub use store::{EditState, EditableTextStore, Snapshot};
pub use typesetting::{FontSpec, MeasurementError, PageGeometry, PageSize, TextStyle};
