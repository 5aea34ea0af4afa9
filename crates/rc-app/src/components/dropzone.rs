//! Single-image picker for the create-post form.

use std::path::Path;

use bytes::Bytes;
use rc_core::error::{AppError, Result};
use rc_core::models::ImageFile;
use rc_core::validation::{Field, FormErrors};
use rc_ui::ImageDropzoneTemplate;
use tracing::debug;

use crate::context::render;

/// Holds at most one selected image until the form is submitted.
#[derive(Debug, Default)]
pub struct ImageDropzone {
    file: Option<ImageFile>,
}

impl ImageDropzone {
    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    /// Accepts a drop. Anything other than exactly one image is rejected and
    /// the current selection is kept.
    pub fn accept(&mut self, mut files: Vec<ImageFile>) -> Result<()> {
        if files.len() != 1 {
            return Err(AppError::Validation(FormErrors::single(
                Field::Image,
                format!("Please drop exactly one image, got {}.", files.len()),
            )));
        }
        let file = files.remove(0);
        if !file.is_image() {
            return Err(AppError::Validation(FormErrors::single(
                Field::Image,
                format!("{} is not an image ({}).", file.name, file.content_type),
            )));
        }
        debug!(name = %file.name, size = file.data.len(), "image selected");
        self.file = Some(file);
        Ok(())
    }

    /// Reads a file from disk, typing it by extension.
    pub async fn pick(&mut self, path: &Path) -> Result<()> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Internal(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        self.accept(vec![ImageFile { name, content_type, data: Bytes::from(data) }])
    }

    pub fn remove(&mut self) {
        self.file = None;
    }

    pub fn render(&self) -> Result<String> {
        render(&ImageDropzoneTemplate { file: self.file.as_ref() })
    }
}
