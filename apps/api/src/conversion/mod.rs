//! PDF → preview image conversion.
//!
//! Renders the first page to PNG with poppler's `pdftoppm`. The text layer is
//! inspected with `pdf-extract` on a blocking thread so scanned (image-only)
//! resumes show up in the logs; the check never fails the conversion.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("File is not a PDF")]
    NotAPdf,

    #[error("Could not start {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer failed: {0}")]
    Render(String),

    #[error("I/O error during conversion: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Bytes,
}

#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, file_name: &str, pdf: Bytes) -> Result<ConvertedImage, ConversionError>;
}

pub struct PopplerConverter {
    bin: String,
    dpi: u32,
}

impl PopplerConverter {
    pub fn new(bin: String, dpi: u32) -> Self {
        Self { bin, dpi }
    }

    async fn render_first_page(&self, dir: &Path) -> Result<Bytes, ConversionError> {
        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg(dir.join("input.pdf"))
            .arg(dir.join("page"))
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} failed ({}): {}", self.bin, output.status, stderr);
            return Err(ConversionError::Render(if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            }));
        }

        let png = tokio::fs::read(dir.join("page.png")).await?;
        if png.is_empty() {
            return Err(ConversionError::Render("renderer produced an empty image".into()));
        }
        Ok(Bytes::from(png))
    }
}

#[async_trait]
impl PdfConverter for PopplerConverter {
    async fn convert(&self, file_name: &str, pdf: Bytes) -> Result<ConvertedImage, ConversionError> {
        if !pdf.starts_with(PDF_MAGIC) {
            return Err(ConversionError::NotAPdf);
        }

        inspect_text_layer(file_name, pdf.clone()).await;

        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join("input.pdf"), &pdf).await?;
        let data = self.render_first_page(dir.path()).await?;

        info!(
            "Rendered first page of {} to PNG ({} bytes at {} dpi)",
            file_name,
            data.len(),
            self.dpi
        );

        Ok(ConvertedImage {
            file_name: image_file_name(file_name),
            content_type: "image/png",
            data,
        })
    }
}

async fn inspect_text_layer(file_name: &str, pdf: Bytes) {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf)).await;
    match extracted {
        Ok(Ok(text)) if text.trim().is_empty() => {
            warn!("{file_name} has no extractable text; it is probably a scanned image")
        }
        Ok(Ok(text)) => debug!("{file_name} text layer: {} chars", text.len()),
        Ok(Err(e)) => warn!("Could not read text layer of {file_name}: {e}"),
        Err(e) => warn!("Text layer check for {file_name} panicked: {e}"),
    }
}

/// `resume.pdf` → `resume.png`; names without a `.pdf` suffix get `.png` appended.
pub fn image_file_name(pdf_name: &str) -> String {
    let stem = match pdf_name.len().checked_sub(4) {
        Some(cut) if pdf_name.is_char_boundary(cut)
            && pdf_name[cut..].eq_ignore_ascii_case(".pdf") =>
        {
            &pdf_name[..cut]
        }
        _ => pdf_name,
    };
    let stem = if stem.is_empty() { "resume" } else { stem };
    format!("{stem}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_name_replaces_extension() {
        assert_eq!(image_file_name("cv.pdf"), "cv.png");
        assert_eq!(image_file_name("CV.PDF"), "CV.png");
        assert_eq!(image_file_name("notes"), "notes.png");
        assert_eq!(image_file_name(".pdf"), "resume.png");
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_bytes() {
        let converter = PopplerConverter::new("pdftoppm".into(), 150);
        let result = converter
            .convert("cv.pdf", Bytes::from_static(b"PK\x03\x04 not a pdf"))
            .await;
        assert!(matches!(result, Err(ConversionError::NotAPdf)));
    }

    #[tokio::test]
    async fn test_missing_renderer_reports_spawn_error() {
        let converter = PopplerConverter::new("/nonexistent/pdftoppm-missing".into(), 150);
        let result = converter
            .convert("cv.pdf", Bytes::from_static(b"%PDF-1.4\n%%EOF"))
            .await;
        assert!(matches!(result, Err(ConversionError::Spawn { .. })));
    }
}
