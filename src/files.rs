//! File and converter collaborators.
//!
//! The formatting engine only works on strings; these helpers read and write
//! report files and hand a finished report to an external converter for PDF
//! rendering.

use crate::{FormatError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Reads a report, reporting a missing file as [`FormatError::MissingInput`].
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => FormatError::MissingInput(path.to_path_buf()),
        _ => FormatError::Io(err),
    })
}

/// Overwrites `path` with `text`.
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    debug!(path = %path.display(), bytes = text.len(), "wrote document");
    Ok(())
}

/// Renders a Markdown report to PDF by running an external converter.
///
/// The default runs
///
/// ```plain
/// pandoc report.md -o report.pdf --pdf-engine=xelatex -V geometry:margin=1in
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfExporter {
    program: String,
    pdf_engine: String,
    margin: String,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            pdf_engine: "xelatex".to_string(),
            margin: "1in".to_string(),
        }
    }
}

impl PdfExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different converter executable with the same arguments.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.pdf_engine = engine.into();
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: impl Into<String>) -> Self {
        self.margin = margin.into();
        self
    }

    /// Path of the PDF written for `source`: the same path with a `.pdf` extension.
    pub fn pdf_path(source: &Path) -> PathBuf {
        source.with_extension("pdf")
    }

    /// Converts `source` and returns the path of the written PDF.
    ///
    /// # Errors
    ///
    /// [`FormatError::ConverterUnavailable`] if the converter cannot be found,
    /// [`FormatError::ConverterFailed`] if it exits unsuccessfully.
    pub fn export(&self, source: &Path) -> Result<PathBuf> {
        let output = Self::pdf_path(source);
        debug!(program = %self.program, source = %source.display(), "starting pdf export");

        let status = Command::new(&self.program)
            .arg(source)
            .arg("-o")
            .arg(&output)
            .arg(format!("--pdf-engine={}", self.pdf_engine))
            .arg("-V")
            .arg(format!("geometry:margin={}", self.margin))
            .status()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => FormatError::ConverterUnavailable {
                    program: self.program.clone(),
                },
                _ => FormatError::Io(err),
            })?;

        if !status.success() {
            return Err(FormatError::ConverterFailed {
                program: self.program.clone(),
                status,
            });
        }

        info!(path = %output.display(), "exported pdf");
        Ok(output)
    }
}
