//! Thin wrapper around `quarto render`
//!
//! The template's front matter already references the bibliography and any
//! CSL style sheet, so rendering is a single `quarto render --to <format>`
//! invocation. A missing toolchain or a nonzero exit is reported against
//! the requested format; the bibliography written earlier stays valid.

use std::path::{Path, PathBuf};
use std::process::Command;

use gratia_core::{DocumentRenderer, ProviderError, RenderFormat};

#[derive(Debug, Clone)]
pub struct QuartoRenderer {
    program: String,
}

impl Default for QuartoRenderer {
    fn default() -> Self {
        Self {
            program: "quarto".to_string(),
        }
    }
}

impl QuartoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// quarto's name for the target format
fn quarto_target(format: RenderFormat) -> Option<&'static str> {
    match format {
        RenderFormat::Html => Some("html"),
        RenderFormat::Docx => Some("docx"),
        RenderFormat::Pdf => Some("pdf"),
        RenderFormat::Markdown => Some("gfm"),
        RenderFormat::Source => None,
    }
}

/// File extension of the rendered output
fn output_extension(format: RenderFormat) -> &'static str {
    match format {
        RenderFormat::Html => "html",
        RenderFormat::Docx => "docx",
        RenderFormat::Pdf => "pdf",
        RenderFormat::Markdown => "md",
        RenderFormat::Source => "qmd",
    }
}

impl DocumentRenderer for QuartoRenderer {
    fn render(
        &self,
        template: &Path,
        format: RenderFormat,
        _style: Option<&Path>,
    ) -> Result<PathBuf, ProviderError> {
        let Some(target) = quarto_target(format) else {
            // Source format never reaches the renderer; hand back the template
            return Ok(template.to_path_buf());
        };

        let output = Command::new(&self.program)
            .arg("render")
            .arg(template)
            .args(["--to", target])
            .output()
            .map_err(|e| {
                ProviderError::Unavailable(format!("failed to launch {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(ProviderError::Unavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(template.with_extension(output_extension(format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names_match_quarto() {
        assert_eq!(quarto_target(RenderFormat::Html), Some("html"));
        assert_eq!(quarto_target(RenderFormat::Markdown), Some("gfm"));
        assert_eq!(quarto_target(RenderFormat::Source), None);
    }

    #[test]
    fn markdown_renders_to_md_extension() {
        assert_eq!(output_extension(RenderFormat::Markdown), "md");
        assert_eq!(output_extension(RenderFormat::Docx), "docx");
    }

    #[test]
    fn missing_toolchain_is_an_unavailable_error() {
        let renderer = QuartoRenderer::with_program("/no/such/quarto-binary");
        let err = renderer
            .render(Path::new("report.qmd"), RenderFormat::Html, None)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
