use std::path::PathBuf;

use clap::Parser;
use citenorm::{FormatterConfig, PdfExporter};

#[derive(Parser, Debug)]
#[command(
    name = "citenorm",
    version,
    about = "Format and validate citations in research reports"
)]
pub struct Cli {
    /// Path to the report, e.g. research/<topic>/research.md
    pub file: PathBuf,

    /// Validate only; exit with status 1 if any warning is found
    #[arg(long, default_value_t = false)]
    pub check: bool,

    /// Print the formatted report instead of overwriting the file
    #[arg(long, default_value_t = false)]
    pub stdout: bool,

    /// Export to PDF after formatting (requires pandoc)
    #[arg(long, default_value_t = false)]
    pub pdf: bool,

    /// Converter executable used for the PDF export
    #[arg(long, default_value = "pandoc")]
    pub pandoc: String,

    /// LaTeX engine pandoc uses for the PDF
    #[arg(long, default_value = "xelatex")]
    pub pdf_engine: String,

    /// Page margin of the PDF, e.g. 1in or 2cm
    #[arg(long, default_value = "1in")]
    pub margin: String,

    /// Heading text of the reference section
    #[arg(long, default_value = "References")]
    pub heading: String,

    /// Query parameter to keep even though it is a known tracking parameter
    #[arg(long = "keep-param")]
    pub keep_params: Vec<String>,

    /// Additional query parameter to strip from reference URLs
    #[arg(long = "strip-param")]
    pub strip_params: Vec<String>,
}

impl Cli {
    pub fn formatter_config(&self) -> FormatterConfig {
        let mut config = FormatterConfig {
            references_heading: self.heading.clone(),
            ..FormatterConfig::default()
        };
        for name in &self.strip_params {
            config.tracking_params.insert(name);
        }
        for name in &self.keep_params {
            config.tracking_params.remove(name);
        }
        config
    }

    pub fn pdf_exporter(&self) -> PdfExporter {
        PdfExporter::new()
            .with_program(&self.pandoc)
            .with_pdf_engine(&self.pdf_engine)
            .with_margin(&self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "citenorm",
            "report.md",
            "--check",
            "--keep-param",
            "ref",
            "--strip-param",
            "Session",
        ]);
        assert!(cli.check);
        assert!(!cli.stdout);
        assert_eq!(cli.file, PathBuf::from("report.md"));

        let config = cli.formatter_config();
        assert_eq!(config.references_heading, "References");
        assert!(!config.tracking_params.contains("ref"));
        assert!(config.tracking_params.contains("session"));
        assert!(config.tracking_params.contains("utm_source"));
    }

    #[test]
    fn test_pdf_options() {
        let cli = Cli::parse_from([
            "citenorm",
            "report.md",
            "--pdf",
            "--pdf-engine",
            "lualatex",
            "--margin",
            "2cm",
        ]);
        assert!(cli.pdf);
        assert_eq!(
            cli.pdf_exporter(),
            PdfExporter::new().with_pdf_engine("lualatex").with_margin("2cm")
        );

        let defaults = Cli::parse_from(["citenorm", "report.md", "--pdf"]);
        assert_eq!(defaults.pdf_exporter(), PdfExporter::new());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
