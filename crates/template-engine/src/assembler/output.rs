//! Output format handling (HTML, PDF)

use serde::{Deserialize, Serialize};

/// Message returned when PDF output is requested
pub const PDF_UNAVAILABLE_MESSAGE: &str =
    "La génération PDF n'est pas disponible. Téléchargez le document HTML et utilisez « Imprimer en PDF » dans votre navigateur.";

/// Output format for assembled documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    /// Not rendered in-process; callers print the HTML to PDF
    Pdf,
}

impl OutputFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Whether the assembler can produce this format itself
    pub fn is_supported(&self) -> bool {
        matches!(self, OutputFormat::Html)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Pdf => write!(f, "pdf"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("HTML".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert_eq!("pdf".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_only_html_is_supported() {
        assert!(OutputFormat::Html.is_supported());
        assert!(!OutputFormat::Pdf.is_supported());
        assert_eq!(OutputFormat::default(), OutputFormat::Html);
    }
}
