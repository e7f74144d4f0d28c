//! The four conversions the backend exposes, and the one table that says
//! what each of them accepts.

use crate::error::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the supported backend transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    PdfToWord,
    WordToPdf,
    MergePdf,
    PdfToImages,
}

/// Per-kind request constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRule {
    pub min_files: usize,
    pub max_files: usize,
    /// Lowercase extensions, without the dot.
    pub extensions: &'static [&'static str],
    /// Multipart field name each file is attached under.
    pub field: &'static str,
}

const SINGLE_PDF: KindRule = KindRule {
    min_files: 1,
    max_files: 1,
    extensions: &["pdf"],
    field: "file",
};

const SINGLE_WORD: KindRule = KindRule {
    min_files: 1,
    max_files: 1,
    extensions: &["docx", "doc"],
    field: "file",
};

const MERGE: KindRule = KindRule {
    min_files: 2,
    // the backend refuses larger merges outright
    max_files: 10,
    extensions: &["pdf"],
    field: "files",
};

impl ConversionKind {
    pub const ALL: [ConversionKind; 4] = [
        ConversionKind::PdfToWord,
        ConversionKind::WordToPdf,
        ConversionKind::MergePdf,
        ConversionKind::PdfToImages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfToWord => "pdf-to-word",
            Self::WordToPdf => "word-to-pdf",
            Self::MergePdf => "merge-pdf",
            Self::PdfToImages => "pdf-to-images",
        }
    }

    /// Human-readable name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::PdfToWord => "PDF to Word",
            Self::WordToPdf => "Word to PDF",
            Self::MergePdf => "PDF merge",
            Self::PdfToImages => "PDF to Images",
        }
    }

    /// Backend path for this conversion, relative to the base URL.
    pub fn endpoint(self) -> String {
        format!("/convert/{}", self.as_str())
    }

    pub fn rule(self) -> &'static KindRule {
        match self {
            Self::PdfToWord | Self::PdfToImages => &SINGLE_PDF,
            Self::WordToPdf => &SINGLE_WORD,
            Self::MergePdf => &MERGE,
        }
    }

    /// Message returned when the backend gives no better explanation.
    pub fn failure_message(self) -> String {
        match self {
            Self::MergePdf => "PDF merge failed".to_string(),
            _ => format!("{} conversion failed", self.label()),
        }
    }

    /// Check the file-count invariant for this kind.
    pub fn check_file_count(self, count: usize) -> Result<()> {
        let rule = self.rule();
        if rule.min_files == rule.max_files && count != rule.min_files {
            return Err(ConverterError::validation(format!(
                "{} conversion requires exactly one file",
                self.label()
            )));
        }
        if count < rule.min_files {
            return Err(ConverterError::validation(format!(
                "{} requires at least {} files",
                self.label(),
                rule.min_files
            )));
        }
        if count > rule.max_files {
            return Err(ConverterError::validation(format!(
                "{} accepts at most {} files",
                self.label(),
                rule.max_files
            )));
        }
        Ok(())
    }
}

/// Extensions accepted for `kind`, lowercase and without the dot.
pub fn accepted_file_types(kind: ConversionKind) -> &'static [&'static str] {
    kind.rule().extensions
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionKind {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        ConversionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConverterError::validation(format!("Unsupported conversion type '{s}'")))
    }
}
