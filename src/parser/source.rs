//! Line buffer and read cursor for silhouette files.
//!
//! A `SourceFile` holds the whole file as lines, read once up front.
//! A `ParseSession` owns the single forward-moving cursor into it.

use crate::constants::QUOTE_CHAR;
use crate::error::{KrmError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whole silhouette file split into lines
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl SourceFile {
    /// Read a file eagerly into memory
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KrmError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let source = Self::from_content(path, &content);

        debug!("Loaded {} lines from {}", source.len(), path.display());
        Ok(source)
    }

    /// Build a source from in-memory text
    pub fn from_content(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn first_line(&self) -> Option<&str> {
        self.line(0)
    }

    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

/// One consumed line with its 1-based line number
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }
}

/// Parsing state for one file: the source plus the read cursor
#[derive(Debug)]
pub struct ParseSession<'a> {
    source: &'a SourceFile,
    cursor: usize,
}

impl<'a> ParseSession<'a> {
    pub fn new(source: &'a SourceFile) -> Self {
        Self { source, cursor: 0 }
    }

    pub fn source(&self) -> &'a SourceFile {
        self.source
    }

    /// Index of the next line to be read
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.source.len()
    }

    /// Line under the cursor, without consuming it
    pub fn peek(&self) -> Option<&'a str> {
        self.source.line(self.cursor)
    }

    /// Consume the line under the cursor.
    ///
    /// `context` names what was being read and ends up in the truncation error.
    pub fn next_line(&mut self, context: &str) -> Result<Line<'a>> {
        let text = self
            .source
            .line(self.cursor)
            .ok_or_else(|| KrmError::TruncatedFile {
                line: self.cursor + 1,
                total: self.source.len(),
                context: context.to_string(),
            })?;

        self.cursor += 1;
        Ok(Line {
            number: self.cursor,
            text,
        })
    }

    /// Skip `count` lines without reading them
    pub fn advance(&mut self, count: usize) {
        self.cursor += count;
    }
}

/// Remove every quote character from a line
pub fn strip_quotes(text: &str) -> String {
    text.replace(QUOTE_CHAR, "")
}

/// Whether a trimmed line carries any alphanumeric content
pub fn has_text(text: &str) -> bool {
    text.trim().chars().any(char::is_alphanumeric)
}

/// Last whitespace-separated token of a line
pub fn last_token(text: &str) -> Option<&str> {
    text.split_whitespace().last()
}

/// Tokens from `offset` onward, joined by single spaces
pub fn rest_of_line(text: &str, offset: usize) -> String {
    text.split_whitespace()
        .skip(offset)
        .collect::<Vec<_>>()
        .join(" ")
}
