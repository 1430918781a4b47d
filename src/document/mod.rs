/*!
 * Structured documents whose text can be read and replaced in place.
 *
 * A document exposes two kinds of text fragments:
 * - body paragraphs, addressed by index
 * - table cells, addressed by table, row and cell index
 *
 * Implementations:
 * - `MemoryDocument`: plain vectors, for tests and library callers
 * - `DocxDocument`: a `.docx` package edited at the XML event level
 */

use std::fmt;

use crate::errors::DocumentError;

pub mod docx;
pub mod memory;

pub use self::docx::DocxDocument;
pub use self::memory::MemoryDocument;

/// Where a fragment lives in its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentLocation {
    /// Body paragraph
    Paragraph { index: usize },
    /// Table cell
    TableCell { table: usize, row: usize, cell: usize },
}

impl FragmentLocation {
    /// Human label used in status lines
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::TableCell { .. } => "table cell",
        }
    }
}

impl fmt::Display for FragmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph { index } => write!(f, "paragraph {}", index),
            Self::TableCell { table, row, cell } => {
                write!(f, "table {} row {} cell {}", table, row, cell)
            }
        }
    }
}

/// A fragment's location and its text at the time it was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub location: FragmentLocation,
    pub text: String,
}

impl TextFragment {
    /// Whether the fragment has any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Read and replace the text of paragraphs and table cells
pub trait TextDocument {
    /// Number of body paragraphs
    fn paragraph_count(&self) -> usize;

    /// Text of body paragraph `index`
    fn paragraph_text(&self, index: usize) -> Result<String, DocumentError>;

    /// Replace the text of body paragraph `index`
    fn set_paragraph_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError>;

    /// Number of tables
    fn table_count(&self) -> usize;

    /// Number of rows in `table`
    fn row_count(&self, table: usize) -> Result<usize, DocumentError>;

    /// Number of cells in `row` of `table`
    fn cell_count(&self, table: usize, row: usize) -> Result<usize, DocumentError>;

    /// Text of a table cell
    fn cell_text(&self, table: usize, row: usize, cell: usize) -> Result<String, DocumentError>;

    /// Replace the text of a table cell
    fn set_cell_text(
        &mut self,
        table: usize,
        row: usize,
        cell: usize,
        text: &str,
    ) -> Result<(), DocumentError>;

    /// All fragments in document order: paragraphs, then tables row by row
    fn fragments(&self) -> Result<Vec<TextFragment>, DocumentError> {
        let mut fragments = Vec::new();

        for index in 0..self.paragraph_count() {
            fragments.push(TextFragment {
                location: FragmentLocation::Paragraph { index },
                text: self.paragraph_text(index)?,
            });
        }

        for table in 0..self.table_count() {
            for row in 0..self.row_count(table)? {
                for cell in 0..self.cell_count(table, row)? {
                    fragments.push(TextFragment {
                        location: FragmentLocation::TableCell { table, row, cell },
                        text: self.cell_text(table, row, cell)?,
                    });
                }
            }
        }

        Ok(fragments)
    }

    /// Text at `location`
    fn text_at(&self, location: FragmentLocation) -> Result<String, DocumentError> {
        match location {
            FragmentLocation::Paragraph { index } => self.paragraph_text(index),
            FragmentLocation::TableCell { table, row, cell } => self.cell_text(table, row, cell),
        }
    }

    /// Replace the text at `location`
    fn set_text_at(&mut self, location: FragmentLocation, text: &str) -> Result<(), DocumentError> {
        match location {
            FragmentLocation::Paragraph { index } => self.set_paragraph_text(index, text),
            FragmentLocation::TableCell { table, row, cell } => {
                self.set_cell_text(table, row, cell, text)
            }
        }
    }
}
