use crate::errors::DocumentError;
use super::{FragmentLocation, TextDocument};

/// Document held entirely in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    /// Body paragraphs in order
    pub paragraphs: Vec<String>,
    /// Tables as rows of cells
    pub tables: Vec<Vec<Vec<String>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from paragraph texts
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
            tables: Vec::new(),
        }
    }

    /// Append a table given as rows of cell texts
    pub fn with_table<R, C, S>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.push(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        );
        self
    }

    fn cell_mut(&mut self, table: usize, row: usize, cell: usize) -> Result<&mut String, DocumentError> {
        self.tables
            .get_mut(table)
            .and_then(|t| t.get_mut(row))
            .and_then(|r| r.get_mut(cell))
            .ok_or_else(|| {
                DocumentError::InvalidLocation(FragmentLocation::TableCell { table, row, cell }.to_string())
            })
    }

    fn row(&self, table: usize, row: usize) -> Result<&Vec<String>, DocumentError> {
        self.tables
            .get(table)
            .and_then(|t| t.get(row))
            .ok_or_else(|| DocumentError::InvalidLocation(format!("table {} row {}", table, row)))
    }
}

impl TextDocument for MemoryDocument {
    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    fn paragraph_text(&self, index: usize) -> Result<String, DocumentError> {
        self.paragraphs
            .get(index)
            .cloned()
            .ok_or_else(|| DocumentError::InvalidLocation(FragmentLocation::Paragraph { index }.to_string()))
    }

    fn set_paragraph_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError> {
        let paragraph = self
            .paragraphs
            .get_mut(index)
            .ok_or_else(|| DocumentError::InvalidLocation(FragmentLocation::Paragraph { index }.to_string()))?;
        *paragraph = text.to_string();
        Ok(())
    }

    fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn row_count(&self, table: usize) -> Result<usize, DocumentError> {
        self.tables
            .get(table)
            .map(Vec::len)
            .ok_or_else(|| DocumentError::InvalidLocation(format!("table {}", table)))
    }

    fn cell_count(&self, table: usize, row: usize) -> Result<usize, DocumentError> {
        Ok(self.row(table, row)?.len())
    }

    fn cell_text(&self, table: usize, row: usize, cell: usize) -> Result<String, DocumentError> {
        self.row(table, row)?.get(cell).cloned().ok_or_else(|| {
            DocumentError::InvalidLocation(FragmentLocation::TableCell { table, row, cell }.to_string())
        })
    }

    fn set_cell_text(
        &mut self,
        table: usize,
        row: usize,
        cell: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        *self.cell_mut(table, row, cell)? = text.to_string();
        Ok(())
    }
}
